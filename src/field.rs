use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use log::warn;

use crate::attribute_value::{parse_naive_date, parse_wall_clock, AttributeValue};
use crate::bucket::PercentRange;
use crate::condition::StoredCondition;
use crate::error::ConditionError;
use crate::ip::IpMatcher;
use crate::util::split_range;

/// How a field coerces its stored condition string and compares it with the runtime value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Textual equality after rendering the runtime value as a string.
    String,
    /// Truthiness of the runtime value; the stored string is not consulted.
    Boolean,
    /// Inclusive numeric `lo-hi` range.
    Range,
    /// Inclusive `lo-hi` bucket range; the runtime value is the identity to bucket.
    Percent,
    /// Runtime timestamp is on or after the stored date or date-time. Stored values are read in
    /// the extractor's reference frame, so they never carry an offset.
    OnOrAfterDate,
    /// Runtime timestamp is strictly before the stored date or date-time.
    BeforeDate,
    /// Runtime address equals, or falls in, the stored address, network or range.
    IpAddress,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Threshold {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Threshold {
    fn parse(raw: &str) -> Option<Threshold> {
        match parse_naive_date(raw) {
            Some(date) => Some(Threshold::Date(date)),
            None => parse_wall_clock(raw).map(Threshold::DateTime),
        }
    }

    // Date thresholds compare calendar days, date-time thresholds compare wall-clock readings.
    fn cmp_to(&self, value: &NaiveDateTime) -> std::cmp::Ordering {
        match self {
            Threshold::Date(date) => value.date().cmp(date),
            Threshold::DateTime(dt) => value.cmp(dt),
        }
    }
}

fn parse_range(raw: &str) -> Option<(f64, f64)> {
    let (lo, hi) = split_range(raw)?;
    let (lo, hi) = (lo.parse::<f64>().ok()?, hi.parse::<f64>().ok()?);
    if lo <= hi {
        Some((lo, hi))
    } else {
        None
    }
}

impl FieldKind {
    fn matches(&self, raw: &str, value: &AttributeValue) -> Option<bool> {
        Some(match self {
            FieldKind::String => value.to_comparable_string()? == raw,
            FieldKind::Boolean => value.is_truthy(),
            FieldKind::Range => {
                let (lo, hi) = parse_range(raw)?;
                let value = value.to_f64()?;
                lo <= value && value <= hi
            }
            FieldKind::Percent => {
                let range: PercentRange = raw.parse().ok()?;
                range.contains(&value.as_bucketable()?)
            }
            FieldKind::OnOrAfterDate => Threshold::parse(raw)?
                .cmp_to(&value.to_naive_datetime()?)
                .is_ge(),
            FieldKind::BeforeDate => Threshold::parse(raw)?
                .cmp_to(&value.to_naive_datetime()?)
                .is_lt(),
            FieldKind::IpAddress => {
                let matcher: IpMatcher = raw.parse().ok()?;
                matcher.contains(&value.as_str()?.trim().parse().ok()?)
            }
        })
    }

    /// Checks that `raw` coerces into this kind's comparison domain.
    pub fn validate(&self, raw: &str) -> Result<(), ConditionError> {
        match self {
            FieldKind::String | FieldKind::Boolean => Ok(()),
            FieldKind::Range => parse_range(raw)
                .map(|_| ())
                .ok_or_else(|| ConditionError::InvalidRange(raw.to_string())),
            FieldKind::Percent => raw.parse::<PercentRange>().map(|_| ()),
            FieldKind::OnOrAfterDate | FieldKind::BeforeDate => Threshold::parse(raw)
                .map(|_| ())
                .ok_or_else(|| ConditionError::InvalidDate(raw.to_string())),
            FieldKind::IpAddress => raw.parse::<IpMatcher>().map(|_| ()),
        }
    }
}

/// A single named comparator within a condition set.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    name: String,
    label: Option<String>,
    kind: FieldKind,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Field {
            name: name.into(),
            label: None,
            kind,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The label shown to operators; falls back to the field name.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Decides whether the stored `raw` condition matches the runtime `value`.
    ///
    /// An unavailable value, or a stored condition that does not coerce, is a non-match.
    pub fn matches(&self, raw: &str, value: Option<&AttributeValue>) -> bool {
        let value = match value {
            Some(AttributeValue::Null) | None => return false,
            Some(v) => v,
        };
        match self.kind.matches(raw, value) {
            Some(matched) => matched,
            None => {
                if self.kind.validate(raw).is_err() {
                    warn!(
                        "Stored condition {:?} for field {} does not parse; treating as no match",
                        raw, self.name
                    );
                }
                false
            }
        }
    }

    /// Combines every applicable stored condition of this field against one runtime value:
    /// any matching exclude fails the field, otherwise any matching include (or the absence of
    /// includes) passes it.
    pub fn evaluate<'a, I>(&self, conditions: I, value: Option<&AttributeValue>) -> bool
    where
        I: IntoIterator<Item = &'a StoredCondition>,
    {
        let (excludes, includes): (Vec<&StoredCondition>, Vec<&StoredCondition>) = conditions
            .into_iter()
            .partition(|condition| condition.operator.is_exclude());

        if excludes
            .iter()
            .any(|condition| self.matches(&condition.value, value))
        {
            return false;
        }

        includes.is_empty()
            || includes
                .iter()
                .any(|condition| self.matches(&condition.value, value))
    }

    pub fn validate(&self, raw: &str) -> Result<(), ConditionError> {
        self.kind.validate(raw)
    }

    /// Renders a stored condition for operator-facing listings.
    pub fn display(&self, raw: &str) -> String {
        match self.kind {
            FieldKind::Percent => format!("{}%", raw.trim()),
            FieldKind::Boolean => self.label().to_string(),
            _ => raw.to_string(),
        }
    }
}

/// The fields of one condition set, keyed by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fields(HashMap<String, Field>);

impl Fields {
    /// Builds a field map, rejecting duplicate names.
    pub fn new<I: IntoIterator<Item = Field>>(fields: I) -> Result<Self, ConditionError> {
        let mut map = HashMap::new();
        for field in fields {
            if map.contains_key(field.name()) {
                return Err(ConditionError::DuplicateField(field.name().to_string()));
            }
            map.insert(field.name().to_string(), field);
        }
        Ok(Fields(map))
    }

    // Built-in sets declare literal, distinct names.
    pub(crate) fn builtin<I: IntoIterator<Item = Field>>(fields: I) -> Self {
        Fields(
            fields
                .into_iter()
                .map(|field| (field.name().to_string(), field))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.0.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::SwitchType;
    use spectral::prelude::*;
    use test_case::test_case;

    fn dt(s: &str) -> AttributeValue {
        AttributeValue::DateTime(crate::attribute_value::parse_naive_datetime(s).unwrap())
    }

    #[test_case(FieldKind::String, "test.user", "test.user".into(), true)]
    #[test_case(FieldKind::String, "test.user", "another.user".into(), false)]
    #[test_case(FieldKind::String, "Test.User", "test.user".into(), false; "case sensitive")]
    #[test_case(FieldKind::String, "25", 25_i64.into(), true; "numbers render as integers")]
    #[test_case(FieldKind::String, "true", true.into(), true)]
    #[test_case(FieldKind::Boolean, "", true.into(), true; "stored value ignored")]
    #[test_case(FieldKind::Boolean, "1", false.into(), false)]
    #[test_case(FieldKind::Range, "10-20", 15_i64.into(), true)]
    #[test_case(FieldKind::Range, "10-20", 20_i64.into(), true; "inclusive upper")]
    #[test_case(FieldKind::Range, "10-20", 21_i64.into(), false)]
    #[test_case(FieldKind::Range, "-5-5", "-3".into(), true; "negative bounds and numeric strings")]
    #[test_case(FieldKind::Percent, "0-100", "1.0.0.0".into(), true)]
    #[test_case(FieldKind::Percent, "0-0", "1.0.0.0".into(), false)]
    #[test_case(FieldKind::Percent, "73-73", "1.0.0.0".into(), true)]
    #[test_case(FieldKind::Percent, "0-50", 6_i64.into(), true; "user id 6 buckets to 7")]
    #[test_case(FieldKind::Percent, "0-50", 2_i64.into(), false; "user id 2 buckets to 79")]
    #[test_case(FieldKind::OnOrAfterDate, "2018-10-23", dt("2018-10-23T00:00:00"), true)]
    #[test_case(FieldKind::OnOrAfterDate, "2018-10-23", dt("2018-10-23T23:59:00"), true)]
    #[test_case(FieldKind::OnOrAfterDate, "2018-10-23", dt("2018-10-22T23:59:00"), false)]
    #[test_case(FieldKind::OnOrAfterDate, "2016-01-01T06:00:00", dt("2016-01-01T05:59:00"), false)]
    #[test_case(FieldKind::OnOrAfterDate, "2016-01-01T06:00:00", dt("2016-01-01T06:00:00"), true)]
    #[test_case(FieldKind::BeforeDate, "2018-10-23", dt("2018-10-22T23:59:00"), true)]
    #[test_case(FieldKind::BeforeDate, "2018-10-23", dt("2018-10-23T00:00:00"), false)]
    #[test_case(FieldKind::IpAddress, "1.1.1.1", "1.1.1.1".into(), true)]
    #[test_case(FieldKind::IpAddress, "10.0.0.0/8", "10.1.2.3".into(), true)]
    #[test_case(FieldKind::IpAddress, "10.0.0.0/8", "1.1.1.1".into(), false)]
    fn kind_matches(kind: FieldKind, raw: &str, value: AttributeValue, expected: bool) {
        let field = Field::new("f", kind);
        asserting(&format!("{:?} {:?} against {:?}", kind, raw, value))
            .that(&field.matches(raw, Some(&value)))
            .is_equal_to(expected);
    }

    #[test_case(FieldKind::Range, "20-10")]
    #[test_case(FieldKind::Percent, "50-10")]
    #[test_case(FieldKind::OnOrAfterDate, "yesterday")]
    #[test_case(FieldKind::OnOrAfterDate, "2016-01-01T05:00:00Z"; "threshold with utc offset")]
    #[test_case(FieldKind::BeforeDate, "2016-01-01T05:00:00-05:00"; "threshold with offset")]
    #[test_case(FieldKind::IpAddress, "1.1.1")]
    fn malformed_conditions_never_match(kind: FieldKind, raw: &str) {
        let field = Field::new("f", kind);
        let value = AttributeValue::from("15");
        assert!(!field.matches(raw, Some(&value)));
        assert!(field.validate(raw).is_err());
    }

    #[test_case(FieldKind::String)]
    #[test_case(FieldKind::Boolean)]
    #[test_case(FieldKind::Percent)]
    #[test_case(FieldKind::IpAddress)]
    fn unavailable_values_never_match(kind: FieldKind) {
        let field = Field::new("f", kind);
        assert!(!field.matches("0-100", None));
        assert!(!field.matches("", Some(&AttributeValue::Null)));
    }

    #[test]
    fn exclude_short_circuits_include() {
        let field = Field::new("ip_address", FieldKind::IpAddress);
        let conditions = vec![
            StoredCondition::include("1.1.1.1"),
            StoredCondition::exclude("1.1.1.0/24"),
        ];
        let value = AttributeValue::from("1.1.1.1");
        assert!(!field.evaluate(&conditions, Some(&value)));
    }

    #[test]
    fn includes_are_or_combined() {
        let field = Field::new("username", FieldKind::String);
        let conditions = vec![
            StoredCondition::include("alice"),
            StoredCondition::include("bob"),
        ];
        assert!(field.evaluate(&conditions, Some(&"bob".into())));
        assert!(!field.evaluate(&conditions, Some(&"carol".into())));
    }

    #[test]
    fn excludes_alone_admit_everything_else() {
        let field = Field::new("username", FieldKind::String);
        let conditions = vec![StoredCondition::exclude("mallory")];
        assert!(field.evaluate(&conditions, Some(&"alice".into())));
        assert!(!field.evaluate(&conditions, Some(&"mallory".into())));
    }

    #[test]
    fn switch_type_is_not_consulted_by_field() {
        let field = Field::new("f", FieldKind::String);
        let conditions =
            vec![StoredCondition::include("true").with_switch_type(SwitchType::AbTest)];
        assert!(field.evaluate(&conditions, Some(&true.into())));
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let result = Fields::new(vec![
            Field::new("a", FieldKind::String),
            Field::new("a", FieldKind::Boolean),
        ]);
        assert_that!(result).is_err_containing(ConditionError::DuplicateField("a".into()));
    }

    #[test]
    fn display() {
        assert_eq!(Field::new("percent", FieldKind::Percent).display("0-50"), "0-50%");
        assert_eq!(
            Field::new("is_staff", FieldKind::Boolean)
                .with_label("Staff")
                .display(""),
            "Staff"
        );
        assert_eq!(Field::new("ip", FieldKind::IpAddress).display("1.1.1.1"), "1.1.1.1");
    }
}
