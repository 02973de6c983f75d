use log::warn;

use crate::attribute_value::AttributeValue;
use crate::condition::{Conditions, StoredCondition, SwitchType};
use crate::context::Context;
use crate::field::{Field, Fields};

/// A named group of [Field]s plus the logic that pulls each field's runtime value out of an
/// evaluation [Context].
///
/// Implementors provide identity and extraction; the combination of stored conditions is shared
/// and lives in [ConditionSet::is_active].
pub trait ConditionSet: Send + Sync {
    /// Stable identifier used as registry key and as the namespace of stored conditions.
    /// Changing it orphans every condition stored under the old value.
    fn id(&self) -> &str;

    /// Human-readable group label.
    fn label(&self) -> &str;

    fn fields(&self) -> &Fields;

    /// Extracts the runtime value of `field_name`. None means the value is unavailable, which
    /// every field treats as a non-match.
    fn field_value(&self, context: Option<&Context>, field_name: &str) -> Option<AttributeValue>;

    /// Whether this set knows how to read from `context` at all.
    fn can_execute(&self, _context: Option<&Context>) -> bool {
        true
    }

    fn field(&self, name: &str) -> Option<&Field> {
        self.fields().get(name)
    }

    /// Evaluates this set's stored conditions against `context`.
    ///
    /// Within a field, includes are OR-combined and any matching exclude fails the field.
    /// Across fields the results are AND-combined. Fields with no condition of the requested
    /// `switch_type` are skipped, and a set where every field was skipped is inactive.
    fn is_active(
        &self,
        context: Option<&Context>,
        conditions: &Conditions,
        switch_type: Option<SwitchType>,
    ) -> bool {
        let field_conditions = match conditions.get(self.id()) {
            Some(field_conditions) => field_conditions,
            None => return false,
        };

        if !self.can_execute(context) {
            return false;
        }

        let mut any_field_contributed = false;
        for (field_name, stored) in field_conditions {
            let applicable: Vec<&StoredCondition> = stored
                .iter()
                .filter(|condition| condition.applies_to(switch_type))
                .collect();
            if applicable.is_empty() {
                continue;
            }

            let field = match self.field(field_name) {
                Some(field) => field,
                None => {
                    warn!(
                        "Condition set {} has no field {}; ignoring its stored conditions",
                        self.id(),
                        field_name
                    );
                    continue;
                }
            };

            let value = self.field_value(context, field_name);
            if !field.evaluate(applicable, value.as_ref()) {
                return false;
            }
            any_field_contributed = true;
        }

        any_field_contributed
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use maplit::{btreemap, hashmap};
    use spectral::prelude::*;
    use test_case::test_case;

    use super::*;
    use crate::condition::{Operator, StoredCondition};
    use crate::field::FieldKind;

    // Counts extractions so memoization per field can be observed.
    struct CountingSet {
        fields: Fields,
        values: HashMap<&'static str, AttributeValue>,
        extractions: AtomicUsize,
    }

    impl CountingSet {
        fn new(values: HashMap<&'static str, AttributeValue>) -> Self {
            CountingSet {
                fields: Fields::new(vec![
                    Field::new("color", FieldKind::String),
                    Field::new("size", FieldKind::Range),
                ])
                .unwrap(),
                values,
                extractions: AtomicUsize::new(0),
            }
        }
    }

    impl ConditionSet for CountingSet {
        fn id(&self) -> &str {
            "tests.CountingSet"
        }

        fn label(&self) -> &str {
            "Counting"
        }

        fn fields(&self) -> &Fields {
            &self.fields
        }

        fn field_value(&self, _context: Option<&Context>, field_name: &str) -> Option<AttributeValue> {
            self.extractions.fetch_add(1, Ordering::Relaxed);
            self.values.get(field_name).cloned()
        }
    }

    fn conditions(fields: Vec<(&str, Vec<StoredCondition>)>) -> Conditions {
        btreemap! {
            "tests.CountingSet".to_string() => fields
                .into_iter()
                .map(|(name, stored)| (name.to_string(), stored))
                .collect(),
        }
    }

    fn red_medium() -> CountingSet {
        CountingSet::new(hashmap! {"color" => "red".into(), "size" => 5_i64.into()})
    }

    #[test]
    fn missing_namespace_is_inactive() {
        let set = red_medium();
        assert!(!set.is_active(None, &Conditions::new(), None));
    }

    #[test]
    fn empty_namespace_is_inactive() {
        let set = red_medium();
        let conditions = btreemap! {"tests.CountingSet".to_string() => btreemap! {}};
        assert!(!set.is_active(None, &conditions, None));
    }

    #[test]
    fn fields_are_and_combined() {
        let set = red_medium();
        let both = conditions(vec![
            ("color", vec![StoredCondition::include("red")]),
            ("size", vec![StoredCondition::include("1-10")]),
        ]);
        assert!(set.is_active(None, &both, None));

        let one_unsatisfiable = conditions(vec![
            ("color", vec![StoredCondition::include("red")]),
            ("size", vec![StoredCondition::include("20-30")]),
        ]);
        assert!(!set.is_active(None, &one_unsatisfiable, None));
    }

    #[test_case(vec!["blue", "red"], true; "any include")]
    #[test_case(vec!["blue", "green"], false; "no include")]
    fn includes_within_field_are_or_combined(values: Vec<&str>, expected: bool) {
        let set = red_medium();
        let stored = values.into_iter().map(StoredCondition::include).collect();
        assert_eq!(
            set.is_active(None, &conditions(vec![("color", stored)]), None),
            expected
        );
    }

    #[test]
    fn exclude_beats_include() {
        let set = red_medium();
        let stored = conditions(vec![(
            "color",
            vec![StoredCondition::include("red"), StoredCondition::exclude("red")],
        )]);
        assert!(!set.is_active(None, &stored, None));
    }

    #[test]
    fn extraction_happens_once_per_field() {
        let set = red_medium();
        let stored = conditions(vec![(
            "color",
            vec![
                StoredCondition::include("blue"),
                StoredCondition::include("green"),
                StoredCondition::include("red"),
                StoredCondition::exclude("black"),
            ],
        )]);
        assert!(set.is_active(None, &stored, None));
        assert_that!(set.extractions.load(Ordering::Relaxed)).is_equal_to(1);
    }

    #[test]
    fn fields_without_matching_switch_type_are_skipped() {
        let set = red_medium();
        let stored = conditions(vec![
            (
                "color",
                vec![StoredCondition::include("red").with_switch_type(SwitchType::AbTest)],
            ),
            ("size", vec![StoredCondition::include("20-30")]),
        ]);
        asserting!("the unsatisfied feature field is not consulted for AB tests")
            .that(&set.is_active(None, &stored, Some(SwitchType::AbTest)))
            .is_true();
        asserting!("the AB test field is not consulted for features")
            .that(&set.is_active(None, &stored, Some(SwitchType::Feature)))
            .is_false();
        assert!(!set.is_active(None, &stored, None));
    }

    #[test]
    fn no_conditions_of_requested_type_is_inactive() {
        let set = red_medium();
        let stored = conditions(vec![("color", vec![StoredCondition::include("red")])]);
        assert!(set.is_active(None, &stored, Some(SwitchType::Feature)));
        assert!(!set.is_active(None, &stored, Some(SwitchType::AbTest)));
        assert_that!(set.extractions.load(Ordering::Relaxed)).is_equal_to(1);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let set = red_medium();
        let stored = conditions(vec![
            ("weight", vec![StoredCondition::include("heavy")]),
            ("color", vec![StoredCondition::include("red")]),
        ]);
        assert!(set.is_active(None, &stored, None));

        let only_unknown = conditions(vec![("weight", vec![StoredCondition::include("heavy")])]);
        assert!(!set.is_active(None, &only_unknown, None));
    }

    #[test]
    fn unavailable_value_fails_includes_but_not_excludes() {
        let set = CountingSet::new(hashmap! {});
        let include = conditions(vec![("color", vec![StoredCondition::include("red")])]);
        assert!(!set.is_active(None, &include, None));

        let exclude = conditions(vec![(
            "color",
            vec![StoredCondition::new(Operator::Exclude, "red", SwitchType::Feature)],
        )]);
        assert!(set.is_active(None, &exclude, None));
    }
}
