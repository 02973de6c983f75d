use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Whether a stored condition admits or rejects the values it matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    #[serde(alias = "i")]
    Include,
    #[serde(alias = "e")]
    Exclude,
}

impl Operator {
    pub fn from_exclude(exclude: bool) -> Self {
        if exclude {
            Operator::Exclude
        } else {
            Operator::Include
        }
    }

    pub fn is_exclude(&self) -> bool {
        *self == Operator::Exclude
    }
}

/// The partition a stored condition belongs to. One switch can answer differently when asked
/// about feature gating and about experiment bucketing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
#[serde(rename_all = "snake_case")]
pub enum SwitchType {
    #[default]
    Feature,
    AbTest,
}

/// A persisted `(operator, value, switch_type)` condition attached to one field of one
/// condition set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoredCondition {
    pub operator: Operator,
    pub value: String,
    pub switch_type: SwitchType,
}

impl StoredCondition {
    pub fn new(operator: Operator, value: impl Into<String>, switch_type: SwitchType) -> Self {
        StoredCondition {
            operator,
            value: value.into(),
            switch_type,
        }
    }

    pub fn include(value: impl Into<String>) -> Self {
        Self::new(Operator::Include, value, SwitchType::Feature)
    }

    pub fn exclude(value: impl Into<String>) -> Self {
        Self::new(Operator::Exclude, value, SwitchType::Feature)
    }

    pub fn with_switch_type(mut self, switch_type: SwitchType) -> Self {
        self.switch_type = switch_type;
        self
    }

    /// A condition applies to every query when no switch type is requested.
    pub fn applies_to(&self, switch_type: Option<SwitchType>) -> bool {
        switch_type.map_or(true, |t| t == self.switch_type)
    }
}

// Conditions written before the tagged record existed were positional tuples, with or without a
// trailing switch type. Both shapes are still accepted on read.
impl<'de> Deserialize<'de> for StoredCondition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Record {
                operator: Operator,
                value: String,
                #[serde(default)]
                switch_type: SwitchType,
            },
            Typed(Operator, String, SwitchType),
            Untyped(Operator, String),
        }

        Ok(match Shape::deserialize(deserializer)? {
            Shape::Record {
                operator,
                value,
                switch_type,
            }
            | Shape::Typed(operator, value, switch_type) => {
                StoredCondition::new(operator, value, switch_type)
            }
            Shape::Untyped(operator, value) => {
                StoredCondition::new(operator, value, SwitchType::Feature)
            }
        })
    }
}

/// Stored conditions of one condition set, keyed by field name.
pub type FieldConditions = BTreeMap<String, Vec<StoredCondition>>;

/// Stored conditions of a switch, keyed by condition set identifier then field name.
pub type Conditions = BTreeMap<String, FieldConditions>;
