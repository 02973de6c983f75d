use log::debug;
use serde::{Deserialize, Serialize};

use crate::condition::{Conditions, Operator, StoredCondition, SwitchType};
use crate::error::ConditionError;
use crate::registry::Registry;

/// SwitchStatus decides how a switch is evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchStatus {
    /// Never active.
    #[default]
    Disabled,
    /// Always active.
    Global,
    /// Active when any registered condition set matches the stored conditions.
    Selective,
    /// Takes the result of the parent switch, see [crate::Store::parent].
    Inherit,
}

/// A named feature switch and its stored conditions.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Switch {
    pub key: String,
    #[serde(default)]
    pub status: SwitchStatus,
    #[serde(default)]
    pub conditions: Conditions,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One stored condition as shown to an operator.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConditionSummary {
    pub field_name: String,
    pub value: String,
    pub display: String,
    pub exclude: bool,
    pub switch_type: SwitchType,
}

/// The stored conditions of one namespace, labelled with its condition set's group label when
/// that set is registered.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConditionSetSummary {
    pub id: String,
    pub label: Option<String>,
    pub conditions: Vec<ConditionSummary>,
}

impl Switch {
    pub fn new(key: impl Into<String>, status: SwitchStatus) -> Self {
        Switch {
            key: key.into(),
            status,
            conditions: Conditions::new(),
            value: None,
            label: None,
            description: None,
        }
    }

    /// Appends a stored condition after checking that the condition set is registered, that it
    /// declares `field_name` and that `condition` coerces into the field's domain.
    ///
    /// Adding a condition that is already stored leaves the switch unchanged.
    pub fn add_condition(
        &mut self,
        registry: &Registry,
        condition_set_id: &str,
        field_name: &str,
        condition: impl Into<String>,
        exclude: bool,
        switch_type: SwitchType,
    ) -> Result<(), ConditionError> {
        let condition_set = registry
            .get(condition_set_id)
            .ok_or_else(|| ConditionError::UnknownConditionSet(condition_set_id.to_string()))?;
        let field = condition_set
            .field(field_name)
            .ok_or_else(|| ConditionError::UnknownField {
                condition_set: condition_set_id.to_string(),
                field: field_name.to_string(),
            })?;

        let condition = condition.into();
        field.validate(&condition)?;

        let stored = StoredCondition::new(Operator::from_exclude(exclude), condition, switch_type);
        let field_conditions = self
            .conditions
            .entry(condition_set_id.to_string())
            .or_default()
            .entry(field_name.to_string())
            .or_default();
        if field_conditions.contains(&stored) {
            return Ok(());
        }

        debug!(
            "Switch {}: adding {:?} {} on {}.{}",
            self.key, stored.operator, stored.value, condition_set_id, field_name
        );
        field_conditions.push(stored);
        Ok(())
    }

    /// Removes every stored condition on the field with the given value and switch type,
    /// whatever its operator. Returns whether anything was removed.
    pub fn remove_condition(
        &mut self,
        condition_set_id: &str,
        field_name: &str,
        condition: &str,
        switch_type: SwitchType,
    ) -> bool {
        let field_conditions = match self
            .conditions
            .get_mut(condition_set_id)
            .and_then(|fields| fields.get_mut(field_name))
        {
            Some(field_conditions) => field_conditions,
            None => return false,
        };

        let before = field_conditions.len();
        field_conditions.retain(|c| !(c.value == condition && c.switch_type == switch_type));
        let removed = field_conditions.len() != before;

        self.prune(condition_set_id, field_name);
        removed
    }

    /// Drops every stored condition of a namespace, or of one field when `field_name` is given.
    pub fn clear_conditions(&mut self, condition_set_id: &str, field_name: Option<&str>) {
        match field_name {
            None => {
                self.conditions.remove(condition_set_id);
            }
            Some(field_name) => {
                if let Some(fields) = self.conditions.get_mut(condition_set_id) {
                    fields.remove(field_name);
                }
                self.prune(condition_set_id, field_name);
            }
        }
    }

    fn prune(&mut self, condition_set_id: &str, field_name: &str) {
        if let Some(fields) = self.conditions.get_mut(condition_set_id) {
            if fields.get(field_name).map_or(false, Vec::is_empty) {
                fields.remove(field_name);
            }
            if fields.is_empty() {
                self.conditions.remove(condition_set_id);
            }
        }
    }

    /// Lists the stored conditions namespace by namespace for display. Values of unregistered
    /// namespaces or unknown fields are shown raw.
    pub fn condition_summaries(&self, registry: &Registry) -> Vec<ConditionSetSummary> {
        self.conditions
            .iter()
            .map(|(id, fields)| {
                let condition_set = registry.get(id);
                let conditions = fields
                    .iter()
                    .flat_map(|(field_name, stored)| {
                        let field = condition_set.as_ref().and_then(|cs| cs.field(field_name));
                        stored.iter().map(move |c| ConditionSummary {
                            field_name: field_name.clone(),
                            value: c.value.clone(),
                            display: field.map_or_else(|| c.value.clone(), |f| f.display(&c.value)),
                            exclude: c.operator.is_exclude(),
                            switch_type: c.switch_type,
                        })
                    })
                    .collect();
                ConditionSetSummary {
                    id: id.clone(),
                    label: condition_set.as_ref().map(|cs| cs.label().to_string()),
                    conditions,
                }
            })
            .collect()
    }
}
