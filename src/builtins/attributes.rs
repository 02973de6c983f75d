use crate::attribute_value::AttributeValue;
use crate::condition_set::ConditionSet;
use crate::context::Context;
use crate::error::ConditionError;
use crate::field::{Field, Fields};

/// A caller-declared condition set whose field values are read by name from the context, see
/// [Context::attribute].
#[derive(Debug)]
pub struct AttributeConditionSet {
    id: String,
    label: String,
    fields: Fields,
}

impl AttributeConditionSet {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        fields: Vec<Field>,
    ) -> Result<Self, ConditionError> {
        Ok(AttributeConditionSet {
            id: id.into(),
            label: label.into(),
            fields: Fields::new(fields)?,
        })
    }
}

impl ConditionSet for AttributeConditionSet {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }

    fn can_execute(&self, context: Option<&Context>) -> bool {
        context.is_some()
    }

    fn field_value(&self, context: Option<&Context>, field_name: &str) -> Option<AttributeValue> {
        context?.attribute(field_name)
    }
}
