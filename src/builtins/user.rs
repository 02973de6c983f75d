use crate::attribute_value::AttributeValue;
use crate::condition_set::ConditionSet;
use crate::context::Context;
use crate::field::{Field, FieldKind, Fields};

use super::USER_CONDITION_SET;

/// Matches attributes of the evaluated [crate::User], either given directly or attached to a
/// [crate::Request]. The percent rollout is bucketed by user id.
pub struct UserConditionSet {
    fields: Fields,
}

impl UserConditionSet {
    pub fn new() -> Self {
        UserConditionSet {
            fields: Fields::builtin(vec![
                Field::new("username", FieldKind::String).with_label("Username"),
                Field::new("email", FieldKind::String).with_label("Email"),
                Field::new("is_anonymous", FieldKind::Boolean).with_label("Anonymous"),
                Field::new("is_staff", FieldKind::Boolean).with_label("Staff"),
                Field::new("is_superuser", FieldKind::Boolean).with_label("Superuser"),
                Field::new("date_joined", FieldKind::OnOrAfterDate)
                    .with_label("Joined on or after"),
                Field::new("percent", FieldKind::Percent).with_label("Percent"),
            ]),
        }
    }
}

impl Default for UserConditionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionSet for UserConditionSet {
    fn id(&self) -> &str {
        USER_CONDITION_SET
    }

    fn label(&self) -> &str {
        "User"
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }

    fn can_execute(&self, context: Option<&Context>) -> bool {
        context.and_then(Context::user).is_some()
    }

    fn field_value(&self, context: Option<&Context>, field_name: &str) -> Option<AttributeValue> {
        let user = context?.user()?;
        match field_name {
            "percent" => user.value_of("id"),
            _ => user.value_of(field_name),
        }
    }
}
