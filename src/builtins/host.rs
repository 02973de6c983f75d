use log::warn;

use crate::attribute_value::AttributeValue;
use crate::condition_set::ConditionSet;
use crate::context::Context;
use crate::field::{Field, FieldKind, Fields};
use crate::settings::Settings;

use super::HOST_CONDITION_SET;

/// Matches the name of the host the process runs on. Needs no context.
pub struct HostConditionSet {
    fields: Fields,
    hostname: Option<String>,
}

impl HostConditionSet {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self::with_hostname(Some(hostname.into()))
    }

    /// Uses the configured host name, or asks the operating system.
    pub fn from_settings(settings: &Settings) -> Self {
        let hostname = settings.hostname.clone().or_else(|| {
            match hostname::get().map(|name| name.into_string()) {
                Ok(Ok(name)) => Some(name),
                _ => {
                    warn!("Could not determine the host name; hostname conditions will not match");
                    None
                }
            }
        });
        Self::with_hostname(hostname)
    }

    fn with_hostname(hostname: Option<String>) -> Self {
        HostConditionSet {
            fields: Fields::builtin(vec![
                Field::new("hostname", FieldKind::String).with_label("Hostname")
            ]),
            hostname,
        }
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }
}

impl ConditionSet for HostConditionSet {
    fn id(&self) -> &str {
        HOST_CONDITION_SET
    }

    fn label(&self) -> &str {
        "Host"
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }

    fn field_value(&self, _context: Option<&Context>, field_name: &str) -> Option<AttributeValue> {
        match field_name {
            "hostname" => self.hostname.as_deref().map(AttributeValue::from),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use maplit::btreemap;

    use super::*;
    use crate::condition::{Conditions, StoredCondition};

    fn conditions(hostname: &str) -> Conditions {
        btreemap! {
            HOST_CONDITION_SET.to_string() => btreemap! {
                "hostname".to_string() => vec![StoredCondition::include(hostname)],
            },
        }
    }

    #[test]
    fn matches_without_context() {
        let set = HostConditionSet::new("web-1");
        assert!(set.is_active(None, &conditions("web-1"), None));
        assert!(!set.is_active(None, &conditions("web-2"), None));
    }

    #[test]
    fn configured_hostname_wins() {
        let settings = Settings {
            hostname: Some("configured".into()),
            ..Settings::default()
        };
        let set = HostConditionSet::from_settings(&settings);
        assert_eq!(set.hostname(), Some("configured"));
    }

    #[test]
    fn falls_back_to_system_hostname() {
        let set = HostConditionSet::from_settings(&Settings::default());
        if let Some(name) = set.hostname() {
            assert!(set.is_active(None, &conditions(name), None));
        }
    }
}
