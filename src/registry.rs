use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use log::debug;
use parking_lot::RwLock;

use crate::builtins::{
    ActiveTimezoneTodayConditionSet, AppTodayConditionSet, HostConditionSet,
    IPAddressConditionSet, UTCTodayConditionSet, UserConditionSet,
};
use crate::clock::Clock;
use crate::condition_set::ConditionSet;
use crate::error::ConditionError;
use crate::settings::Settings;

/// Registry maps condition set identifiers to the registered instances.
///
/// Lookups take a shared lock and return a cloned handle, so evaluation never holds the lock
/// while a condition set runs. Registration is rare and takes the exclusive lock.
#[derive(Default)]
pub struct Registry {
    condition_sets: RwLock<HashMap<String, Arc<dyn ConditionSet>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in condition set.
    pub fn with_builtins(
        settings: &Settings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConditionError> {
        let registry = Registry::new();
        registry.register(IPAddressConditionSet::new(settings)?);
        registry.register(HostConditionSet::from_settings(settings));
        registry.register(UserConditionSet::new());
        registry.register(UTCTodayConditionSet::new(clock.clone()));
        registry.register(AppTodayConditionSet::new(settings, clock.clone()));
        registry.register(ActiveTimezoneTodayConditionSet::new(settings, clock));
        Ok(registry)
    }

    /// Registers `condition_set` under its identifier, replacing any previous registration.
    pub fn register<C: ConditionSet + 'static>(&self, condition_set: C) {
        self.register_shared(Arc::new(condition_set));
    }

    pub fn register_shared(&self, condition_set: Arc<dyn ConditionSet>) {
        let id = condition_set.id().to_string();
        debug!("Registering condition set {}", id);
        if self
            .condition_sets
            .write()
            .insert(id.clone(), condition_set)
            .is_some()
        {
            debug!("Condition set {} was already registered; replaced", id);
        }
    }

    /// Removes the condition set registered under `id`, if any.
    pub fn unregister(&self, id: &str) -> Option<Arc<dyn ConditionSet>> {
        let removed = self.condition_sets.write().remove(id);
        if removed.is_some() {
            debug!("Unregistered condition set {}", id);
        }
        removed
    }

    /// Looks up a condition set by identifier. None means stored conditions under `id` cannot
    /// be evaluated and should be skipped.
    pub fn get(&self, id: &str) -> Option<Arc<dyn ConditionSet>> {
        self.condition_sets.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.condition_sets.read().contains_key(id)
    }

    /// Identifiers of every registered condition set, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.condition_sets.read().keys().cloned().sorted().collect()
    }

    pub fn len(&self) -> usize {
        self.condition_sets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.condition_sets.read().is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Registry[{}]", self.ids().iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use chrono::{FixedOffset, TimeZone, Utc};
    use spectral::prelude::*;

    use super::*;
    use crate::builtins::{AttributeConditionSet, IP_ADDRESS_CONDITION_SET};
    use crate::clock::{FixedClock, SystemClock};
    use crate::field::{Field, FieldKind};

    fn custom(id: &str, label: &str) -> AttributeConditionSet {
        AttributeConditionSet::new(id, label, vec![Field::new("plan", FieldKind::String)]).unwrap()
    }

    #[test]
    fn register_and_lookup() {
        let registry = Registry::new();
        assert!(registry.is_empty());

        registry.register(custom("custom.Plan", "Plan"));
        assert_that!(registry.len()).is_equal_to(1);
        assert!(registry.contains("custom.Plan"));
        assert_that!(registry.get("custom.Plan").map(|cs| cs.label().to_string()))
            .contains_value("Plan".to_string());
        assert!(registry.get("custom.Missing").is_none());
    }

    #[test]
    fn re_registration_replaces() {
        let registry = Registry::new();
        registry.register(custom("custom.Plan", "Plan"));
        registry.register(custom("custom.Plan", "Billing plan"));

        assert_that!(registry.len()).is_equal_to(1);
        assert_that!(registry.get("custom.Plan").map(|cs| cs.label().to_string()))
            .contains_value("Billing plan".to_string());
    }

    #[test]
    fn unregister_is_a_no_op_when_absent() {
        let registry = Registry::new();
        registry.register(custom("custom.Plan", "Plan"));

        assert!(registry.unregister("custom.Plan").is_some());
        assert!(registry.unregister("custom.Plan").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn with_builtins_registers_everything() {
        let clock = FixedClock::new(
            Utc.with_ymd_and_hms(2016, 1, 1, 6, 0, 0).unwrap(),
            FixedOffset::west_opt(6 * 3600).unwrap(),
        );
        let registry = Registry::with_builtins(&Settings::default(), Arc::new(clock)).unwrap();
        assert_that!(registry.ids()).is_equal_to(vec![
            "switchyard.builtins.ActiveTimezoneTodayConditionSet".to_string(),
            "switchyard.builtins.AppTodayConditionSet".to_string(),
            "switchyard.builtins.HostConditionSet".to_string(),
            "switchyard.builtins.IPAddressConditionSet".to_string(),
            "switchyard.builtins.UTCTodayConditionSet".to_string(),
            "switchyard.builtins.UserConditionSet".to_string(),
        ]);
        assert!(registry.contains(IP_ADDRESS_CONDITION_SET));
    }

    #[test]
    fn with_builtins_rejects_bad_internal_ips() {
        let settings = Settings {
            internal_ips: vec!["not-an-address".into()],
            ..Settings::default()
        };
        let result = Registry::with_builtins(&settings, Arc::new(SystemClock));
        assert!(matches!(result, Err(ConditionError::InvalidIpAddress(_))));
    }

    #[test]
    fn concurrent_readers_and_writer() {
        let registry = Arc::new(Registry::new());
        registry.register(custom("custom.Plan", "Plan"));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        assert!(registry.get("custom.Plan").is_some());
                    }
                })
            })
            .collect();

        for i in 0..100 {
            registry.register(custom(&format!("custom.Other{}", i), "Other"));
        }

        for reader in readers {
            reader.join().unwrap();
        }
        assert_that!(registry.len()).is_equal_to(101);
    }

    #[test]
    fn debug_lists_ids() {
        let registry = Registry::new();
        registry.register(custom("b", "B"));
        registry.register(custom("a", "A"));
        assert_eq!(format!("{:?}", registry), "Registry[a, b]");
    }
}
