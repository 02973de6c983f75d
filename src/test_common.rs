#![cfg(test)]

use std::collections::HashMap;

use crate::store::Store;
use crate::switch::Switch;

pub struct TestStore {
    switches: HashMap<String, Switch>,
}

impl TestStore {
    pub fn new() -> Self {
        let switches: Vec<Switch> = serde_json::from_str(
            r#"[
                {"key": "disabled", "status": "disabled"},
                {"key": "global", "status": "global"},
                {"key": "empty", "status": "selective"},
                {
                    "key": "two_sets",
                    "status": "selective",
                    "conditions": {
                        "switchyard.builtins.UserConditionSet": {
                            "username": [["i", "alice"]]
                        },
                        "switchyard.builtins.IPAddressConditionSet": {
                            "internal_ip": [{"operator": "include", "value": ""}]
                        }
                    }
                },
                {
                    "key": "two_fields",
                    "status": "selective",
                    "conditions": {
                        "switchyard.builtins.UserConditionSet": {
                            "username": [["i", "alice", "feature"]],
                            "is_staff": [["i", ""]]
                        }
                    }
                },
                {
                    "key": "everyone_but_bob",
                    "status": "selective",
                    "conditions": {
                        "switchyard.builtins.UserConditionSet": {
                            "username": [["e", "bob"]]
                        }
                    }
                },
                {
                    "key": "everyone",
                    "status": "selective",
                    "conditions": {
                        "switchyard.builtins.UserConditionSet": {
                            "percent": [["i", "0-100"]]
                        }
                    }
                },
                {
                    "key": "nobody",
                    "status": "selective",
                    "conditions": {
                        "switchyard.builtins.UserConditionSet": {
                            "percent": [["i", "0-0"]]
                        }
                    }
                },
                {
                    "key": "new_year",
                    "status": "selective",
                    "conditions": {
                        "switchyard.builtins.UTCTodayConditionSet": {
                            "now_is_on_or_after": [["i", "2016-01-01"]]
                        }
                    }
                },
                {
                    "key": "stale",
                    "status": "selective",
                    "conditions": {
                        "retired.Set": {
                            "plan": [["i", "pro"]]
                        }
                    }
                },
                {
                    "key": "ab",
                    "status": "selective",
                    "conditions": {
                        "tests.Flags": {
                            "field_ab_test": [["i", "true", "ab_test"]],
                            "field_feature": [["i", "false", "feature"]]
                        }
                    }
                },
                {"key": "two_sets:child", "status": "inherit"},
                {"key": "two_sets:child:grandchild", "status": "inherit"},
                {"key": "disabled:child", "status": "inherit"},
                {"key": "missing:child", "status": "inherit"},
                {"key": "orphan", "status": "inherit"}
            ]"#,
        )
        .unwrap();

        Self {
            switches: switches
                .into_iter()
                .map(|switch| (switch.key.clone(), switch))
                .collect(),
        }
    }
}

impl Store for TestStore {
    fn switch(&self, switch_key: &str) -> Option<&Switch> {
        self.switches.get(switch_key)
    }
}
