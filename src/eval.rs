use std::collections::HashSet;

use log::warn;
use serde::Serialize;

use crate::condition::SwitchType;
use crate::context::Context;
use crate::registry::Registry;
use crate::store::Store;
use crate::switch::{Switch, SwitchStatus};

/// The outcome of evaluating a switch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detail {
    /// Whether the switch is active.
    pub active: bool,

    /// A reason struct describing the main factor that decided [Detail::active].
    pub reason: Reason,
}

impl Detail {
    fn inactive(reason: Reason) -> Detail {
        Detail {
            active: false,
            reason,
        }
    }

    /// Returns an inactive detail carrying `error`.
    pub fn err(error: Error) -> Detail {
        Detail::inactive(Reason::Error { error })
    }
}

/// Reason describes why a switch evaluation came out the way it did.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind")]
pub enum Reason {
    /// The switch is disabled.
    Disabled,
    /// The switch is globally enabled.
    Global,
    /// The switch inherits from its parent, whose result was used.
    #[serde(rename_all = "camelCase")]
    Inherited {
        /// The key of the parent switch.
        parent_key: String,
    },
    /// The switch is selective and one condition set matched.
    #[serde(rename_all = "camelCase")]
    ConditionMatch {
        /// Identifier of the first condition set that matched.
        condition_set: String,
    },
    /// The switch is selective and no registered condition set matched.
    NoMatch,
    /// The switch could not be evaluated and is treated as inactive.
    Error {
        /// An error representing the [Reason::Error].
        #[serde(rename = "errorKind")]
        error: Error,
    },
}

/// Error is returned via a [Reason::Error] when a switch could not be evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Error {
    /// SwitchNotFound indicates that the caller provided a switch key that did not match any
    /// known switch.
    SwitchNotFound,
    /// MalformedSwitch indicates that the switch data is inconsistent, e.g. inheritance loops
    /// back onto a switch already being evaluated.
    MalformedSwitch,
}

/// Evaluate a switch for the given context.
///
/// `switch_type` restricts a SELECTIVE switch to stored conditions of that type; None consults
/// every stored condition. A `context` of None still evaluates condition sets that do not need
/// one, such as the date and host sets.
pub fn evaluate(
    store: &dyn Store,
    registry: &Registry,
    switch: &Switch,
    context: Option<&Context>,
    switch_type: Option<SwitchType>,
) -> Detail {
    let mut inherit_chain = HashSet::new();
    evaluate_internal(store, registry, switch, context, switch_type, &mut inherit_chain)
}

/// Look up `switch_key` in `store` and evaluate it. A missing switch is inactive with
/// [Error::SwitchNotFound].
pub fn evaluate_key(
    store: &dyn Store,
    registry: &Registry,
    switch_key: &str,
    context: Option<&Context>,
    switch_type: Option<SwitchType>,
) -> Detail {
    match store.switch(switch_key) {
        Some(switch) => evaluate(store, registry, switch, context, switch_type),
        None => Detail::err(Error::SwitchNotFound),
    }
}

/// Whether the switch `switch_key` is active for `context`.
pub fn is_active(
    store: &dyn Store,
    registry: &Registry,
    switch_key: &str,
    context: Option<&Context>,
    switch_type: Option<SwitchType>,
) -> bool {
    evaluate_key(store, registry, switch_key, context, switch_type).active
}

fn evaluate_internal(
    store: &dyn Store,
    registry: &Registry,
    switch: &Switch,
    context: Option<&Context>,
    switch_type: Option<SwitchType>,
    inherit_chain: &mut HashSet<String>,
) -> Detail {
    match switch.status {
        SwitchStatus::Disabled => Detail::inactive(Reason::Disabled),
        SwitchStatus::Global => Detail {
            active: true,
            reason: Reason::Global,
        },
        SwitchStatus::Selective => evaluate_conditions(registry, switch, context, switch_type),
        SwitchStatus::Inherit => {
            if !inherit_chain.insert(switch.key.clone()) {
                warn!("inheritance of {} loops back onto itself", switch.key);
                return Detail::err(Error::MalformedSwitch);
            }

            let parent = match store.parent(&switch.key) {
                Some(parent) => parent,
                None => {
                    warn!(
                        "switch {} inherits but has no parent; treating it as disabled",
                        switch.key
                    );
                    return Detail::inactive(Reason::Disabled);
                }
            };

            let detail =
                evaluate_internal(store, registry, parent, context, switch_type, inherit_chain);
            if let Reason::Error { .. } = detail.reason {
                return detail;
            }
            Detail {
                active: detail.active,
                reason: Reason::Inherited {
                    parent_key: parent.key.clone(),
                },
            }
        }
    }
}

// AND across fields happens inside each condition set; across condition sets it is OR.
fn evaluate_conditions(
    registry: &Registry,
    switch: &Switch,
    context: Option<&Context>,
    switch_type: Option<SwitchType>,
) -> Detail {
    for namespace in switch.conditions.keys() {
        let condition_set = match registry.get(namespace) {
            Some(condition_set) => condition_set,
            None => {
                warn!(
                    "switch {} has conditions for unregistered condition set {}; skipping them",
                    switch.key, namespace
                );
                continue;
            }
        };

        if condition_set.is_active(context, &switch.conditions, switch_type) {
            return Detail {
                active: true,
                reason: Reason::ConditionMatch {
                    condition_set: namespace.clone(),
                },
            };
        }
    }

    Detail::inactive(Reason::NoMatch)
}
