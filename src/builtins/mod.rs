//! Built-in condition sets: client address, server host, user attributes, the current date in
//! three reference frames, and caller-declared attribute sets.

mod attributes;
mod date;
mod host;
mod ip;
mod user;

pub use attributes::*;
pub use date::*;
pub use host::*;
pub use ip::*;
pub use user::*;

/// Identifier of [IPAddressConditionSet].
pub const IP_ADDRESS_CONDITION_SET: &str = "switchyard.builtins.IPAddressConditionSet";
/// Identifier of [HostConditionSet].
pub const HOST_CONDITION_SET: &str = "switchyard.builtins.HostConditionSet";
/// Identifier of [UserConditionSet].
pub const USER_CONDITION_SET: &str = "switchyard.builtins.UserConditionSet";
/// Identifier of [UTCTodayConditionSet].
pub const UTC_TODAY_CONDITION_SET: &str = "switchyard.builtins.UTCTodayConditionSet";
/// Identifier of [AppTodayConditionSet].
pub const APP_TODAY_CONDITION_SET: &str = "switchyard.builtins.AppTodayConditionSet";
/// Identifier of [ActiveTimezoneTodayConditionSet].
pub const ACTIVE_TIMEZONE_TODAY_CONDITION_SET: &str =
    "switchyard.builtins.ActiveTimezoneTodayConditionSet";
