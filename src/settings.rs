use chrono::FixedOffset;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

/// Process-wide configuration read by the built-in condition sets.
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Addresses, CIDR networks or address ranges considered internal.
    pub internal_ips: Vec<String>,

    /// When false, the application and active-timezone date sets use server local time.
    pub use_tz: bool,

    /// Application default timezone, written as an offset such as `"-05:00"`. UTC when unset.
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub time_zone: Option<FixedOffset>,

    /// Host name reported by the host condition set instead of the operating system's.
    pub hostname: Option<String>,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Settings, serde_json::Error> {
        serde_json::from_str(json)
    }
}
