use std::net::IpAddr;

use crate::attribute_value::AttributeValue;
use crate::condition_set::ConditionSet;
use crate::context::Context;
use crate::error::ConditionError;
use crate::field::{Field, FieldKind, Fields};
use crate::ip::IpMatcher;
use crate::settings::Settings;

use super::IP_ADDRESS_CONDITION_SET;

/// Matches the client address of a [crate::Request]: exact address or network, membership in
/// the configured internal addresses, and a percent rollout bucketed by address.
pub struct IPAddressConditionSet {
    fields: Fields,
    internal_ips: Vec<IpMatcher>,
}

impl IPAddressConditionSet {
    pub fn new(settings: &Settings) -> Result<Self, ConditionError> {
        let internal_ips = settings
            .internal_ips
            .iter()
            .map(|raw| raw.parse())
            .collect::<Result<Vec<IpMatcher>, _>>()?;

        Ok(IPAddressConditionSet {
            fields: Fields::builtin(vec![
                Field::new("ip_address", FieldKind::IpAddress).with_label("IP Address"),
                Field::new("internal_ip", FieldKind::Boolean).with_label("Internal IPs"),
                Field::new("percent", FieldKind::Percent).with_label("Percent"),
            ]),
            internal_ips,
        })
    }

    fn is_internal(&self, addr: &str) -> bool {
        match addr.trim().parse::<IpAddr>() {
            Ok(addr) => self.internal_ips.iter().any(|m| m.contains(&addr)),
            Err(_) => false,
        }
    }
}

impl ConditionSet for IPAddressConditionSet {
    fn id(&self) -> &str {
        IP_ADDRESS_CONDITION_SET
    }

    fn label(&self) -> &str {
        "IP Address"
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }

    fn can_execute(&self, context: Option<&Context>) -> bool {
        context.and_then(Context::as_request).is_some()
    }

    fn field_value(&self, context: Option<&Context>, field_name: &str) -> Option<AttributeValue> {
        let addr = context?.as_request()?.remote_addr()?;
        match field_name {
            "ip_address" | "percent" => Some(AttributeValue::from(addr)),
            "internal_ip" => Some(AttributeValue::Bool(self.is_internal(addr))),
            _ => None,
        }
    }
}
