use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::ConditionError;
use crate::util::split_range;

/// Matches an address against a single address, a CIDR network (`10.0.0.0/8`) or an inclusive
/// address range (`10.0.0.1-10.0.0.50`). Families never match each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IpMatcher {
    Exact(IpAddr),
    Network { network: IpAddr, prefix: u8 },
    Range { start: IpAddr, end: IpAddr },
}

/// Address as an integer plus the bit width of its family.
fn to_bits(addr: &IpAddr) -> (u128, u8) {
    match addr {
        IpAddr::V4(v4) => (u128::from(u32::from(*v4)), 32),
        IpAddr::V6(v6) => (u128::from(*v6), 128),
    }
}

fn same_family(a: &IpAddr, b: &IpAddr) -> bool {
    a.is_ipv4() == b.is_ipv4()
}

// Prefixes longer than the family width are treated as the full width.
fn mask(prefix: u8, width: u8) -> u128 {
    if prefix == 0 {
        0
    } else {
        let host_bits = u32::from(width.saturating_sub(prefix));
        (u128::MAX << host_bits) & (u128::MAX >> (128 - u32::from(width)))
    }
}

impl IpMatcher {
    pub fn contains(&self, addr: &IpAddr) -> bool {
        match self {
            IpMatcher::Exact(exact) => exact == addr,
            IpMatcher::Network { network, prefix } => {
                if !same_family(network, addr) {
                    return false;
                }
                let (net_bits, width) = to_bits(network);
                let (addr_bits, _) = to_bits(addr);
                let mask = mask(*prefix, width);
                net_bits & mask == addr_bits & mask
            }
            IpMatcher::Range { start, end } => {
                if !same_family(start, addr) {
                    return false;
                }
                let (addr_bits, _) = to_bits(addr);
                to_bits(start).0 <= addr_bits && addr_bits <= to_bits(end).0
            }
        }
    }
}

impl FromStr for IpMatcher {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConditionError::InvalidIpAddress(s.to_string());
        let s = s.trim();

        if let Some((network, prefix)) = s.split_once('/') {
            let network: IpAddr = network.trim().parse().map_err(|_| invalid())?;
            let prefix: u8 = prefix.trim().parse().map_err(|_| invalid())?;
            if prefix > to_bits(&network).1 {
                return Err(invalid());
            }
            return Ok(IpMatcher::Network { network, prefix });
        }

        if let Some((start, end)) = split_range(s) {
            let start: IpAddr = start.parse().map_err(|_| invalid())?;
            let end: IpAddr = end.parse().map_err(|_| invalid())?;
            if !same_family(&start, &end) || to_bits(&start).0 > to_bits(&end).0 {
                return Err(invalid());
            }
            return Ok(IpMatcher::Range { start, end });
        }

        s.parse().map(IpMatcher::Exact).map_err(|_| invalid())
    }
}

impl fmt::Display for IpMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpMatcher::Exact(addr) => write!(f, "{}", addr),
            IpMatcher::Network { network, prefix } => write!(f, "{}/{}", network, prefix),
            IpMatcher::Range { start, end } => write!(f, "{}-{}", start, end),
        }
    }
}
