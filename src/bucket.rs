use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use sha1::{Digest, Sha1};

use crate::error::ConditionError;

/// Number of buckets an identity can be placed into; buckets are numbered `0..BUCKET_COUNT`.
pub const BUCKET_COUNT: i64 = 100;

lazy_static! {
    static ref PERCENT_RANGE_REGEX: Regex = Regex::new(r"^\s*(\d{1,3})\s*-\s*(\d{1,3})\s*$").unwrap();
}

/// Places `identity` into a bucket in `[0, 99]`.
///
/// The first 15 hex digits of the identity's SHA-1 digest are read as an integer and reduced
/// modulo 100, so any implementation that follows the same steps buckets identically.
pub fn bucket(identity: &str) -> u8 {
    let mut hash = Sha1::new();
    hash.update(identity.as_bytes());

    let digest = hash.finalize();
    let hexhash = base16ct::lower::encode_string(&digest);

    let hexhash_15 = &hexhash[..15]; // 60 bits always fit in an i64
    let numhash = i64::from_str_radix(hexhash_15, 16).unwrap_or_default();

    (numhash % BUCKET_COUNT) as u8
}

/// An inclusive `lo-hi` percent range as stored on a percent field.
///
/// `hi` may be written as 100, which is accepted as an alias for the top bucket so that
/// `0-100` always matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PercentRange {
    lo: u8,
    hi: u8,
}

impl PercentRange {
    pub fn new(lo: u8, hi: u8) -> Result<Self, ConditionError> {
        if lo > hi || i64::from(lo) >= BUCKET_COUNT || i64::from(hi) > BUCKET_COUNT {
            return Err(ConditionError::InvalidPercentRange(format!("{}-{}", lo, hi)));
        }
        Ok(PercentRange { lo, hi })
    }

    pub fn lo(&self) -> u8 {
        self.lo
    }

    pub fn hi(&self) -> u8 {
        self.hi
    }

    pub fn contains_bucket(&self, bucket: u8) -> bool {
        self.lo <= bucket && bucket <= self.hi
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.contains_bucket(bucket(identity))
    }
}

impl FromStr for PercentRange {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConditionError::InvalidPercentRange(s.to_string());
        let captures = PERCENT_RANGE_REGEX.captures(s).ok_or_else(invalid)?;
        let lo = captures[1].parse::<u8>().map_err(|_| invalid())?;
        let hi = captures[2].parse::<u8>().map_err(|_| invalid())?;
        PercentRange::new(lo, hi).map_err(|_| invalid())
    }
}

impl fmt::Display for PercentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lo, self.hi)
    }
}
