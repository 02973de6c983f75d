use thiserror::Error;

/// Errors raised by administrative operations: registering condition sets, declaring fields and
/// adding stored conditions. Evaluation never surfaces these; a bad stored value simply fails to
/// match.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConditionError {
    /// No condition set is registered under the given identifier.
    #[error("condition set `{0}` is not registered")]
    UnknownConditionSet(String),

    /// The condition set has no field with the given name.
    #[error("condition set `{condition_set}` has no field `{field}`")]
    UnknownField {
        condition_set: String,
        field: String,
    },

    /// Two fields of one condition set share a name.
    #[error("duplicate field `{0}`")]
    DuplicateField(String),

    /// A percent range was not `lo-hi` with `0 <= lo <= hi <= 100` and `lo <= 99`.
    #[error("invalid percent range `{0}`")]
    InvalidPercentRange(String),

    /// A numeric range was not `lo-hi` with `lo <= hi`.
    #[error("invalid range `{0}`")]
    InvalidRange(String),

    /// A date threshold was not an ISO8601 date or date-time.
    #[error("invalid date `{0}`")]
    InvalidDate(String),

    /// An address was not an IP, a CIDR network or an address range.
    #[error("invalid ip address or network `{0}`")]
    InvalidIpAddress(String),
}
