const FLOAT_TO_INT_MAX: f64 = 9007199254740991_f64;

/// Converting float to int has undefined behaviour for huge floats: https://stackoverflow.com/a/41139453.
/// Refuse to convert floats with magnitude greater than 2**53 - 1, after which 64-bit floats no
/// longer retain integer precision.
pub(crate) fn f64_to_i64_safe(f: f64) -> Option<i64> {
    if f.abs() <= FLOAT_TO_INT_MAX {
        Some(f as i64)
    } else {
        None
    }
}

/// Splits `lo-hi` on the first dash that is not a leading sign.
pub(crate) fn split_range(raw: &str) -> Option<(&str, &str)> {
    let raw = raw.trim();
    let start = usize::from(raw.starts_with('-'));
    let idx = raw[start..].find('-')? + start;
    Some((raw[..idx].trim(), raw[idx + 1..].trim()))
}
