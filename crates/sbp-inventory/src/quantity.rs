use std::str::FromStr;

use rust_decimal::Decimal;

/// Whether `value` may be stored in a quantity field: empty, or an unsigned
/// decimal such as `12`, `12.` or `12.5` that fits in a [`Decimal`].
pub fn is_quantity_input(value: &str) -> bool {
    value.is_empty() || to_decimal(value).is_some()
}

/// Positive quantity, or `None` for empty, malformed or zero input.
pub fn parse_quantity(value: &str) -> Option<Decimal> {
    to_decimal(value.trim()).filter(|quantity| *quantity > Decimal::ZERO)
}

fn to_decimal(value: &str) -> Option<Decimal> {
    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (value, None),
    };

    let well_formed = !whole.is_empty()
        && whole.bytes().all(|byte| byte.is_ascii_digit())
        && fraction.is_none_or(|fraction| fraction.bytes().all(|byte| byte.is_ascii_digit()));
    if !well_formed {
        return None;
    }

    Decimal::from_str(value.strip_suffix('.').unwrap_or(value)).ok()
}
