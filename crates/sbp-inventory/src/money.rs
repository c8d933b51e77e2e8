use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Whole rupiah with `.` thousands separators, e.g. `1.250.000`.
pub fn format_rupiah(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i128()
        .unwrap_or_default();

    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_with_dots() {
        assert_eq!(format_rupiah(Decimal::ZERO), "0");
        assert_eq!(format_rupiah(Decimal::new(999, 0)), "999");
        assert_eq!(format_rupiah(Decimal::new(20_000, 0)), "20.000");
        assert_eq!(format_rupiah(Decimal::new(1_250_000, 0)), "1.250.000");
        assert_eq!(format_rupiah(Decimal::new(-45_000, 0)), "-45.000");
    }

    #[test]
    fn rounds_to_whole_rupiah() {
        assert_eq!(format_rupiah(Decimal::new(150_005, 1)), "15.001");
        assert_eq!(format_rupiah(Decimal::new(150_004, 1)), "15.000");
    }
}
