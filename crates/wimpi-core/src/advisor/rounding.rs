//! Rounding of suggested amounts to denomination-friendly figures

/// Upper-exclusive bounds paired with the unit used below them
const ROUNDING_TIERS: [(f64, f64); 3] = [
    (10_000.0, 1_000.0),
    (50_000.0, 5_000.0),
    (250_000.0, 10_000.0),
];

/// Unit used at or above the last tier bound
const TOP_UNIT: f64 = 25_000.0;

/// Round an amount up to a sensible denomination
///
/// Never rounds down, so a suggestion is never short because of rounding.
/// Non-positive input yields 0.
pub fn round_to_sensible_amount(amount: f64) -> f64 {
    if amount.is_nan() || amount <= 0.0 {
        return 0.0;
    }
    let unit = ROUNDING_TIERS
        .iter()
        .find(|(bound, _)| amount < *bound)
        .map(|(_, unit)| *unit)
        .unwrap_or(TOP_UNIT);
    (amount / unit).ceil() * unit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers() {
        assert_eq!(round_to_sensible_amount(1.0), 1_000.0);
        assert_eq!(round_to_sensible_amount(9_001.0), 10_000.0);
        assert_eq!(round_to_sensible_amount(10_000.0), 10_000.0);
        assert_eq!(round_to_sensible_amount(10_001.0), 15_000.0);
        assert_eq!(round_to_sensible_amount(49_999.0), 50_000.0);
        assert_eq!(round_to_sensible_amount(50_001.0), 60_000.0);
        assert_eq!(round_to_sensible_amount(233_333.33), 240_000.0);
        assert_eq!(round_to_sensible_amount(250_000.0), 250_000.0);
        assert_eq!(round_to_sensible_amount(250_001.0), 275_000.0);
        assert_eq!(round_to_sensible_amount(1_000_000.0), 1_000_000.0);
    }

    #[test]
    fn test_non_positive_is_zero() {
        assert_eq!(round_to_sensible_amount(0.0), 0.0);
        assert_eq!(round_to_sensible_amount(-1.0), 0.0);
        assert_eq!(round_to_sensible_amount(-250_000.0), 0.0);
        assert_eq!(round_to_sensible_amount(f64::NAN), 0.0);
    }

    #[test]
    fn test_never_below_input_and_idempotent() {
        let mut x = 0.5;
        while x < 5_000_000.0 {
            let once = round_to_sensible_amount(x);
            assert!(once >= x, "round({}) = {} is below input", x, once);
            assert_eq!(round_to_sensible_amount(once), once, "not idempotent at {}", x);
            x = x * 1.37 + 11.0;
        }
    }
}
