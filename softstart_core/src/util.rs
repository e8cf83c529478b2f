//! Numeric helpers shared by the gate and the controller.

/// Relative tolerance used when comparing output values.
pub const VALUE_EPSILON: f64 = 1e-9;

/// Tolerance-based equality: `|a - b| <= ε · max(1, |a|, |b|)`.
///
/// Non-finite inputs never compare equal.
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    if !(a.is_finite() && b.is_finite()) {
        return false;
    }
    let scale = 1.0_f64.max(a.abs()).max(b.abs());
    (a - b).abs() <= VALUE_EPSILON * scale
}

/// Status line attached to every emitted value, e.g. `Output: 42.00`.
#[inline]
pub fn format_status(value: f64) -> String {
    format!("Output: {value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_absorbs_rounding_noise() {
        assert!(approx_eq(0.1 + 0.2, 0.3));
        assert!(approx_eq(1e12, 1e12 + 1e-1));
        assert!(!approx_eq(1.0, 1.001));
        assert!(!approx_eq(0.0, 1e-6));
    }

    #[test]
    fn approx_eq_rejects_non_finite() {
        assert!(!approx_eq(f64::NAN, f64::NAN));
        assert!(!approx_eq(f64::INFINITY, f64::INFINITY));
    }

    #[test]
    fn status_uses_two_decimals() {
        assert_eq!(format_status(42.0), "Output: 42.00");
        assert_eq!(format_status(1.584_893), "Output: 1.58");
        assert_eq!(format_status(-3.0), "Output: -3.00");
    }
}
