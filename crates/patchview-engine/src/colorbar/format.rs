/// Smallest and largest number of significant digits used for colorbar labels.
pub const MIN_PRECISION: usize = 3;
pub const MAX_PRECISION: usize = 8;

/// Significant digits needed to tell `vmin` and `vmax` apart.
///
/// `floor(log10(max(|vmin|, |vmax| / |vmin - vmax|))) + 1`, clamped to
/// `[3, 8]`. Equal bounds, or a logarithm argument that is not a positive
/// finite number, give 3.
pub fn label_precision(vmin: f64, vmax: f64) -> usize {
    if vmin == vmax {
        return MIN_PRECISION;
    }
    let arg = vmin.abs().max(vmax.abs() / (vmin - vmax).abs());
    if !arg.is_finite() || arg <= 0.0 {
        return MIN_PRECISION;
    }
    let digits = arg.log10() + 1.0;
    digits.clamp(MIN_PRECISION as f64, MAX_PRECISION as f64) as usize
}

/// Formats `value` with `precision` significant digits in general notation.
///
/// Fixed notation keeps at least one fractional digit (`1.0`, `0.0001`);
/// exponent notation is used when the decimal exponent is below -4 or at
/// least `precision - 1` (`1e+02`, `1.23e-05`). Trailing zeros are dropped.
pub fn format_label(value: f64, precision: usize) -> String {
    let p = precision.max(1);

    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    // Rounding to `p` digits first fixes the exponent (99.96 -> 1.00e2).
    let sci = format!("{:.*e}", p - 1, value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= p as i32 - 1 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exp.unsigned_abs())
    } else {
        let decimals = (p as i32 - 1 - exp).max(0) as usize;
        let fixed = format!("{:.*}", decimals, value);
        let trimmed = trim_fraction(&fixed);
        if trimmed.contains('.') {
            trimmed.to_string()
        } else {
            format!("{trimmed}.0")
        }
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── precision ─────────────────────────────────────────────────────────

    #[test]
    fn unit_range_uses_minimum_precision() {
        assert_eq!(label_precision(0.0, 1.0), 3);
    }

    #[test]
    fn close_bounds_need_more_digits() {
        assert_eq!(label_precision(4.999, 5.001), 4);
        assert_eq!(label_precision(1e9, 1e9 + 1.0), 8);
    }

    #[test]
    fn wide_range_around_one_stays_at_three() {
        assert_eq!(label_precision(0.001, 1000.0), 3);
    }

    #[test]
    fn large_magnitudes_cap_at_eight() {
        assert_eq!(label_precision(-1e12, 1e12), 8);
    }

    #[test]
    fn degenerate_bounds_fall_back() {
        assert_eq!(label_precision(2.0, 2.0), 3);
        assert_eq!(label_precision(0.0, 0.0), 3);
        assert_eq!(label_precision(f64::NAN, 1.0), 3);
        assert_eq!(label_precision(0.0, f64::INFINITY), 3);
    }

    // ── labels ────────────────────────────────────────────────────────────

    #[test]
    fn fixed_notation_keeps_one_fraction_digit() {
        assert_eq!(format_label(1.0, 3), "1.0");
        assert_eq!(format_label(0.0, 3), "0.0");
        assert_eq!(format_label(-0.0, 3), "-0.0");
        assert_eq!(format_label(4.999, 4), "4.999");
        assert_eq!(format_label(0.0001, 3), "0.0001");
        assert_eq!(format_label(12.5, 3), "12.5");
        assert_eq!(format_label(-0.25, 3), "-0.25");
    }

    #[test]
    fn exponent_notation_for_large_and_tiny_values() {
        assert_eq!(format_label(100.0, 3), "1e+02");
        assert_eq!(format_label(99.96, 3), "1e+02");
        assert_eq!(format_label(123456.0, 3), "1.23e+05");
        assert_eq!(format_label(1e-5, 3), "1e-05");
        assert_eq!(format_label(-2.5e-7, 3), "-2.5e-07");
        assert_eq!(format_label(1e100, 3), "1e+100");
    }

    #[test]
    fn precision_controls_the_switch() {
        assert_eq!(format_label(100.0, 4), "100.0");
        assert_eq!(format_label(1000.0, 4), "1e+03");
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(format_label(f64::NAN, 3), "nan");
        assert_eq!(format_label(f64::NEG_INFINITY, 3), "-inf");
    }
}
