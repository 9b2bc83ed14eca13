//! Tidal turbine power curve models.

/// Normalised tidal turbine production under the cubic power curve:
/// zero below `0.15 v_d` and above `1.25 v_d`, `(v / v_d)^3` up to the
/// design speed, rated in between.
pub fn cubic_production(tidal_speed_ms: f64, design_speed_ms: f64) -> f64 {
    if tidal_speed_ms < 0.15 * design_speed_ms || tidal_speed_ms > 1.25 * design_speed_ms {
        0.0
    } else if tidal_speed_ms <= design_speed_ms {
        (tidal_speed_ms / design_speed_ms).powi(3)
    } else {
        1.0
    }
}

/// Normalised tidal turbine production under the exponential power curve,
/// in terms of the normalised deviation `s = (v - v_d) / v_d`.
pub fn exponential_production(tidal_speed_ms: f64, design_speed_ms: f64) -> f64 {
    let s = (tidal_speed_ms - design_speed_ms) / design_speed_ms;

    if !(-0.71..=0.65).contains(&s) {
        0.0
    } else if s <= 0.0 {
        1.69215 * (1.25909 * s).exp() - 0.69215
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubic_cut_in_and_cut_out() {
        assert_eq!(cubic_production(0.14 * 2.5, 2.5), 0.0);
        assert_eq!(cubic_production(1.26 * 2.5, 2.5), 0.0);
    }

    #[test]
    fn test_cubic_law_below_design() {
        let half = cubic_production(1.25, 2.5);
        assert!((half - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_cubic_rated_band() {
        assert!((cubic_production(2.5, 2.5) - 1.0).abs() < 1e-12);
        assert!((cubic_production(2.8, 2.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_exponential_rated_at_design() {
        assert!((exponential_production(2.5, 2.5) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_exponential_cut_out() {
        assert_eq!(exponential_production(2.5 * (1.0 - 0.72), 2.5), 0.0);
        assert_eq!(exponential_production(2.5 * 1.66, 2.5), 0.0);
    }

    #[test]
    fn test_exponential_rises_to_rated() {
        let low = exponential_production(1.0, 2.5);
        let mid = exponential_production(2.0, 2.5);
        assert!(low > 0.0 && mid > low && mid < 1.0);
        assert!((exponential_production(3.0, 2.5) - 1.0).abs() < 1e-12);
    }
}
