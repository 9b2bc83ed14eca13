//! Wave energy converter production models.
//!
//! Both closed-form models are normalised about the design sea state
//! `(H_d, T_d)` and capped at rated production; outside the operating
//! envelope the device produces nothing.

/// Gaussian decay exponents on normalised height and period deviation.
const GAUSSIAN_HEIGHT_DECAY: f64 = 15.6867;
const GAUSSIAN_PERIOD_DECAY: f64 = 2.25119;

/// Cut-out fence for the paraboloid model, as a multiple of design values.
const PARABOLOID_CUT_OUT: f64 = 2.0;

/// Normalised production under the Gaussian model: rated at the design sea
/// state, decaying with the squared normalised deviation in H_s and T_e.
pub fn gaussian_production(
    significant_wave_height_m: f64,
    energy_period_s: f64,
    design_height_m: f64,
    design_period_s: f64,
) -> f64 {
    let sh = (significant_wave_height_m - design_height_m) / design_height_m;
    let st = (energy_period_s - design_period_s) / design_period_s;
    (-GAUSSIAN_HEIGHT_DECAY * sh.powi(2) - GAUSSIAN_PERIOD_DECAY * st.powi(2)).exp()
}

/// Normalised production under the paraboloid model: the deep-water energy
/// flux scaling `H_s^2 T_e` relative to the design point, capped at rated,
/// zero beyond the cut-out fence.
pub fn paraboloid_production(
    significant_wave_height_m: f64,
    energy_period_s: f64,
    design_height_m: f64,
    design_period_s: f64,
) -> f64 {
    if significant_wave_height_m > PARABOLOID_CUT_OUT * design_height_m
        || energy_period_s > PARABOLOID_CUT_OUT * design_period_s
    {
        return 0.0;
    }
    let flux_ratio = (significant_wave_height_m.powi(2) * energy_period_s)
        / (design_height_m.powi(2) * design_period_s);
    flux_ratio.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_rated_at_design_point() {
        assert!((gaussian_production(3.0, 10.0, 3.0, 10.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_gaussian_decays_off_design() {
        let off_height = gaussian_production(4.0, 10.0, 3.0, 10.0);
        let off_period = gaussian_production(3.0, 14.0, 3.0, 10.0);
        assert!(off_height < 0.2);
        assert!(off_period < 1.0);
        assert!(off_height > 0.0 && off_period > 0.0);
    }

    #[test]
    fn test_paraboloid_design_point_and_cap() {
        assert!((paraboloid_production(3.0, 10.0, 3.0, 10.0) - 1.0).abs() < 1e-12);
        // beyond design but inside the fence still caps at rated
        assert_eq!(paraboloid_production(4.0, 12.0, 3.0, 10.0), 1.0);
    }

    #[test]
    fn test_paraboloid_flux_scaling_below_design() {
        let value = paraboloid_production(1.5, 10.0, 3.0, 10.0);
        assert!((value - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_paraboloid_cut_out_fence() {
        assert_eq!(paraboloid_production(6.5, 10.0, 3.0, 10.0), 0.0);
        assert_eq!(paraboloid_production(3.0, 21.0, 3.0, 10.0), 0.0);
    }
}
