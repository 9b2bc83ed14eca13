//! Plane-of-array irradiance from global horizontal irradiance.
//!
//! The detailed solar model chains ecliptic astronomy (mean longitude and
//! anomaly, ecliptic longitude, obliquity, sidereal time, right ascension,
//! declination, hour angle) into solar altitude/azimuth/zenith, then
//! composes beam, isotropic diffuse, and ground-reflected components on the
//! panel plane. Angles are wrapped into their canonical ranges at each
//! stage; the refraction correction applies above -0.56 deg altitude.

use std::f64::consts::{FRAC_PI_2, PI};

/// Empirical split of global horizontal into diffuse horizontal irradiance.
const GHI_TO_DHI: f64 = 0.32;

/// Panel geometry and site parameters for the detailed solar model.
#[derive(Debug, Clone)]
pub struct SolarGeometry {
    pub derating: f64,
    /// Days (including partial days) since 12:00 on 1 Jan 2000, at step 0
    pub julian_day_start: f64,
    pub latitude_rad: f64,
    pub longitude_deg: f64,
    /// Azimuth angle of the panels relative to north [rad]
    pub panel_azimuth_rad: f64,
    /// Tilt angle of the panels relative to ground [rad]
    pub panel_tilt_rad: f64,
    pub albedo_ground_reflectance: f64,
}

/// Wrap a value into the half-open interval [0, range).
fn wrap(value: f64, range: f64) -> f64 {
    let whole = value.trunc();
    let frac = value - whole;
    let wrapped = (whole as i64).rem_euclid(range as i64) as f64;
    let result = wrapped + frac;
    if result >= range {
        result - range
    } else if result < 0.0 {
        result + range
    } else {
        result
    }
}

/// Mean longitude of the sun [deg], bound to [0, 360).
fn mean_longitude_deg(julian_day: f64) -> f64 {
    wrap(280.46 + 0.9856474 * julian_day, 360.0)
}

/// Mean anomaly of the sun [rad], bound to [0, 2 pi).
fn mean_anomaly_rad(julian_day: f64) -> f64 {
    wrap(357.528 + 0.9856003 * julian_day, 360.0).to_radians()
}

/// Ecliptic longitude [rad], bound to [0, 2 pi).
fn ecliptic_longitude_rad(mean_longitude_deg: f64, mean_anomaly_rad: f64) -> f64 {
    let eclong_deg = mean_longitude_deg
        + 1.915 * mean_anomaly_rad.sin()
        + 0.02 * (2.0 * mean_anomaly_rad).sin();
    wrap(eclong_deg, 360.0).to_radians()
}

/// Obliquity of the ecliptic [rad].
fn obliquity_rad(julian_day: f64) -> f64 {
    wrap(23.439 - 0.0000004 * julian_day, 360.0).to_radians()
}

/// Local mean sidereal time [hrs], bound to [0, 24).
fn local_mean_sidereal_time_hrs(julian_day: f64, longitude_deg: f64) -> f64 {
    let greenwich = wrap(
        6.697375 + 0.0657098242 * julian_day - longitude_deg / 15.0,
        24.0,
    );
    wrap(greenwich + longitude_deg / 15.0, 24.0)
}

/// Right ascension of the sun [rad], bound to [0, 2 pi).
fn right_ascension_rad(eclong_rad: f64, obliquity_rad: f64) -> f64 {
    let numerator = obliquity_rad.cos() * eclong_rad.sin();
    let mut right_ascension = (numerator / eclong_rad.cos()).atan();
    if eclong_rad.cos() < 0.0 {
        right_ascension += PI;
    } else if numerator < 0.0 {
        right_ascension += 2.0 * PI;
    }
    right_ascension
}

/// Declination of the sun [rad], bound to [-pi/2, pi/2].
fn declination_rad(eclong_rad: f64, obliquity_rad: f64) -> f64 {
    (obliquity_rad.sin() * eclong_rad.sin()).asin()
}

/// Hour angle of the sun [rad], bound to (-pi, pi).
fn hour_angle_rad(local_mean_sidereal_time_hrs: f64, right_ascension_rad: f64) -> f64 {
    let b = 15.0_f64.to_radians() * local_mean_sidereal_time_hrs - right_ascension_rad;
    if b < -PI {
        b + 2.0 * PI
    } else if b > PI {
        b - 2.0 * PI
    } else {
        b
    }
}

fn uncorrected_altitude_rad(latitude_rad: f64, declination_rad: f64, hour_angle_rad: f64) -> f64 {
    let a = declination_rad.sin() * latitude_rad.sin()
        + declination_rad.cos() * latitude_rad.cos() * hour_angle_rad.cos();
    if a < -1.0 {
        -FRAC_PI_2
    } else if a > 1.0 {
        FRAC_PI_2
    } else {
        a.asin()
    }
}

/// Solar altitude [rad], refraction-corrected and bound to [0, pi/2].
fn solar_altitude_rad(latitude_rad: f64, declination_rad: f64, hour_angle_rad: f64) -> f64 {
    let altitude_deg =
        uncorrected_altitude_rad(latitude_rad, declination_rad, hour_angle_rad).to_degrees();

    let refraction_deg = if altitude_deg > -0.56 {
        3.51567 * (0.1594 + 0.0196 * altitude_deg + 0.00002 * altitude_deg.powi(2))
            / (1.0 + 0.505 * altitude_deg + 0.0845 * altitude_deg.powi(2))
    } else {
        0.56
    };

    if altitude_deg + refraction_deg > 90.0 {
        FRAC_PI_2
    } else {
        (altitude_deg + refraction_deg).to_radians()
    }
}

/// Solar azimuth [rad], bound to [-pi, pi].
fn solar_azimuth_rad(latitude_rad: f64, declination_rad: f64, hour_angle_rad: f64) -> f64 {
    let altitude_rad = uncorrected_altitude_rad(latitude_rad, declination_rad, hour_angle_rad);

    let a = (altitude_rad.sin() * latitude_rad.sin() - declination_rad.sin())
        / (altitude_rad.cos() * latitude_rad.cos());

    let b = if altitude_rad.cos() == 0.0 || a < -1.0 {
        PI
    } else if a > 1.0 {
        0.0
    } else {
        a.acos()
    };

    if hour_angle_rad < -PI {
        b
    } else if (-PI..=0.0).contains(&hour_angle_rad) || hour_angle_rad > PI {
        PI - b
    } else {
        PI + b
    }
}

impl SolarGeometry {
    /// Nominal plane-of-array irradiance [kW/m2] as the superposition of
    /// beam, isotropic diffuse, and ground-reflected components.
    pub fn plane_of_array_irradiance(&self, julian_day: f64, ghi_kwm2: f64) -> f64 {
        let mean_longitude = mean_longitude_deg(julian_day);
        let mean_anomaly = mean_anomaly_rad(julian_day);
        let eclong = ecliptic_longitude_rad(mean_longitude, mean_anomaly);
        let obliquity = obliquity_rad(julian_day);

        let sidereal = local_mean_sidereal_time_hrs(julian_day, self.longitude_deg);
        let right_ascension = right_ascension_rad(eclong, obliquity);
        let declination = declination_rad(eclong, obliquity);
        let hour_angle = hour_angle_rad(sidereal, right_ascension);

        let azimuth = solar_azimuth_rad(self.latitude_rad, declination, hour_angle);
        let zenith = FRAC_PI_2 - solar_altitude_rad(self.latitude_rad, declination, hour_angle);

        let dhi = GHI_TO_DHI * ghi_kwm2;
        let dni = (ghi_kwm2 - dhi) / zenith.cos();

        let incidence_cos = zenith.sin()
            * (azimuth - self.panel_azimuth_rad).cos()
            * self.panel_tilt_rad.sin()
            + zenith.cos() * self.panel_tilt_rad.cos();
        let incidence = incidence_cos.clamp(-1.0, 1.0).acos();

        let beam = dni * incidence.cos();
        let diffuse = dhi * self.panel_tilt_rad.cos();
        let ground_reflected =
            self.albedo_ground_reflectance * ghi_kwm2 * (1.0 - self.panel_tilt_rad.cos()) / 2.0;

        beam + diffuse + ground_reflected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_canonical_ranges() {
        assert!((wrap(365.25, 360.0) - 5.25).abs() < 1e-12);
        assert!((wrap(-10.5, 360.0) - 349.5).abs() < 1e-12);
        assert!((wrap(25.75, 24.0) - 1.75).abs() < 1e-12);
        assert!(wrap(0.0, 360.0).abs() < 1e-12);
    }

    #[test]
    fn test_mean_longitude_in_range() {
        for day in 0..3650 {
            let value = mean_longitude_deg(f64::from(day) + 0.37);
            assert!((0.0..360.0).contains(&value));
        }
    }

    #[test]
    fn test_declination_bounded_by_obliquity() {
        // declination stays within +/- obliquity (~23.44 deg) over a year
        for day in 0..365 {
            let jd = f64::from(day);
            let eclong = ecliptic_longitude_rad(mean_longitude_deg(jd), mean_anomaly_rad(jd));
            let decl = declination_rad(eclong, obliquity_rad(jd));
            assert!(decl.abs() <= 23.5_f64.to_radians());
        }
    }

    #[test]
    fn test_hour_angle_wrapped() {
        for hrs in 0..24 {
            let angle = hour_angle_rad(f64::from(hrs), 1.0);
            assert!(angle > -PI - 1e-12 && angle < PI + 1e-12);
        }
    }

    #[test]
    fn test_altitude_non_negative_after_correction() {
        // correction clamps to [0, pi/2] for any daytime geometry
        let altitude = solar_altitude_rad(0.8, 0.2, 0.1);
        assert!((0.0..=FRAC_PI_2 + 1e-12).contains(&altitude));
    }

    #[test]
    fn test_poa_positive_at_noonlike_geometry() {
        let geometry = SolarGeometry {
            derating: 0.8,
            julian_day_start: 172.0,
            latitude_rad: 48.0_f64.to_radians(),
            longitude_deg: -123.0,
            panel_azimuth_rad: PI,
            panel_tilt_rad: 30.0_f64.to_radians(),
            albedo_ground_reflectance: 0.2,
        };
        // scan a day for at least one strongly positive plane-of-array value
        let mut max_poa = f64::NEG_INFINITY;
        for hour in 0..24 {
            let poa = geometry.plane_of_array_irradiance(172.0 + f64::from(hour) / 24.0, 0.8);
            if poa.is_finite() {
                max_poa = max_poa.max(poa);
            }
        }
        assert!(max_poa > 0.1);
    }
}
