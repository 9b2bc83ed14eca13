//! Compile-time unit safety for the quantities the dispatch core trades in.
//!
//! Prevents mixing incompatible units like kW and kWh, or power and time.
//!
//! All types use `#[repr(transparent)]` newtype wrappers around `f64`, so the
//! compiler optimizes away all wrapper overhead. Power multiplied by time
//! yields energy, and energy divided by time yields power, so step-level
//! energy accounting stays dimensionally honest:
//!
//! ```
//! use mgrid_core::units::{Hours, Kilowatts, KilowattHours};
//!
//! let p = Kilowatts(250.0);
//! let dt = Hours(0.5);
//! let e: KilowattHours = p * dt;
//! assert_eq!(e.value(), 125.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Macro to implement common arithmetic operations for unit types
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Mul<$type> for f64 {
            type Output = $type;
            fn mul(self, rhs: $type) -> Self::Output {
                <$type>::new(self * rhs.0)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Absolute value
            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            /// Check if value is finite
            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// Minimum of two values
            #[inline]
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }

            /// Maximum of two values
            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }

            /// Clamp value to range
            #[inline]
            pub fn clamp(self, min: Self, max: Self) -> Self {
                Self(self.0.clamp(min.0, max.0))
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl<'a> std::iter::Sum<&'a $type> for $type {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

/// Active power in kilowatts
#[derive(
    Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Kilowatts(pub f64);

/// Energy in kilowatt-hours
#[derive(
    Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct KilowattHours(pub f64);

/// Elapsed time in hours
#[derive(
    Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Hours(pub f64);

impl_unit_ops!(Kilowatts, "kW");
impl_unit_ops!(KilowattHours, "kWh");
impl_unit_ops!(Hours, "h");

impl Mul<Hours> for Kilowatts {
    type Output = KilowattHours;
    fn mul(self, rhs: Hours) -> Self::Output {
        KilowattHours(self.0 * rhs.0)
    }
}

impl Mul<Kilowatts> for Hours {
    type Output = KilowattHours;
    fn mul(self, rhs: Kilowatts) -> Self::Output {
        KilowattHours(self.0 * rhs.0)
    }
}

impl Div<Hours> for KilowattHours {
    type Output = Kilowatts;
    fn div(self, rhs: Hours) -> Self::Output {
        Kilowatts(self.0 / rhs.0)
    }
}

impl Div<Kilowatts> for KilowattHours {
    type Output = Hours;
    fn div(self, rhs: Kilowatts) -> Self::Output {
        Hours(self.0 / rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_unit_arithmetic() {
        let a = Kilowatts(100.0);
        let b = Kilowatts(50.0);
        assert_eq!((a + b).value(), 150.0);
        assert_eq!((a - b).value(), 50.0);
        assert_eq!((a * 2.0).value(), 200.0);
        assert_eq!(a / b, 2.0);
    }

    #[test]
    fn test_power_time_energy() {
        let e = Kilowatts(120.0) * Hours(0.25);
        assert_eq!(e.value(), 30.0);
        let p = e / Hours(0.25);
        assert_eq!(p.value(), 120.0);
        let t = e / Kilowatts(120.0);
        assert!((t.value() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_and_ordering() {
        let p = Kilowatts(300.0);
        assert_eq!(p.clamp(Kilowatts(0.0), Kilowatts(250.0)).value(), 250.0);
        assert_eq!(p.min(Kilowatts(100.0)).value(), 100.0);
        assert_eq!(p.max(Kilowatts(400.0)).value(), 400.0);
    }

    #[test]
    fn test_sum() {
        let total: Kilowatts = [Kilowatts(1.0), Kilowatts(2.0), Kilowatts(3.0)]
            .iter()
            .sum();
        assert_eq!(total.value(), 6.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Kilowatts(1.5)), "1.5000 kW");
        assert_eq!(format!("{}", Hours(2.0)), "2.0000 h");
    }

    #[test]
    fn test_transparent_serde() {
        let power: Kilowatts = serde_json::from_str("42.5").unwrap();
        assert_eq!(power.value(), 42.5);
        assert_eq!(serde_json::to_string(&Hours(2.0)).unwrap(), "2.0");
    }
}
