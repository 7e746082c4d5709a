//! Sampling temperature shared between the session and the slider control.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 1.0;
pub const TEMPERATURE_STEP: f32 = 0.01;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// A temperature in `[0, 1]`, stored in hundredths so it never drifts off the
/// 0.01 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Temperature(u8);

impl Temperature {
    /// Clamps to `[0, 1]` and rounds to the nearest hundredth. NaN maps to
    /// the default.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        let clamped = value.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        Self((clamped * 100.0).round() as u8)
    }

    pub fn value(self) -> f32 {
        f32::from(self.0) / 100.0
    }

    pub fn hundredths(self) -> u8 {
        self.0
    }

    /// Moves by `steps` hundredths, saturating at either end.
    pub fn step_by(self, steps: i16) -> Self {
        let next = (i16::from(self.0) + steps).clamp(0, 100);
        Self(next as u8)
    }

    pub fn min() -> Self {
        Self(0)
    }

    pub fn max() -> Self {
        Self(100)
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPERATURE)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl From<f32> for Temperature {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl Serialize for Temperature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(f64::from(self.0) / 100.0)
    }
}

impl<'de> Deserialize<'de> for Temperature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(|value| Temperature::new(value as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(Temperature::new(-3.0), Temperature::min());
        assert_eq!(Temperature::new(7.5), Temperature::max());
        assert_eq!(Temperature::new(f32::INFINITY), Temperature::max());
        assert_eq!(Temperature::new(f32::NEG_INFINITY), Temperature::min());
    }

    #[test]
    fn rounds_to_hundredths() {
        assert_eq!(Temperature::new(0.123).hundredths(), 12);
        assert_eq!(Temperature::new(0.125_1).hundredths(), 13);
        assert_eq!(Temperature::new(0.999).hundredths(), 100);
    }

    #[test]
    fn nan_falls_back_to_default() {
        assert_eq!(Temperature::new(f32::NAN), Temperature::default());
        assert_eq!(Temperature::default().to_string(), "0.70");
    }

    #[test]
    fn display_always_has_two_decimals() {
        for raw in [0.0_f32, 0.05, 0.1, 0.5, 0.99, 1.0, 0.333, -1.0, 2.0] {
            let text = Temperature::new(raw).to_string();
            let (_, decimals) = text.split_once('.').expect("decimal point");
            assert_eq!(decimals.len(), 2, "{raw} rendered as {text}");
        }
        assert_eq!(Temperature::max().to_string(), "1.00");
        assert_eq!(Temperature::new(0.05).to_string(), "0.05");
    }

    #[test]
    fn stepping_saturates() {
        assert_eq!(Temperature::max().step_by(10), Temperature::max());
        assert_eq!(Temperature::min().step_by(-1), Temperature::min());
        assert_eq!(Temperature::new(0.5).step_by(1).to_string(), "0.51");
    }

    #[test]
    fn serializes_as_float() {
        let json = serde_json::to_string(&Temperature::new(0.25)).unwrap();
        assert_eq!(json, "0.25");
        let parsed: Temperature = serde_json::from_str("1.7").unwrap();
        assert_eq!(parsed, Temperature::max());
    }
}
