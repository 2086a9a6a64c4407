use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// A tolerance window around a target value, the inclusive maximal deviation for a
/// candidate to count as a match.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, PartialOrd, Serialize)]
pub enum Tolerance {
    /// An absolute window: `target ± value`.
    Absolute(f64),
    /// A relative window in parts per million of the target.
    Ppm(f64),
}

impl Tolerance {
    /// Create a new absolute tolerance, the absolute value of the given number is used.
    pub fn new_absolute(value: f64) -> Self {
        Self::Absolute(value.abs())
    }

    /// Create a new ppm tolerance, the absolute value of the given number is used.
    pub fn new_ppm(value: f64) -> Self {
        Self::Ppm(value.abs())
    }

    /// The absolute half width of the window around the given target.
    fn half_width(self, target: f64) -> f64 {
        match self {
            Self::Absolute(value) => value,
            Self::Ppm(ppm) => target.abs() * ppm / 1e6,
        }
    }

    /// The inclusive bounds of the window around the given target.
    pub fn bounds(self, target: f64) -> (f64, f64) {
        let half = self.half_width(target);
        (target - half, target + half)
    }

    /// Check whether the value falls within the window around the target. A NaN on either
    /// side never matches.
    pub fn within(self, target: f64, value: f64) -> bool {
        (value - target).abs() <= self.half_width(target)
    }
}

impl Display for Tolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absolute(value) => write!(f, "{value}"),
            Self::Ppm(value) => write!(f, "{value} ppm"),
        }
    }
}

impl FromStr for Tolerance {
    type Err = std::num::ParseFloatError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        s.strip_suffix("ppm")
            .map_or_else(
                || s.parse::<f64>().map(Self::new_absolute),
                |rest| rest.trim().parse::<f64>().map(Self::new_ppm),
            )
    }
}
