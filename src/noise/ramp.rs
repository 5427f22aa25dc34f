use super::HOURS_PER_DAY;
use super::profile::HourLevel;
use crate::error::OnoMapError;
use serde::{Deserialize, Serialize};

/// Color painted on a dial slice whose hour has no measurement.
pub const MISSING_HOUR_COLOR: &str = "white";

/// One step of the ramp: levels from `threshold` dB(A) up take `color`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub threshold: f64,
    pub color: String,
}

impl ColorStop {
    pub fn new(threshold: f64, color: impl Into<String>) -> Self {
        Self {
            threshold,
            color: color.into(),
        }
    }
}

/// Stepped color ramp for noise levels, ordered by threshold.
///
/// Deserializes from a JSON list of stops and is validated the same way as
/// [`NoiseRamp::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ColorStop>", into = "Vec<ColorStop>")]
pub struct NoiseRamp {
    stops: Vec<ColorStop>,
}

impl NoiseRamp {
    /// Builds a ramp from unordered stops.
    ///
    /// Fails with [`OnoMapError::ConfigError`] when there are no stops or a
    /// threshold is not finite.
    pub fn new(mut stops: Vec<ColorStop>) -> Result<Self, OnoMapError> {
        if stops.is_empty() {
            return Err(OnoMapError::ConfigError(
                "Color ramp needs at least one stop".to_string(),
            ));
        }
        if let Some(bad) = stops.iter().find(|s| !s.threshold.is_finite()) {
            return Err(OnoMapError::ConfigError(format!(
                "Color ramp threshold must be finite, got {}",
                bad.threshold
            )));
        }
        stops.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));
        Ok(Self { stops })
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color of the highest threshold not above `level`.
    ///
    /// Levels under the first threshold take the first color. A NaN level
    /// compares below nothing and takes the last one.
    pub fn color_for(&self, level: f64) -> &str {
        let mut color = "";
        for (i, stop) in self.stops.iter().enumerate() {
            if i > 0 && level < stop.threshold {
                return color;
            }
            color = stop.color.as_str();
        }
        color
    }

    /// Colors of the 24 slices of an hourly dial.
    ///
    /// Hour `i` reads `levels[i]`; hours that are missing or absent from a
    /// short slice are painted [`MISSING_HOUR_COLOR`].
    pub fn slice_colors(&self, levels: &[Option<HourLevel>]) -> [&str; HOURS_PER_DAY] {
        std::array::from_fn(|hour| match levels.get(hour) {
            Some(Some(level)) => self.color_for(level.la50),
            _ => MISSING_HOUR_COLOR,
        })
    }
}

impl Default for NoiseRamp {
    fn default() -> Self {
        let stops = [
            (0.0, "#FFFFFF"),
            (30.0, "#82A6AD"),
            (35.0, "#A0BABF"),
            (40.0, "#B8D6D1"),
            (45.0, "#CEE4CC"),
            (50.0, "#E2F2BF"),
            (55.0, "#F3C683"),
            (60.0, "#E87E4D"),
            (65.0, "#CD463E"),
            (70.0, "#A11A4D"),
            (75.0, "#75085C"),
            (80.0, "#430A4A"),
        ];
        Self {
            stops: stops
                .into_iter()
                .map(|(threshold, color)| ColorStop::new(threshold, color))
                .collect(),
        }
    }
}

impl TryFrom<Vec<ColorStop>> for NoiseRamp {
    type Error = OnoMapError;

    fn try_from(stops: Vec<ColorStop>) -> Result<Self, Self::Error> {
        Self::new(stops)
    }
}

impl From<NoiseRamp> for Vec<ColorStop> {
    fn from(ramp: NoiseRamp) -> Self {
        ramp.stops
    }
}
