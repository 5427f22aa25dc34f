use super::HOURS_PER_DAY;
use crate::error::OnoMapError;
use serde::{Deserialize, Serialize};

const SATURDAY_OFFSET: usize = HOURS_PER_DAY;
const SUNDAY_OFFSET: usize = 2 * HOURS_PER_DAY;

/// Median level (LA50, dB(A)) measured during one hour slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourLevel {
    pub la50: f64,
}

/// Timestamp of a measurement as sent by the service: epoch milliseconds
/// or a date string, kept as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasureTime {
    Epoch(i64),
    Text(String),
}

/// Aggregated measurements for one cell.
///
/// The profile holds 72 hourly slots: hours 0-23 of a working day, then
/// Saturday, then Sunday. The service sends it either as a list or as an
/// object keyed by slot index; both decode to the same list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaInfo {
    pub leq: Option<f64>,
    pub first_measure: Option<MeasureTime>,
    pub last_measure: Option<MeasureTime>,
    pub mean_pleasantness: Option<f64>,
    pub measure_count: Option<f64>,
    #[serde(deserialize_with = "serde_profile::deserialize")]
    pub profile: Vec<Option<HourLevel>>,
}

/// The profile split into the three 24-hour dials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyProfile {
    pub week: [Option<HourLevel>; HOURS_PER_DAY],
    pub saturday: [Option<HourLevel>; HOURS_PER_DAY],
    pub sunday: [Option<HourLevel>; HOURS_PER_DAY],
}

impl AreaInfo {
    /// Decodes a service response.
    pub fn from_json_str(json: &str) -> Result<Self, OnoMapError> {
        serde_json::from_str(json).map_err(|e| OnoMapError::ResponseParseError(e.to_string()))
    }

    /// True for the service's "no data" answer, which carries no `leq`.
    pub fn is_empty(&self) -> bool {
        self.leq.is_none()
    }

    /// `leq` rounded to the nearest whole dB(A).
    pub fn rounded_leq(&self) -> Option<i64> {
        self.leq.filter(|v| v.is_finite()).map(|v| v.round() as i64)
    }

    /// Level of one profile slot, `None` when missing or out of range.
    pub fn hour_level(&self, slot: usize) -> Option<HourLevel> {
        self.profile.get(slot).copied().flatten()
    }

    pub fn weekly_profile(&self) -> WeeklyProfile {
        let day = |offset: usize| -> [Option<HourLevel>; HOURS_PER_DAY] {
            std::array::from_fn(|hour| self.hour_level(offset + hour))
        };
        WeeklyProfile {
            week: day(0),
            saturday: day(SATURDAY_OFFSET),
            sunday: day(SUNDAY_OFFSET),
        }
    }
}

mod serde_profile {
    use super::HourLevel;
    use serde::Deserializer;
    use serde::de::{MapAccess, SeqAccess, Visitor};
    use std::fmt;

    struct ProfileVisitor;

    impl<'de> Visitor<'de> for ProfileVisitor {
        type Value = Vec<Option<HourLevel>>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a list of hour levels or an object keyed by slot index")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut profile = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(level) = seq.next_element::<Option<HourLevel>>()? {
                profile.push(level);
            }
            Ok(profile)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut profile = Vec::new();
            while let Some((key, level)) = map.next_entry::<String, Option<HourLevel>>()? {
                let slot: usize = key.parse().map_err(|_| {
                    serde::de::Error::custom(format!("invalid profile slot: {}", key))
                })?;
                if slot >= profile.len() {
                    profile.resize(slot + 1, None);
                }
                profile[slot] = level;
            }
            Ok(profile)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Option<HourLevel>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ProfileVisitor)
    }
}
