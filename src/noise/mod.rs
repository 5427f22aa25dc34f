//! Display helpers for the noise levels attached to a cell: the dB(A) color
//! ramp and the hourly profile returned by the area aggregation service.

mod profile;
mod ramp;

pub use profile::{AreaInfo, HourLevel, MeasureTime, WeeklyProfile};
pub use ramp::{ColorStop, MISSING_HOUR_COLOR, NoiseRamp};

/// Hours in one profile day and slices in one dial.
pub const HOURS_PER_DAY: usize = 24;
