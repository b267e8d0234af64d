#![doc = include_str!("../README.md")]

pub mod editor;
pub mod error;
pub mod evaluator;
pub mod localization;
pub mod schedule;
pub mod span;
pub mod status;
pub mod time;
pub mod weekday;

#[cfg(test)]
mod tests;

// Public re-exports
pub use crate::editor::{EditSession, RangeValidation};
pub use crate::error::{Error, Result};
pub use crate::evaluator::{Evaluator, GeoContext, OhEvaluator, OpenInterval, OpeningState};
pub use crate::schedule::{ParseOptions, WeekSchedule};
pub use crate::span::TimeSpan;
pub use crate::status::{StatusFormatter, StatusReport};
pub use crate::time::TimeOfDay;
pub use crate::weekday::Weekday;
