use std::fmt::{Debug, Display};

use crate::time::TimeOfDay;

/// A start/end pair of canonical times within a single day.
///
/// A sanitized span always has `start < end`, where the end may be the
/// *24:00* sentinel. Overnight continuation is never encoded at this level:
/// the weekly model splits such ranges at midnight instead.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct TimeSpan {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeSpan {
    /// Pair two times into a span. No validity check is performed here, the
    /// sanitizer is the layer that discards degenerate spans.
    #[inline]
    pub const fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// The full-day span an evaluator emits for `24/7` schedules.
    pub const ALL_DAY: Self = Self::new(
        TimeOfDay::new(0, 0).unwrap(),
        TimeOfDay::new(23, 59).unwrap(),
    );

    /// Parse a `start-end` token, normalizing both endpoints.
    ///
    /// ```
    /// use opening_hours_editor::{TimeOfDay, TimeSpan};
    ///
    /// assert_eq!(
    ///     TimeSpan::parse("9am-17:30"),
    ///     Some(TimeSpan::new(
    ///         TimeOfDay::new(9, 0).unwrap(),
    ///         TimeOfDay::new(17, 30).unwrap(),
    ///     )),
    /// );
    ///
    /// assert_eq!(TimeSpan::parse("9:00"), None);
    /// ```
    pub fn parse(token: &str) -> Option<Self> {
        let (start_raw, end_raw) = token.split_once('-')?;
        let start = TimeOfDay::parse(start_raw)?;
        let end = TimeOfDay::parse(end_raw)?;
        Some(Self { start, end })
    }

    /// Length of the span in minutes. Backward spans report zero.
    #[inline]
    pub fn duration_mins(self) -> u16 {
        (self.end.mins_from_midnight()).saturating_sub(self.start.mins_from_midnight())
    }
}

impl Display for TimeSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl Debug for TimeSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "{self}")
    }
}

/// Sanitize a single day's list of spans.
///
/// Spans that are zero-length or end before they start are discarded, the
/// rest is sorted by (start, end) minutes and exact adjacent duplicates are
/// removed. The *24:00* end orders after every same-day end. The result does
/// not depend on input order.
///
/// ```
/// use opening_hours_editor::span::sanitize;
/// use opening_hours_editor::TimeSpan;
///
/// let spans = [
///     TimeSpan::parse("14:00-18:00").unwrap(),
///     TimeSpan::parse("09:00-12:00").unwrap(),
///     TimeSpan::parse("09:00-12:00").unwrap(),
///     TimeSpan::parse("20:00-19:00").unwrap(), // backward: dropped
/// ];
///
/// assert_eq!(
///     sanitize(spans),
///     [
///         TimeSpan::parse("09:00-12:00").unwrap(),
///         TimeSpan::parse("14:00-18:00").unwrap(),
///     ],
/// );
/// ```
pub fn sanitize(spans: impl IntoIterator<Item = TimeSpan>) -> Vec<TimeSpan> {
    let mut result: Vec<_> = spans
        .into_iter()
        .filter(|span| span.start.mins_from_midnight() < span.end.mins_from_midnight())
        .collect();

    result.sort_unstable_by_key(|span| (span.start.mins_from_midnight(), span.end.mins_from_midnight()));
    result.dedup();
    result
}

/// Sanitize a day's list of raw `(start, end)` text pairs, as held by an
/// editing UI. Pairs with an unparseable endpoint are discarded before the
/// usual span sanitization.
pub fn sanitize_raw<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Vec<TimeSpan> {
    sanitize(pairs.into_iter().filter_map(|(start, end)| {
        Some(TimeSpan::new(TimeOfDay::parse(start)?, TimeOfDay::parse(end)?))
    }))
}
