use chrono::{Datelike, NaiveDateTime, TimeDelta, Timelike};

use crate::evaluator::{Evaluator, GeoContext, OhEvaluator, OpeningState};
use crate::localization::{default_day_label, messages, Translator};
use crate::weekday::Weekday;

/// Options controlling the status view.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusOptions {
    /// Render times as `9:30 pm` instead of `21:30`.
    pub twelve_hour_clock: bool,
    /// How far ahead the per-day overview looks.
    pub lookahead_days: i64,
    /// Cap on the number of open intervals folded into the overview.
    pub max_intervals: usize,
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self {
            twelve_hour_clock: false,
            lookahead_days: 7,
            max_intervals: 50,
        }
    }
}

/// One formatted open period in a day overview.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OverviewRange {
    pub start: String,
    pub end: String,
    pub comment: Option<String>,
}

/// The open periods of one upcoming day, under a caller-supplied label.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DayOverview {
    pub day: Weekday,
    pub label: String,
    pub ranges: Vec<OverviewRange>,
}

/// The computed "is it open now / when does it change" view of a schedule.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusReport {
    pub state: OpeningState,
    /// Localized human label, e.g. `"Open until 17:00"`.
    pub label: String,
    pub next_change: Option<NaiveDateTime>,
    /// Per-day overview over the lookahead window, Monday-first.
    pub days: Vec<DayOverview>,
}

/// Turns evaluator answers into locale-formatted labels.
///
/// Translations and day labels are injected; the formatter itself only
/// knows the message keys and the `{time}` placeholder.
pub struct StatusFormatter<E: Evaluator = OhEvaluator> {
    evaluator: E,
    translator: Translator,
    day_label: Box<dyn Fn(Weekday) -> String + Send + Sync>,
    options: StatusOptions,
}

impl Default for StatusFormatter<OhEvaluator> {
    fn default() -> Self {
        Self::new(OhEvaluator)
    }
}

impl<E: Evaluator> StatusFormatter<E> {
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            translator: Translator::default(),
            day_label: Box::new(default_day_label),
            options: StatusOptions::default(),
        }
    }

    /// Attach a translator for the status messages.
    pub fn with_translator(self, translator: Translator) -> Self {
        Self { translator, ..self }
    }

    /// Attach the hook mapping a weekday to its display label.
    pub fn with_day_label(self, day_label: impl Fn(Weekday) -> String + Send + Sync + 'static) -> Self {
        Self { day_label: Box::new(day_label), ..self }
    }

    pub fn with_options(self, options: StatusOptions) -> Self {
        Self { options, ..self }
    }

    /// Compute the status of an expression at some instant.
    ///
    /// A missing or unreadable expression degrades to an unknown state with
    /// the "hours unavailable" label; this never fails.
    pub fn format(&self, source: &str, ctx: &GeoContext, now: NaiveDateTime) -> StatusReport {
        let source = source.trim();

        if source.is_empty() || self.evaluator.canonicalize(source, ctx).is_err() {
            return StatusReport {
                state: OpeningState::Unknown,
                label: self.message(messages::UNKNOWN, None),
                next_change: None,
                days: Vec::new(),
            };
        }

        let state = self.evaluator.state_at(source, ctx, now);
        let next_change = self.evaluator.next_change(source, ctx, now);
        let next_time = next_change.map(|instant| self.clock_label(instant.time()));

        let label = match (state, next_time) {
            (OpeningState::Open, Some(time)) => self.message(messages::OPEN_UNTIL, Some(&time)),
            (OpeningState::Open, None) => self.message(messages::OPEN_NOW, None),
            (OpeningState::Closed, Some(time)) => self.message(messages::CLOSED_OPENS, Some(&time)),
            (OpeningState::Closed, None) => self.message(messages::CLOSED, None),
            (OpeningState::Unknown, _) => self.message(messages::UNKNOWN, None),
        };

        StatusReport {
            state,
            label,
            next_change,
            days: self.overview(source, ctx, now),
        }
    }

    /// Bucket the open intervals of the lookahead window by the weekday
    /// they start on.
    fn overview(&self, source: &str, ctx: &GeoContext, now: NaiveDateTime) -> Vec<DayOverview> {
        let window = now..now + TimeDelta::days(self.options.lookahead_days);
        let intervals = self.evaluator.open_intervals(source, ctx, window);

        let mut days: Vec<DayOverview> = Vec::new();

        for interval in intervals.into_iter().take(self.options.max_intervals) {
            let day = interval.range.start.weekday();

            let range = OverviewRange {
                start: self.clock_label(interval.range.start.time()),
                end: self.clock_label(interval.range.end.time()),
                comment: interval.comment,
            };

            match days.iter_mut().find(|overview| overview.day == day) {
                Some(overview) => overview.ranges.push(range),
                None => days.push(DayOverview {
                    day,
                    label: (self.day_label)(day),
                    ranges: vec![range],
                }),
            }
        }

        days.sort_by_key(|overview| overview.day.num_days_from_monday());
        days
    }

    fn message(&self, (key, fallback): (&str, &str), time: Option<&str>) -> String {
        let template = self.translator.get(key, fallback);

        match time {
            Some(time) => template.replace("{time}", time),
            None => template,
        }
    }

    fn clock_label(&self, time: chrono::NaiveTime) -> String {
        if self.options.twelve_hour_clock {
            let (hour, minute) = (time.hour(), time.minute());
            let meridiem = if hour < 12 { "am" } else { "pm" };
            let clock_hour = match hour % 12 {
                0 => 12,
                h => h,
            };

            format!("{clock_hour}:{minute:02} {meridiem}")
        } else {
            format!("{:02}:{:02}", time.hour(), time.minute())
        }
    }
}
