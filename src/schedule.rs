use std::fmt::Display;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::evaluator::{Evaluator, GeoContext, OhEvaluator, OpenInterval};
use crate::span::{self, TimeSpan};
use crate::time::TimeOfDay;
use crate::weekday::{collapse_days, expand_days, Weekday, MONDAY_FIRST};

/// Anchor of the reference week used by the interval fallback: a known
/// Monday, extended by one day to capture overnight spillover into the next
/// Monday.
const REFERENCE_WEEK_START: NaiveDateTime = {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let time = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
    NaiveDateTime::new(date, time)
};

const REFERENCE_WEEK_DAYS: i64 = 8;

/// Behavior knobs for [`WeekSchedule::parse_with`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParseOptions {
    /// Whether a weekday explicitly marked `off` in the source is retained
    /// as a present-but-empty day, distinct from a day the source never
    /// mentions. Retaining it makes an explicit `"Tu off"` clause round-trip
    /// distinctly from an implicit closed Tuesday.
    pub keep_explicit_off: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { keep_explicit_off: true }
    }
}

/// The canonical in-memory model of a weekly schedule.
///
/// Seven Monday-first day slots, each either absent (the source never
/// mentioned the day) or present with a sanitized list of spans (empty =
/// explicitly off), plus free-text modifier clauses such as `"PH off"` that
/// are preserved verbatim and in order through round-trips.
///
/// Overnight ranges are split at midnight into two same-day spans; the
/// continuation is recorded once at the schedule level and can be queried
/// with [`WeekSchedule::spans_midnight`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WeekSchedule {
    days: [Option<Vec<TimeSpan>>; 7],
    modifiers: Vec<String>,
    overnight: [bool; 7],
}

impl WeekSchedule {
    /// Create an empty schedule: no day slots, no modifiers. It serializes
    /// to `"Mo-Su off"`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an expression with the default evaluator and options.
    ///
    /// ```
    /// use chrono::Weekday;
    /// use opening_hours_editor::{TimeSpan, WeekSchedule};
    ///
    /// let schedule = WeekSchedule::parse("Mo-Fr 09:00-17:00");
    /// assert_eq!(
    ///     schedule.day(Weekday::Mon),
    ///     Some(&[TimeSpan::parse("09:00-17:00").unwrap()][..]),
    /// );
    /// assert_eq!(schedule.day(Weekday::Sat), None);
    /// ```
    pub fn parse(source: &str) -> Self {
        Self::parse_with(
            source,
            &OhEvaluator,
            &GeoContext::default(),
            &ParseOptions::default(),
        )
    }

    /// Parse an expression into a schedule. This never fails: an empty or
    /// ungrammatical source degrades to the empty schedule, and individual
    /// unreadable pieces are either preserved as modifiers or dropped.
    pub fn parse_with(
        source: &str,
        evaluator: &impl Evaluator,
        ctx: &GeoContext,
        options: &ParseOptions,
    ) -> Self {
        let source = source.trim();

        if source.is_empty() {
            return Self::new();
        }

        let canonical = match evaluator.canonicalize(source, ctx) {
            Ok(canonical) => canonical,
            Err(err) => {
                log::debug!("discarding unreadable opening hours {source:?}: {err}");
                return Self::new();
            }
        };

        if canonical.trim() == "24/7" {
            return Self::around_the_clock();
        }

        let mut schedule = Self::from_canonical(&canonical, options);

        if schedule.is_empty() && schedule.modifiers.is_empty() {
            // The evaluator accepted the string but no clause carried a
            // weekday (date-range or week-number rules). Derive the week
            // from enumerated open intervals instead.
            schedule = Self::from_intervals(evaluator.open_intervals(
                &canonical,
                ctx,
                REFERENCE_WEEK_START..REFERENCE_WEEK_START + TimeDelta::days(REFERENCE_WEEK_DAYS),
            ));
        }

        schedule
    }

    /// The schedule `"24/7"` expands to: every day open `00:00-23:59`.
    pub fn around_the_clock() -> Self {
        Self {
            days: std::array::from_fn(|_| Some(vec![TimeSpan::ALL_DAY])),
            modifiers: Vec::new(),
            overnight: [false; 7],
        }
    }

    /// Manual clause-by-clause parse of a canonicalized expression.
    fn from_canonical(canonical: &str, options: &ParseOptions) -> Self {
        let mut build: [DayBuild; 7] = std::array::from_fn(|_| DayBuild::Absent);
        let mut overnight = [false; 7];
        let mut modifiers = Vec::new();

        let clauses = canonical.split(';').map(str::trim).filter(|c| !c.is_empty());

        for clause in clauses {
            let (day_expr, times_expr) = match clause.split_once(char::is_whitespace) {
                Some((head, tail)) => (head, tail.trim()),
                None => (clause, ""),
            };

            let days = expand_days(day_expr);

            // Clauses without a recognized weekday+times pair are kept
            // verbatim so holiday rules and unreadable fragments survive a
            // round-trip untouched.
            if days.is_empty() || times_expr.is_empty() {
                modifiers.push(clause.to_string());
                continue;
            }

            if times_expr.eq_ignore_ascii_case("off") || times_expr.eq_ignore_ascii_case("closed") {
                for day in days.iter() {
                    build[slot(day)].mark_off();
                }

                continue;
            }

            for token in times_expr.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                let Some(span) = TimeSpan::parse(token) else {
                    continue;
                };

                for day in days.iter() {
                    append_span(&mut build, &mut overnight, day, span);
                }
            }
        }

        let mut days: [Option<Vec<TimeSpan>>; 7] = std::array::from_fn(|_| None);

        for (idx, state) in build.into_iter().enumerate() {
            days[idx] = match state {
                DayBuild::Absent => None,
                DayBuild::Off => options.keep_explicit_off.then(Vec::new),
                DayBuild::Spans(spans) => {
                    let sanitized = span::sanitize(spans);

                    // A day emptied by sanitization was never explicitly
                    // off, so it goes back to being absent.
                    if sanitized.is_empty() {
                        overnight[idx] = false;
                        None
                    } else {
                        Some(sanitized)
                    }
                }
            };
        }

        Self { days, modifiers, overnight }
    }

    /// Build the week from evaluator-enumerated open intervals, bucketing
    /// each interval on the weekday of its start instant. An interval
    /// crossing midnight is split the same way an overnight clause is.
    /// Modifiers cannot be recovered on this path.
    fn from_intervals(intervals: Vec<OpenInterval>) -> Self {
        let mut days: [Option<Vec<TimeSpan>>; 7] = std::array::from_fn(|_| None);
        let mut overnight = [false; 7];

        for interval in intervals {
            let start = interval.range.start;
            let end = interval.range.end;
            let day = start.weekday();
            let day_span = (end.date() - start.date()).num_days();

            if day_span == 0 {
                let span = TimeSpan::new(start.time().into(), end.time().into());
                days[slot(day)].get_or_insert_with(Vec::new).push(span);
            } else if day_span == 1 && end.time() == NaiveTime::MIN {
                // Ends exactly at next-day midnight: nothing spills over.
                let span = TimeSpan::new(start.time().into(), TimeOfDay::END_OF_DAY);
                days[slot(day)].get_or_insert_with(Vec::new).push(span);
            } else {
                let next = day.succ();
                days[slot(day)]
                    .get_or_insert_with(Vec::new)
                    .push(TimeSpan::new(start.time().into(), TimeOfDay::END_OF_DAY));
                days[slot(next)]
                    .get_or_insert_with(Vec::new)
                    .push(TimeSpan::new(TimeOfDay::START_OF_DAY, end.time().into()));
                overnight[slot(day)] = true;
            }
        }

        for (idx, day) in days.iter_mut().enumerate() {
            if let Some(spans) = day.take() {
                let sanitized = span::sanitize(spans);

                if sanitized.is_empty() {
                    overnight[idx] = false;
                } else {
                    *day = Some(sanitized);
                }
            }
        }

        Self { days, modifiers: Vec::new(), overnight }
    }

    /// Serialize the model back into an OSM expression.
    ///
    /// The model is sanitized defensively first, so this is total over any
    /// in-memory schedule. Absent days render as `off`; an entirely empty
    /// model renders as `"Mo-Su off"`.
    ///
    /// ```
    /// use opening_hours_editor::WeekSchedule;
    ///
    /// assert_eq!(WeekSchedule::new().to_expression(), "Mo-Su off");
    /// assert_eq!(WeekSchedule::around_the_clock().to_expression(), "24/7");
    /// ```
    pub fn to_expression(&self) -> String {
        let per_day: [Vec<TimeSpan>; 7] = std::array::from_fn(|idx| {
            self.days[idx]
                .as_ref()
                .map(|spans| span::sanitize(spans.iter().copied()))
                .unwrap_or_default()
        });

        let around_the_clock = per_day
            .iter()
            .all(|spans| spans.as_slice() == [TimeSpan::ALL_DAY]);

        if around_the_clock && self.modifiers.is_empty() {
            return "24/7".to_string();
        }

        let day_clauses: Vec<_> = collapse_days(&per_day)
            .into_iter()
            .map(|(label, hours)| format!("{label} {hours}"))
            .collect();

        let mut blocks = vec![day_clauses.join("; ")];
        blocks.extend(self.modifiers.iter().cloned());

        blocks
            .into_iter()
            .filter(|block| !block.is_empty())
            .collect::<Vec<_>>()
            .join("; ")
    }

    // --
    // -- Accessors
    // --

    /// Spans recorded for a weekday. `None` means the day is absent from
    /// the model; an empty slice means it is explicitly off.
    pub fn day(&self, wday: Weekday) -> Option<&[TimeSpan]> {
        self.days[slot(wday)].as_deref()
    }

    /// Check if a weekday is explicitly marked off.
    pub fn is_off(&self, wday: Weekday) -> bool {
        self.day(wday).is_some_and(|spans| spans.is_empty())
    }

    /// Whether this weekday's trailing end-of-day span continues past
    /// midnight into the next day.
    pub fn spans_midnight(&self, wday: Weekday) -> bool {
        self.overnight[slot(wday)]
    }

    /// Free-text modifier clauses, in source order.
    pub fn modifiers(&self) -> &[String] {
        &self.modifiers
    }

    /// Iterate over present days in Monday-first order.
    pub fn days(&self) -> impl Iterator<Item = (Weekday, &[TimeSpan])> + '_ {
        MONDAY_FIRST
            .into_iter()
            .filter_map(|wday| Some((wday, self.day(wday)?)))
    }

    /// Check that no day slot is present at all.
    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Option::is_none)
    }

    // --
    // -- Mutations, driven by the editing UI
    // --

    /// Append a span to a weekday, creating the slot when absent.
    pub fn add_span(&mut self, wday: Weekday, span: TimeSpan) {
        self.days[slot(wday)].get_or_insert_with(Vec::new).push(span);
    }

    /// Mark a weekday as explicitly off, discarding its spans.
    pub fn set_off(&mut self, wday: Weekday) {
        self.days[slot(wday)] = Some(Vec::new());
        self.overnight[slot(wday)] = false;
    }

    /// Remove a weekday from the model entirely.
    pub fn clear_day(&mut self, wday: Weekday) {
        self.days[slot(wday)] = None;
        self.overnight[slot(wday)] = false;
    }

    /// Replace a weekday's spans. Any recorded midnight continuation for
    /// the day is dropped.
    pub fn set_day(&mut self, wday: Weekday, spans: Vec<TimeSpan>) {
        self.days[slot(wday)] = Some(spans);
        self.overnight[slot(wday)] = false;
    }

    /// Append a modifier clause.
    pub fn push_modifier(&mut self, clause: impl Into<String>) {
        self.modifiers.push(clause.into());
    }

    /// Replace the modifier list.
    pub fn set_modifiers(&mut self, modifiers: Vec<String>) {
        self.modifiers = modifiers;
    }
}

impl Display for WeekSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_expression())
    }
}

/// Monday-first slot index of a weekday.
fn slot(wday: Weekday) -> usize {
    wday.num_days_from_monday() as usize
}

enum DayBuild {
    Absent,
    Off,
    Spans(Vec<TimeSpan>),
}

impl DayBuild {
    fn mark_off(&mut self) {
        if matches!(self, DayBuild::Absent) {
            *self = DayBuild::Off;
        }
    }

    fn push(&mut self, span: TimeSpan) {
        match self {
            DayBuild::Spans(spans) => spans.push(span),
            _ => *self = DayBuild::Spans(vec![span]),
        }
    }
}

/// Record a parsed time token on a weekday. A backward token is an
/// overnight range: it is split at midnight, the remainder lands on the
/// next day and the continuation is flagged on the starting day.
fn append_span(
    build: &mut [DayBuild; 7],
    overnight: &mut [bool; 7],
    day: Weekday,
    span: TimeSpan,
) {
    let start_mins = span.start.mins_from_midnight();
    let end_mins = span.end.mins_from_midnight();

    if end_mins == 0 && start_mins > 0 {
        // "18:00-00:00" ends exactly at midnight, with nothing spilling
        // over.
        build[slot(day)].push(TimeSpan::new(span.start, TimeOfDay::END_OF_DAY));
    } else if end_mins < start_mins {
        let next = day.succ();
        build[slot(day)].push(TimeSpan::new(span.start, TimeOfDay::END_OF_DAY));
        build[slot(next)].push(TimeSpan::new(TimeOfDay::START_OF_DAY, span.end));
        overnight[slot(day)] = true;
    } else {
        build[slot(day)].push(span);
    }
}
