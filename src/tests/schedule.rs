use chrono::Weekday;

use crate::evaluator::OpenInterval;
use crate::schedule::{ParseOptions, WeekSchedule};
use crate::span;
use crate::tests::MockEvaluator;
use crate::{datetime, GeoContext};

fn parse_keep(source: &str) -> WeekSchedule {
    WeekSchedule::parse_with(
        source,
        &MockEvaluator::default(),
        &GeoContext::default(),
        &ParseOptions { keep_explicit_off: true },
    )
}

fn parse_drop(source: &str) -> WeekSchedule {
    WeekSchedule::parse_with(
        source,
        &MockEvaluator::default(),
        &GeoContext::default(),
        &ParseOptions { keep_explicit_off: false },
    )
}

#[test]
fn parse_empty_source() {
    assert_eq!(parse_keep(""), WeekSchedule::new());
    assert_eq!(parse_keep("   "), WeekSchedule::new());
}

#[test]
fn parse_rejected_source_degrades_to_empty() {
    let rejecting = MockEvaluator { rejects: true, ..Default::default() };

    let schedule = WeekSchedule::parse_with(
        "whatever",
        &rejecting,
        &GeoContext::default(),
        &ParseOptions::default(),
    );

    assert_eq!(schedule, WeekSchedule::new());
}

#[test]
fn parse_invalid_source_never_panics() {
    // Through the real evaluator this time: garbage is rejected there.
    assert_eq!(WeekSchedule::parse("not a valid schedule!!"), WeekSchedule::new());
}

#[test]
fn parse_around_the_clock() {
    let schedule = parse_keep("24/7");

    for wday in crate::weekday::MONDAY_FIRST {
        assert_eq!(schedule.day(wday), Some(&[span!("00:00-23:59")][..]));
    }

    assert!(schedule.modifiers().is_empty());
}

#[test]
fn parse_simple_week() {
    let schedule = parse_keep("Mo-Fr 09:00-17:00");

    assert_eq!(schedule.day(Weekday::Mon), Some(&[span!("09:00-17:00")][..]));
    assert_eq!(schedule.day(Weekday::Fri), Some(&[span!("09:00-17:00")][..]));
    assert_eq!(schedule.day(Weekday::Sat), None);
    assert!(!schedule.is_off(Weekday::Sat));
}

#[test]
fn parse_multiple_ranges_per_day() {
    let schedule = parse_keep("Tu 09:00-12:00,14:00-18:00");

    assert_eq!(
        schedule.day(Weekday::Tue),
        Some(&[span!("09:00-12:00"), span!("14:00-18:00")][..]),
    );
}

#[test]
fn parse_preserves_modifiers_verbatim() {
    let schedule = parse_keep("Mo-Fr 09:00-17:00; PH off; SH 10:00-12:00");

    assert_eq!(schedule.day(Weekday::Wed), Some(&[span!("09:00-17:00")][..]));
    assert_eq!(schedule.modifiers(), ["PH off", "SH 10:00-12:00"]);
}

#[test]
fn parse_day_clause_without_times_is_a_modifier() {
    let schedule = parse_keep("Mo-Fr");
    assert!(schedule.is_empty());
    assert_eq!(schedule.modifiers(), ["Mo-Fr"]);
}

#[test]
fn parse_explicit_off_day_kept() {
    let schedule = parse_keep("Mo 09:00-17:00; Tu off");

    assert_eq!(schedule.day(Weekday::Tue), Some(&[][..]));
    assert!(schedule.is_off(Weekday::Tue));
    assert_eq!(schedule.day(Weekday::Wed), None);
}

#[test]
fn parse_explicit_off_day_dropped() {
    let schedule = parse_drop("Mo 09:00-17:00; Tu off");

    assert_eq!(schedule.day(Weekday::Tue), None);
    assert!(!schedule.is_off(Weekday::Tue));
}

#[test]
fn parse_closed_reads_as_off() {
    let schedule = parse_keep("Mo 09:00-17:00; Tu closed");
    assert!(schedule.is_off(Weekday::Tue));
}

#[test]
fn parse_overnight_splits_at_midnight() {
    let schedule = parse_keep("Su 18:00-02:00");

    assert_eq!(schedule.day(Weekday::Sun), Some(&[span!("18:00-24:00")][..]));
    assert_eq!(schedule.day(Weekday::Mon), Some(&[span!("00:00-02:00")][..]));
    assert!(schedule.spans_midnight(Weekday::Sun));
    assert!(!schedule.spans_midnight(Weekday::Mon));
}

#[test]
fn parse_end_at_midnight_is_end_of_day() {
    let schedule = parse_keep("Fr 18:00-00:00");

    assert_eq!(schedule.day(Weekday::Fri), Some(&[span!("18:00-24:00")][..]));
    assert_eq!(schedule.day(Weekday::Sat), None);
    assert!(!schedule.spans_midnight(Weekday::Fri));
}

#[test]
fn parse_drops_day_emptied_by_sanitization() {
    // The only range is zero-length, which is not the same as an explicit
    // `off`: the day goes back to being absent.
    let schedule = parse_keep("Mo 09:00-09:00");
    assert_eq!(schedule.day(Weekday::Mon), None);
    assert!(!schedule.is_off(Weekday::Mon));
}

#[test]
fn parse_sanitizes_day_ranges() {
    let schedule = parse_keep("Mo 14:00-18:00,09:00-12:00,09:00-12:00");

    assert_eq!(
        schedule.day(Weekday::Mon),
        Some(&[span!("09:00-12:00"), span!("14:00-18:00")][..]),
    );
}

#[test]
fn parse_falls_back_to_intervals() {
    // A canonical string with no weekday clause at all: the model is
    // derived from the evaluator's enumerated open intervals over the
    // reference week (Monday 2024-01-01).
    let evaluator = MockEvaluator {
        canonical: Some(String::new()),
        intervals: vec![
            OpenInterval {
                range: datetime!("2024-01-01 09:00")..datetime!("2024-01-01 17:00"),
                comment: None,
            },
            OpenInterval {
                range: datetime!("2024-01-02 09:00")..datetime!("2024-01-03 00:00"),
                comment: None,
            },
        ],
        ..Default::default()
    };

    let schedule = WeekSchedule::parse_with(
        "Jan 02-Jan 05",
        &evaluator,
        &GeoContext::default(),
        &ParseOptions::default(),
    );

    assert_eq!(schedule.day(Weekday::Mon), Some(&[span!("09:00-17:00")][..]));
    // An interval ending exactly at next-day midnight renders as 24:00.
    assert_eq!(schedule.day(Weekday::Tue), Some(&[span!("09:00-24:00")][..]));
    assert!(schedule.modifiers().is_empty());
}

#[test]
fn interval_fallback_splits_overnight_intervals() {
    // A date-rule like "Jan 01-Jan 05 18:00-02:00" enumerates as intervals
    // crossing midnight; they split at midnight like an overnight clause
    // instead of collapsing into a backward span the sanitizer would drop.
    let evaluator = MockEvaluator {
        canonical: Some(String::new()),
        intervals: vec![OpenInterval {
            range: datetime!("2024-01-01 18:00")..datetime!("2024-01-02 02:00"),
            comment: None,
        }],
        ..Default::default()
    };

    let schedule = WeekSchedule::parse_with(
        "Jan 01-Jan 05 18:00-02:00",
        &evaluator,
        &GeoContext::default(),
        &ParseOptions::default(),
    );

    assert!(!schedule.is_empty());
    assert_eq!(schedule.day(Weekday::Mon), Some(&[span!("18:00-24:00")][..]));
    assert_eq!(schedule.day(Weekday::Tue), Some(&[span!("00:00-02:00")][..]));
    assert!(schedule.spans_midnight(Weekday::Mon));
    assert!(!schedule.spans_midnight(Weekday::Tue));
}

#[test]
fn serialize_empty_model() {
    assert_eq!(WeekSchedule::new().to_expression(), "Mo-Su off");
}

#[test]
fn serialize_around_the_clock() {
    assert_eq!(WeekSchedule::around_the_clock().to_expression(), "24/7");
}

#[test]
fn serialize_full_week_with_modifier_is_not_24_7() {
    let mut schedule = WeekSchedule::around_the_clock();
    schedule.push_modifier("PH off");
    assert_eq!(schedule.to_expression(), "Mo-Su 00:00-23:59; PH off");
}

#[test]
fn serialize_collapses_consecutive_days() {
    let mut schedule = WeekSchedule::new();

    for wday in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
        schedule.add_span(wday, span!("09:00-17:00"));
    }

    schedule.add_span(Weekday::Sat, span!("10:00-14:00"));

    assert_eq!(
        schedule.to_expression(),
        "Mo-Fr 09:00-17:00; Sa 10:00-14:00; Su off",
    );
}

#[test]
fn serialize_appends_modifiers() {
    let schedule = parse_keep("Mo-Fr 09:00-17:00; PH off");
    let serialized = schedule.to_expression();

    assert!(serialized.contains("Mo-Fr 09:00-17:00"));
    assert!(serialized.contains("PH off"));
}

#[test]
fn serialize_sanitizes_defensively() {
    let mut schedule = WeekSchedule::new();
    schedule.add_span(Weekday::Mon, span!("14:00-18:00"));
    schedule.add_span(Weekday::Mon, span!("09:00-12:00"));
    schedule.add_span(Weekday::Mon, span!("07:00-07:00"));

    assert_eq!(
        schedule.to_expression(),
        "Mo 09:00-12:00,14:00-18:00; Tu-Su off",
    );
}

#[test]
fn display_matches_expression() {
    let schedule = parse_keep("Sa 10:00-14:00");
    assert_eq!(schedule.to_string(), schedule.to_expression());
}
