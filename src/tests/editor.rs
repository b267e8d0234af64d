use chrono::Weekday;

use crate::editor::{EditSession, Endpoint, Transition};
use crate::schedule::ParseOptions;
use crate::span;
use crate::tests::MockEvaluator;
use crate::GeoContext;

fn session(source: &str) -> EditSession<MockEvaluator> {
    EditSession::with_evaluator(
        source,
        MockEvaluator::default(),
        GeoContext::default(),
        ParseOptions::default(),
    )
}

#[test]
fn opens_with_drafts_from_the_source() {
    let session = session("Mo-Fr 09:00-17:00");
    let drafts = session.drafts(Weekday::Mon).unwrap();

    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].start, "09:00");
    assert_eq!(drafts[0].end, "17:00");
    assert_eq!(session.drafts(Weekday::Sat), None);
}

#[test]
fn add_range_marks_entering() {
    let mut session = session("");
    let id = session.add_range(Weekday::Tue);

    assert_eq!(session.transition(id), Some(Transition::Entering));
    assert_eq!(session.drafts(Weekday::Tue).unwrap().len(), 1);
}

#[test]
fn update_coerces_midnight_end_to_sentinel() {
    let mut session = session("");
    session.add_range(Weekday::Mon);
    session.update_range(Weekday::Mon, 0, Endpoint::Start, "18:00");
    session.update_range(Weekday::Mon, 0, Endpoint::End, "00:00");

    let draft = &session.drafts(Weekday::Mon).unwrap()[0];
    assert_eq!(draft.start, "18:00");
    assert_eq!(draft.end, "24:00");

    // Starts are left alone.
    session.update_range(Weekday::Mon, 0, Endpoint::Start, "00:00");
    assert_eq!(session.drafts(Weekday::Mon).unwrap()[0].start, "00:00");
}

#[test]
fn remove_range_is_deferred_until_sweep() {
    let mut session = session("Mo 09:00-17:00");
    session.remove_range(Weekday::Mon, 0);

    // The draft is still there for the exit animation, but already gone
    // from the durable model.
    let id = session.drafts(Weekday::Mon).unwrap()[0].id();
    assert_eq!(session.transition(id), Some(Transition::Exiting));
    assert_eq!(session.schedule().day(Weekday::Mon), Some(&[][..]));

    session.sweep_transitions();
    assert_eq!(session.drafts(Weekday::Mon), None);
    assert_eq!(session.transition(id), None);
}

#[test]
fn sweeping_one_of_two_drafts_keeps_the_day() {
    let mut session = session("Mo 09:00-12:00,14:00-18:00");
    session.remove_range(Weekday::Mon, 1);
    session.sweep_transitions();

    assert_eq!(session.drafts(Weekday::Mon).unwrap().len(), 1);
}

#[test]
fn sweep_leaves_explicitly_off_days_alone() {
    let mut session = session("Mo 09:00-17:00; Tu off");
    session.remove_range(Weekday::Mon, 0);
    session.sweep_transitions();

    // Monday was emptied by the user and drops out; Tuesday's explicit
    // off marker is untouched.
    assert_eq!(session.drafts(Weekday::Mon), None);
    assert_eq!(session.drafts(Weekday::Tue), Some(&[][..]));
}

#[test]
fn validation_flags_unparseable_endpoints() {
    let mut session = session("");
    session.add_range(Weekday::Mon);
    session.update_range(Weekday::Mon, 0, Endpoint::Start, "garbage");
    session.update_range(Weekday::Mon, 0, Endpoint::End, "17:00");

    let validation = session.validate_range(Weekday::Mon, 0);
    assert!(validation.start_invalid);
    assert!(!validation.end_invalid);
    assert!(!validation.is_ok());
}

#[test]
fn validation_flags_backward_order() {
    let mut session = session("");
    session.add_range(Weekday::Mon);
    session.update_range(Weekday::Mon, 0, Endpoint::Start, "18:00");
    session.update_range(Weekday::Mon, 0, Endpoint::End, "09:00");

    let validation = session.validate_range(Weekday::Mon, 0);
    assert!(!validation.start_invalid);
    assert!(!validation.end_invalid);
    assert!(validation.order_invalid);
}

#[test]
fn validation_flags_overlap_with_sibling() {
    let mut session = session("Mo 09:00-12:00");
    session.add_range(Weekday::Mon);
    session.update_range(Weekday::Mon, 1, Endpoint::Start, "11:00");
    session.update_range(Weekday::Mon, 1, Endpoint::End, "14:00");

    assert!(session.validate_range(Weekday::Mon, 1).overlap_invalid);
    assert!(session.has_invalid_ranges());
}

#[test]
fn touching_ranges_do_not_overlap() {
    let mut session = session("Mo 09:00-12:00");
    session.add_range(Weekday::Mon);
    session.update_range(Weekday::Mon, 1, Endpoint::Start, "12:00");
    session.update_range(Weekday::Mon, 1, Endpoint::End, "14:00");

    assert!(session.validate_range(Weekday::Mon, 1).is_ok());
    assert!(!session.has_invalid_ranges());
}

#[test]
fn commit_refuses_invalid_drafts() {
    let mut session = session("Mo 09:00-17:00");
    session.update_range(Weekday::Mon, 0, Endpoint::End, "oops");

    assert_eq!(session.commit(), None);
    assert_eq!(session.committed(), Some("Mo 09:00-17:00"));
}

#[test]
fn commit_skips_unchanged_expression() {
    let mut session = session("Mo 09:00-17:00; Tu-Su off");
    assert_eq!(session.commit(), None);
}

#[test]
fn commit_emits_the_serialized_expression() {
    let mut session = session("Mo 09:00-17:00");
    session.update_range(Weekday::Mon, 0, Endpoint::End, "18:00");

    assert_eq!(session.commit(), Some("Mo 09:00-18:00; Tu-Su off"));
    assert_eq!(session.committed(), Some("Mo 09:00-18:00; Tu-Su off"));

    // Committing again with no further edits is a no-op.
    assert_eq!(session.commit(), None);
}

#[test]
fn commit_refuses_evaluator_rejection() {
    let mut session = EditSession::with_evaluator(
        "Mo 09:00-17:00",
        MockEvaluator { rejects: true, ..Default::default() },
        GeoContext::default(),
        ParseOptions::default(),
    );

    // The rejecting evaluator also rejected the source, so the session
    // opened empty; give it something to serialize.
    session.add_range(Weekday::Mon);
    session.update_range(Weekday::Mon, 0, Endpoint::Start, "09:00");
    session.update_range(Weekday::Mon, 0, Endpoint::End, "17:00");

    assert_eq!(session.commit(), None);
}

#[test]
fn schedule_normalizes_free_form_drafts() {
    let mut session = session("");
    session.add_range(Weekday::Sat);
    session.update_range(Weekday::Sat, 0, Endpoint::Start, "9am");
    session.update_range(Weekday::Sat, 0, Endpoint::End, "5:30 pm");

    assert_eq!(
        session.schedule().day(Weekday::Sat),
        Some(&[span!("09:00-17:30")][..]),
    );
}

#[test]
fn set_day_off_and_clear_day() {
    let mut session = session("Mo 09:00-17:00");

    session.set_day_off(Weekday::Mon);
    assert_eq!(session.drafts(Weekday::Mon), Some(&[][..]));

    session.clear_day(Weekday::Mon);
    assert_eq!(session.drafts(Weekday::Mon), None);
}

#[test]
fn reload_replaces_drafts() {
    let mut session = session("Mo 09:00-17:00");
    session.add_range(Weekday::Fri);

    session.reload("Tu 10:00-16:00");
    assert_eq!(session.drafts(Weekday::Mon), None);
    assert_eq!(session.drafts(Weekday::Fri), None);
    assert_eq!(session.drafts(Weekday::Tue).unwrap().len(), 1);
}
