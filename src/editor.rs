use std::collections::HashMap;

use crate::evaluator::{Evaluator, GeoContext, OhEvaluator};
use crate::schedule::{ParseOptions, WeekSchedule};
use crate::span::TimeSpan;
use crate::time::TimeOfDay;
use crate::weekday::{Weekday, MONDAY_FIRST};

/// Which endpoint of a draft range an edit targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Endpoint {
    Start,
    End,
}

/// Transient animation phase of a draft range. This lives in a side table
/// on the session, never on the durable model, so sanitization and
/// serialization never see it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transition {
    Entering,
    Exiting,
}

/// A range as typed by the user: raw text on both ends, possibly partial or
/// invalid while editing is in progress.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeDraft {
    id: u64,
    pub start: String,
    pub end: String,
}

impl RangeDraft {
    /// Stable identity of the draft within its session, used to key the
    /// transition overlay across re-renders.
    pub fn id(&self) -> u64 {
        self.id
    }

    fn to_span(&self) -> Option<TimeSpan> {
        Some(TimeSpan::new(
            TimeOfDay::parse(&self.start)?,
            TimeOfDay::parse(&self.end)?,
        ))
    }
}

/// Validation flags for one draft range, computed against its siblings.
/// The engine's sanitizer silently drops anything invalid; these flags are
/// how the UI explains to the user *what* would be dropped.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RangeValidation {
    pub start_invalid: bool,
    pub end_invalid: bool,
    /// Endpoints parse but the range is empty or backward.
    pub order_invalid: bool,
    /// The range overlaps a valid sibling on the same day.
    pub overlap_invalid: bool,
}

impl RangeValidation {
    pub fn is_ok(&self) -> bool {
        !(self.start_invalid || self.end_invalid || self.order_invalid || self.overlap_invalid)
    }
}

/// An in-progress editing session over one `opening_hours` value.
///
/// The session holds raw text drafts per weekday; every mutation
/// re-serializes the drafts into a candidate expression, which is committed
/// only when all drafts validate and the evaluator accepts the result.
#[derive(Debug)]
pub struct EditSession<E: Evaluator = OhEvaluator> {
    evaluator: E,
    ctx: GeoContext,
    options: ParseOptions,
    days: [Option<Vec<RangeDraft>>; 7],
    modifiers: Vec<String>,
    transitions: HashMap<u64, Transition>,
    committed: Option<String>,
    next_id: u64,
}

impl EditSession<OhEvaluator> {
    /// Open a session on an expression with the default evaluator.
    pub fn new(source: &str) -> Self {
        Self::with_evaluator(source, OhEvaluator, GeoContext::default(), ParseOptions::default())
    }
}

impl<E: Evaluator> EditSession<E> {
    /// Open a session with an explicit evaluator, geographic context and
    /// parse options.
    pub fn with_evaluator(source: &str, evaluator: E, ctx: GeoContext, options: ParseOptions) -> Self {
        let schedule = WeekSchedule::parse_with(source, &evaluator, &ctx, &options);

        let mut session = Self {
            evaluator,
            ctx,
            options,
            days: std::array::from_fn(|_| None),
            modifiers: schedule.modifiers().to_vec(),
            transitions: HashMap::new(),
            committed: (!source.trim().is_empty()).then(|| source.trim().to_string()),
            next_id: 0,
        };

        for (wday, spans) in schedule.days() {
            let drafts = spans
                .iter()
                .map(|span| session.draft_from_span(*span))
                .collect();

            session.days[slot(wday)] = Some(drafts);
        }

        session
    }

    fn draft_from_span(&mut self, span: TimeSpan) -> RangeDraft {
        RangeDraft {
            id: self.fresh_id(),
            start: span.start.to_string(),
            end: span.end.to_string(),
        }
    }

    fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // --
    // -- Draft access
    // --

    /// Drafts recorded for a weekday. `None` means the day is absent; an
    /// empty slice means it is explicitly off.
    pub fn drafts(&self, wday: Weekday) -> Option<&[RangeDraft]> {
        self.days[slot(wday)].as_deref()
    }

    /// Transition phase of a draft, if an animation is pending for it.
    pub fn transition(&self, draft_id: u64) -> Option<Transition> {
        self.transitions.get(&draft_id).copied()
    }

    /// The last expression accepted by [`EditSession::commit`], or the
    /// original source when nothing was committed yet.
    pub fn committed(&self) -> Option<&str> {
        self.committed.as_deref()
    }

    // --
    // -- Mutations
    // --

    /// Append a fresh empty draft to a weekday and mark it as entering.
    pub fn add_range(&mut self, wday: Weekday) -> u64 {
        let draft = RangeDraft {
            id: self.fresh_id(),
            start: String::new(),
            end: String::new(),
        };

        let id = draft.id;
        self.days[slot(wday)].get_or_insert_with(Vec::new).push(draft);
        self.transitions.insert(id, Transition::Entering);
        id
    }

    /// Update one endpoint of a draft. `"00:00"` typed into an end field
    /// means end-of-day and is coerced to `"24:00"`.
    pub fn update_range(&mut self, wday: Weekday, idx: usize, endpoint: Endpoint, value: &str) {
        let Some(draft) = self.days[slot(wday)].as_mut().and_then(|d| d.get_mut(idx)) else {
            return;
        };

        match endpoint {
            Endpoint::Start => draft.start = value.to_string(),
            Endpoint::End => {
                draft.end = if value == "00:00" {
                    "24:00".to_string()
                } else {
                    value.to_string()
                };
            }
        }
    }

    /// Mark a draft as exiting. The draft stays in place until
    /// [`EditSession::sweep_transitions`] runs, so the UI can animate its
    /// removal.
    pub fn remove_range(&mut self, wday: Weekday, idx: usize) {
        if let Some(draft) = self.days[slot(wday)].as_ref().and_then(|d| d.get(idx)) {
            self.transitions.insert(draft.id, Transition::Exiting);
        }
    }

    /// Drop exiting drafts and clear entering marks. Called once the UI
    /// transition finished. A day emptied by the sweep is removed from the
    /// session entirely: the user deleted its ranges, they did not mark it
    /// off. Days that were already empty are left alone.
    pub fn sweep_transitions(&mut self) {
        let transitions = std::mem::take(&mut self.transitions);

        for day in self.days.iter_mut() {
            let Some(drafts) = day else {
                continue;
            };

            let had_drafts = !drafts.is_empty();
            drafts.retain(|draft| transitions.get(&draft.id) != Some(&Transition::Exiting));

            if had_drafts && drafts.is_empty() {
                *day = None;
            }
        }
    }

    /// Mark a weekday as explicitly off, discarding its drafts.
    pub fn set_day_off(&mut self, wday: Weekday) {
        self.days[slot(wday)] = Some(Vec::new());
    }

    /// Remove a weekday from the session entirely.
    pub fn clear_day(&mut self, wday: Weekday) {
        self.days[slot(wday)] = None;
    }

    /// Replace the modifier clauses carried alongside the weekday drafts.
    pub fn set_modifiers(&mut self, modifiers: Vec<String>) {
        self.modifiers = modifiers;
    }

    // --
    // -- Validation & commit
    // --

    /// Validate one draft against its siblings on the same day.
    pub fn validate_range(&self, wday: Weekday, idx: usize) -> RangeValidation {
        let Some(siblings) = self.drafts(wday) else {
            return RangeValidation::default();
        };

        let Some(draft) = siblings.get(idx) else {
            return RangeValidation::default();
        };

        let start = TimeOfDay::parse(&draft.start);
        let end = TimeOfDay::parse(&draft.end);

        let mut validation = RangeValidation {
            start_invalid: start.is_none(),
            end_invalid: end.is_none(),
            ..Default::default()
        };

        let (Some(start), Some(end)) = (start, end) else {
            return validation;
        };

        let (start_mins, end_mins) = (start.mins_from_midnight(), end.mins_from_midnight());

        if start_mins >= end_mins {
            validation.order_invalid = true;
            return validation;
        }

        for (other_idx, other) in siblings.iter().enumerate() {
            if other_idx == idx {
                continue;
            }

            let Some(other_span) = other.to_span() else {
                continue;
            };

            let other_start = other_span.start.mins_from_midnight();
            let other_end = other_span.end.mins_from_midnight();

            if other_start < other_end && start_mins.max(other_start) < end_mins.min(other_end) {
                validation.overlap_invalid = true;
                break;
            }
        }

        validation
    }

    /// Check if any draft in the session fails validation.
    pub fn has_invalid_ranges(&self) -> bool {
        MONDAY_FIRST.into_iter().any(|wday| {
            self.drafts(wday)
                .map(|drafts| (0..drafts.len()).any(|idx| !self.validate_range(wday, idx).is_ok()))
                .unwrap_or(false)
        })
    }

    /// Build the durable model from the current drafts. Exiting drafts are
    /// excluded; invalid drafts are dropped by sanitization.
    pub fn schedule(&self) -> WeekSchedule {
        let mut schedule = WeekSchedule::new();

        for wday in MONDAY_FIRST {
            if let Some(drafts) = self.drafts(wday) {
                let spans = drafts
                    .iter()
                    .filter(|draft| self.transition(draft.id) != Some(Transition::Exiting))
                    .filter_map(RangeDraft::to_span)
                    .collect();

                schedule.set_day(wday, spans);
            }
        }

        schedule.set_modifiers(self.modifiers.clone());
        schedule
    }

    /// Serialize the drafts and, when everything validates and the
    /// evaluator accepts the result, record it as the committed value.
    ///
    /// Returns `None` without touching the committed value when a draft is
    /// invalid, when the evaluator rejects the serialized expression, or
    /// when the expression did not change. Keeping invalid in-progress edits
    /// out of the committed value is what lets the UI show them without
    /// corrupting the stored tag.
    pub fn commit(&mut self) -> Option<&str> {
        if self.has_invalid_ranges() {
            return None;
        }

        let candidate = self.schedule().to_expression();

        if let Err(err) = self.evaluator.canonicalize(&candidate, &self.ctx) {
            log::warn!("serialized expression {candidate:?} was rejected: {err}");
            return None;
        }

        if self.committed.as_deref() == Some(candidate.as_str()) {
            return None;
        }

        self.committed = Some(candidate);
        self.committed.as_deref()
    }

    /// Reset the session from a new source value, dropping all drafts.
    pub fn reload(&mut self, source: &str) {
        let schedule = WeekSchedule::parse_with(source, &self.evaluator, &self.ctx, &self.options);

        self.days = std::array::from_fn(|_| None);
        self.modifiers = schedule.modifiers().to_vec();
        self.transitions.clear();
        self.committed = (!source.trim().is_empty()).then(|| source.trim().to_string());

        for (wday, spans) in schedule.days() {
            let drafts = spans
                .iter()
                .map(|span| self.draft_from_span(*span))
                .collect();

            self.days[slot(wday)] = Some(drafts);
        }
    }
}

/// Monday-first slot index of a weekday.
fn slot(wday: Weekday) -> usize {
    wday.num_days_from_monday() as usize
}
