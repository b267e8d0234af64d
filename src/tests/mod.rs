mod editor;
mod schedule;

use std::ops::Range;

use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::evaluator::{Evaluator, GeoContext, OpenInterval, OpeningState};

#[macro_export]
macro_rules! datetime {
    ( $date: expr ) => {{
        use chrono::NaiveDateTime;
        NaiveDateTime::parse_from_str($date, "%Y-%m-%d %H:%M").expect("invalid datetime literal")
    }};
}

#[macro_export]
macro_rules! span {
    ( $token: expr ) => {
        $crate::span::TimeSpan::parse($token).expect("invalid span literal")
    };
}

/// Scripted evaluator for tests that need full control over the
/// collaborator's answers.
#[derive(Debug, Default)]
pub(crate) struct MockEvaluator {
    pub canonical: Option<String>,
    pub rejects: bool,
    pub state: OpeningState,
    pub next_change: Option<NaiveDateTime>,
    pub intervals: Vec<OpenInterval>,
}

impl Evaluator for MockEvaluator {
    fn canonicalize(&self, source: &str, _ctx: &GeoContext) -> Result<String> {
        if self.rejects {
            return Err(Error::Rejected("scripted rejection".to_string()));
        }

        Ok(self
            .canonical
            .clone()
            .unwrap_or_else(|| source.trim().to_string()))
    }

    fn state_at(&self, _source: &str, _ctx: &GeoContext, _instant: NaiveDateTime) -> OpeningState {
        self.state
    }

    fn next_change(
        &self,
        _source: &str,
        _ctx: &GeoContext,
        _instant: NaiveDateTime,
    ) -> Option<NaiveDateTime> {
        self.next_change
    }

    fn open_intervals(
        &self,
        _source: &str,
        _ctx: &GeoContext,
        _window: Range<NaiveDateTime>,
    ) -> Vec<OpenInterval> {
        self.intervals.clone()
    }
}
