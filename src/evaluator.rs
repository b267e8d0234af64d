use std::ops::Range;

use chrono::NaiveDateTime;

use opening_hours::localization::Country;
use opening_hours::{Context, OpeningHours, RuleKind};

use crate::error::{Error, Result};

/// The state of a schedule at some instant, as reported by an evaluator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OpeningState {
    Open,
    Closed,
    #[default]
    Unknown,
}

/// An open period reported by an evaluator over a query window.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OpenInterval {
    pub range: Range<NaiveDateTime>,
    pub comment: Option<String>,
}

/// Geographic context forwarded to the evaluator: holiday rules and similar
/// grammar details depend on where the tagged element sits.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GeoContext {
    /// ISO 3166-1 alpha-2 country code, when known.
    pub country: Option<String>,
}

impl GeoContext {
    /// Attach a country code to this context.
    ///
    /// ```
    /// use opening_hours_editor::GeoContext;
    ///
    /// let ctx = GeoContext::default().with_country("fr");
    /// assert_eq!(ctx.country.as_deref(), Some("FR"));
    /// ```
    pub fn with_country(self, code: &str) -> Self {
        Self { country: Some(code.to_ascii_uppercase()) }
    }
}

/// The external grammar-complete interpreter the engine delegates to.
///
/// The engine owns normalization and the weekly model; everything that
/// requires understanding the full `opening_hours` grammar (validity,
/// open/closed state, interval enumeration) goes through this seam.
pub trait Evaluator {
    /// Validate an expression and return its canonical textual rendering.
    fn canonicalize(&self, source: &str, ctx: &GeoContext) -> Result<String>;

    /// State of the schedule at the given instant.
    fn state_at(&self, source: &str, ctx: &GeoContext, instant: NaiveDateTime) -> OpeningState;

    /// Next instant after `instant` where the state changes, if any.
    fn next_change(
        &self,
        source: &str,
        ctx: &GeoContext,
        instant: NaiveDateTime,
    ) -> Option<NaiveDateTime>;

    /// Ordered open periods intersecting `window`.
    fn open_intervals(
        &self,
        source: &str,
        ctx: &GeoContext,
        window: Range<NaiveDateTime>,
    ) -> Vec<OpenInterval>;
}

/// Evaluator backed by the `opening-hours` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct OhEvaluator;

impl OhEvaluator {
    fn compile(&self, source: &str, ctx: &GeoContext) -> Result<OpeningHours> {
        let oh = OpeningHours::parse(source).map_err(|err| Error::Rejected(err.to_string()))?;

        let holidays = (ctx.country.as_deref())
            .and_then(|code| code.parse::<Country>().ok())
            .map(Country::holidays)
            .unwrap_or_default();

        Ok(oh.with_context(Context::default().with_holidays(holidays)))
    }
}

impl Evaluator for OhEvaluator {
    fn canonicalize(&self, source: &str, ctx: &GeoContext) -> Result<String> {
        // The backend's own rendering rewrites `off` into `closed` and pads
        // rule separators, which would stop modifier clauses like `PH off`
        // from surviving a round-trip verbatim. Validation is what matters
        // here, so the accepted source is returned as-is.
        self.compile(source, ctx)?;
        Ok(source.trim().to_string())
    }

    fn state_at(&self, source: &str, ctx: &GeoContext, instant: NaiveDateTime) -> OpeningState {
        let Ok(oh) = self.compile(source, ctx) else {
            return OpeningState::Unknown;
        };

        match oh.state(instant) {
            RuleKind::Open => OpeningState::Open,
            RuleKind::Closed => OpeningState::Closed,
            RuleKind::Unknown => OpeningState::Unknown,
        }
    }

    fn next_change(
        &self,
        source: &str,
        ctx: &GeoContext,
        instant: NaiveDateTime,
    ) -> Option<NaiveDateTime> {
        self.compile(source, ctx).ok()?.next_change(instant)
    }

    fn open_intervals(
        &self,
        source: &str,
        ctx: &GeoContext,
        window: Range<NaiveDateTime>,
    ) -> Vec<OpenInterval> {
        let Ok(oh) = self.compile(source, ctx) else {
            return Vec::new();
        };

        oh.iter_range(window.start, window.end)
            .filter(|dtr| dtr.kind == RuleKind::Open)
            .map(|dtr| OpenInterval {
                range: dtr.range,
                comment: dtr.comments.first().map(|comment| comment.to_string()),
            })
            .collect()
    }
}
