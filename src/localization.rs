use std::collections::HashMap;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::Arc;

use crate::weekday::{short_label, Weekday};

/// Message keys the status formatter looks up, with their English fallback
/// templates. `{time}` placeholders are substituted by the engine after
/// translation.
pub mod messages {
    pub const OPEN_NOW: (&str, &str) = ("open_now", "Open now");
    pub const OPEN_UNTIL: (&str, &str) = ("open_until", "Open until {time}");
    pub const CLOSED: (&str, &str) = ("closed", "Closed");
    pub const CLOSED_OPENS: (&str, &str) = ("closed_opens", "Closed • opens {time}");
    pub const UNKNOWN: (&str, &str) = ("unknown", "Hours unavailable");
}

/// Injected translation capability.
///
/// The default simply returns the fallback, so the engine never probes for
/// an optional translation backend at runtime: callers that have one inject
/// it here.
///
/// ```
/// use opening_hours_editor::localization::Translator;
///
/// let identity = Translator::default();
/// assert_eq!(identity.get("open_now", "Open now"), "Open now");
///
/// let french = Translator::new(|key, fallback| match key {
///     "open_now" => "Ouvert".to_string(),
///     _ => fallback.to_string(),
/// });
///
/// assert_eq!(french.get("open_now", "Open now"), "Ouvert");
/// ```
#[derive(Clone)]
pub struct Translator(Arc<dyn Fn(&str, &str) -> String + Send + Sync>);

impl Translator {
    /// Wrap a translation function mapping `(key, fallback)` to a localized
    /// template.
    pub fn new(translate: impl Fn(&str, &str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(translate))
    }

    /// Translate a message key, falling back to the given template.
    pub fn get(&self, key: &str, fallback: &str) -> String {
        (self.0)(key, fallback)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(|_, fallback| fallback.to_string())
    }
}

impl Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Translator")
    }
}

/// Default day-label hook: the short OSM token.
pub fn default_day_label(wday: Weekday) -> String {
    short_label(wday).to_string()
}

/// A bounded memo cache for reverse-geocoded country codes.
///
/// Keys are coordinates rounded to 3 decimals, which is plenty for a
/// country-level lookup. Negative answers are cached too, so a coastline
/// miss is not retried on every call. Eviction is first-in first-out once
/// the explicit capacity is reached.
#[derive(Debug)]
pub struct CountryCache {
    capacity: usize,
    entries: HashMap<(i32, i32), Option<String>>,
    insertion_order: VecDeque<(i32, i32)>,
}

impl CountryCache {
    /// Create a cache bounded to `capacity` coordinate keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    /// Number of cached coordinate keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the country code for coordinates, resolving and caching on a
    /// miss. The resolver is injected: network lookups belong to the
    /// caller, not to the engine.
    pub fn get_or_resolve(
        &mut self,
        lat: f64,
        lon: f64,
        resolve: impl FnOnce(f64, f64) -> Option<String>,
    ) -> Option<String> {
        let key = (round_coord(lat), round_coord(lon));

        if let Some(cached) = self.entries.get(&key) {
            return cached.clone();
        }

        let resolved = resolve(lat, lon).map(|code| code.to_ascii_uppercase());

        if self.entries.len() == self.capacity {
            if let Some(oldest) = self.insertion_order.pop_front() {
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(key, resolved.clone());
        self.insertion_order.push_back(key);
        resolved
    }
}

fn round_coord(value: f64) -> i32 {
    (value * 1000.0).round() as i32
}
