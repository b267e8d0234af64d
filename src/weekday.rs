// Reexport Weekday from chrono as part of the public type.
pub use chrono::Weekday;

use crate::span::TimeSpan;

/// Canonical Monday-first traversal order, used both for display and for
/// collapsing day runs back into range labels.
pub const MONDAY_FIRST: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Short OSM token for a weekday.
pub fn short_label(wday: Weekday) -> &'static str {
    match wday {
        Weekday::Mon => "Mo",
        Weekday::Tue => "Tu",
        Weekday::Wed => "We",
        Weekday::Thu => "Th",
        Weekday::Fri => "Fr",
        Weekday::Sat => "Sa",
        Weekday::Sun => "Su",
    }
}

/// Recognize a weekday label in short, abbreviated or full form.
pub fn from_label(label: &str) -> Option<Weekday> {
    match label.to_ascii_lowercase().as_str() {
        "mo" | "mon" | "monday" => Some(Weekday::Mon),
        "tu" | "tue" | "tuesday" => Some(Weekday::Tue),
        "we" | "wed" | "wednesday" => Some(Weekday::Wed),
        "th" | "thu" | "thursday" => Some(Weekday::Thu),
        "fr" | "fri" | "friday" => Some(Weekday::Fri),
        "sa" | "sat" | "saturday" => Some(Weekday::Sat),
        "su" | "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// A set of weekdays, iterated in Monday-first order.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DaySet([bool; 7]);

impl DaySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, wday: Weekday) {
        self.0[wday.num_days_from_monday() as usize] = true;
    }

    pub fn contains(&self, wday: Weekday) -> bool {
        self.0[wday.num_days_from_monday() as usize]
    }

    pub fn is_empty(&self) -> bool {
        !self.0.contains(&true)
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        MONDAY_FIRST.into_iter().filter(|wday| self.contains(*wday))
    }
}

impl FromIterator<Weekday> for DaySet {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        let mut set = Self::new();

        for wday in iter {
            set.insert(wday);
        }

        set
    }
}

/// Expand an OSM weekday expression (`"Mo-Fr,Su"`) into a set of weekdays.
///
/// Ranges are inclusive and walk forward through the cyclic week, so
/// `"Fr-Mo"` covers Friday through Monday. Unknown labels are silently
/// skipped; callers treat a clause whose expression expands to nothing as an
/// opaque modifier.
///
/// ```
/// use chrono::Weekday;
/// use opening_hours_editor::weekday::expand_days;
///
/// let days = expand_days("Fr-Mo");
/// let expanded: Vec<_> = days.iter().collect();
/// assert_eq!(expanded, [Weekday::Mon, Weekday::Fri, Weekday::Sat, Weekday::Sun]);
///
/// assert!(expand_days("PH").is_empty());
/// ```
pub fn expand_days(expr: &str) -> DaySet {
    let mut days = DaySet::new();

    for part in expr.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start_label, end_label)) => {
                let Some(start) = from_label(start_label.trim()) else {
                    continue;
                };

                let Some(end) = from_label(end_label.trim()) else {
                    continue;
                };

                let mut current = start;

                // The cyclic walk is bounded to one full week in case the
                // start label repeats as the end label.
                for _ in 0..7 {
                    days.insert(current);

                    if current == end {
                        break;
                    }

                    current = current.succ();
                }
            }
            None => {
                if let Some(wday) = from_label(part) {
                    days.insert(wday);
                }
            }
        }
    }

    days
}

/// Collapse a full Monday-first week of sanitized span lists into minimal
/// `(day-range label, hours label)` clauses.
///
/// Maximal runs of consecutive weekdays with element-wise identical span
/// lists merge into one label; a day with no spans renders as `"off"`. The
/// clause order always matches the Monday-first traversal.
pub fn collapse_days(per_day: &[Vec<TimeSpan>; 7]) -> Vec<(String, String)> {
    let mut clauses = Vec::new();
    let mut idx = 0;

    while idx < MONDAY_FIRST.len() {
        let run_start = idx;

        while idx + 1 < MONDAY_FIRST.len() && per_day[idx + 1] == per_day[run_start] {
            idx += 1;
        }

        let label = if idx > run_start {
            format!(
                "{}-{}",
                short_label(MONDAY_FIRST[run_start]),
                short_label(MONDAY_FIRST[idx]),
            )
        } else {
            short_label(MONDAY_FIRST[run_start]).to_string()
        };

        let hours = if per_day[run_start].is_empty() {
            "off".to_string()
        } else {
            let tokens: Vec<_> = per_day[run_start]
                .iter()
                .map(TimeSpan::to_string)
                .collect();

            tokens.join(",")
        };

        clauses.push((label, hours));
        idx += 1;
    }

    clauses
}
