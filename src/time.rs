use std::fmt::{Debug, Display};

use chrono::{NaiveTime, Timelike};

/// An hour+minute clock time bounded by the *24:00* end-of-day sentinel.
///
/// *24:00* is a distinct value from *00:00*: it is only meaningful at the end
/// position of a range and reads as "runs until the end of the day".
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// First minute of the day.
    pub const START_OF_DAY: Self = Self { hour: 0, minute: 0 };

    /// The end-of-day sentinel, *24:00*.
    pub const END_OF_DAY: Self = Self { hour: 24, minute: 0 };

    /// Create a new time of day, this may return `None` if input values are
    /// out of range.
    ///
    /// ```
    /// use opening_hours_editor::TimeOfDay;
    ///
    /// assert!(TimeOfDay::new(9, 30).is_some());
    /// assert!(TimeOfDay::new(24, 0).is_some()); // end-of-day sentinel
    /// assert!(TimeOfDay::new(24, 1).is_none()); // past the sentinel
    /// assert!(TimeOfDay::new(8, 60).is_none()); // minutes are out of bound
    /// ```
    #[inline]
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour > 24 || minute > 59 || (hour == 24 && minute > 0) {
            None
        } else {
            Some(Self { hour, minute })
        }
    }

    /// Normalize free-form user time input into a canonical time.
    ///
    /// Accepted forms are `H`, `HH`, `H:MM`, `HH:MM`, compact digit runs
    /// (`"930"`, `"1430"`) and an optional trailing `am`/`pm` suffix. Hours
    /// outside the clock are clamped to `[0, 23]`, except the unsuffixed
    /// literal `24:00` which is preserved as the end-of-day sentinel. Input
    /// containing no digit at all is rejected with `None`, never a panic, so
    /// callers can keep an editing UI responsive to partial input.
    ///
    /// ```
    /// use opening_hours_editor::TimeOfDay;
    ///
    /// assert_eq!(TimeOfDay::parse("9"), TimeOfDay::new(9, 0));
    /// assert_eq!(TimeOfDay::parse("930"), TimeOfDay::new(9, 30));
    /// assert_eq!(TimeOfDay::parse("9:30 pm"), TimeOfDay::new(21, 30));
    /// assert_eq!(TimeOfDay::parse("12am"), TimeOfDay::new(0, 0));
    /// assert_eq!(TimeOfDay::parse("24:00"), Some(TimeOfDay::END_OF_DAY));
    /// assert_eq!(TimeOfDay::parse("garbage"), None);
    /// ```
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();

        let (body, meridiem) = match lower.strip_suffix("am") {
            Some(rest) => (rest.trim_end(), Some(Meridiem::Am)),
            None => match lower.strip_suffix("pm") {
                Some(rest) => (rest.trim_end(), Some(Meridiem::Pm)),
                None => (lower.as_str(), None),
            },
        };

        let (hour_digits, minute_digits) = split_digits(body)?;
        let mut hour: u32 = hour_digits.parse().ok()?;

        let minute: u32 = match minute_digits {
            Some(digits) => digits.parse().ok()?,
            None => 0,
        };

        let minute = minute.min(59);

        match meridiem {
            Some(Meridiem::Pm) if hour < 12 => hour += 12,
            Some(Meridiem::Am) if hour == 12 => hour = 0,
            _ => {}
        }

        if meridiem.is_none() && hour == 24 && minute == 0 {
            return Some(Self::END_OF_DAY);
        }

        let hour = hour.min(23);
        Self::new(hour as u8, minute as u8)
    }

    /// Get the number of full hours in this time.
    #[inline]
    pub fn hour(self) -> u8 {
        self.hour
    }

    /// Get the number of remaining minutes in this time.
    #[inline]
    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Check if this is the *24:00* end-of-day sentinel.
    #[inline]
    pub fn is_end_of_day(self) -> bool {
        self == Self::END_OF_DAY
    }

    /// Get the total number of minutes from *00:00*. The sentinel maps to a
    /// full day, so it always sorts after any same-day time.
    ///
    /// ```
    /// use opening_hours_editor::TimeOfDay;
    ///
    /// let time = TimeOfDay::new(14, 30).unwrap();
    /// assert_eq!(time.mins_from_midnight(), 14 * 60 + 30);
    /// assert_eq!(TimeOfDay::END_OF_DAY.mins_from_midnight(), 24 * 60);
    /// ```
    #[inline]
    pub fn mins_from_midnight(self) -> u16 {
        u16::from(self.minute) + 60 * u16::from(self.hour)
    }

    /// Build a time from the total number of minutes from midnight and
    /// return `None` if the result is out of bounds.
    #[inline]
    pub fn from_mins_from_midnight(minute: u16) -> Option<Self> {
        let hour = (minute / 60).try_into().ok()?;
        let minute = (minute % 60).try_into().ok()?;
        Self::new(hour, minute)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Debug for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        write!(f, "{self}")
    }
}

impl From<NaiveTime> for TimeOfDay {
    #[inline]
    fn from(time: NaiveTime) -> TimeOfDay {
        Self {
            hour: time.hour().try_into().expect("invalid NaiveTime"),
            minute: time.minute().try_into().expect("invalid NaiveTime"),
        }
    }
}

enum Meridiem {
    Am,
    Pm,
}

/// Extract the hour and minute digit groups from free-form input: the first
/// digit run, optionally followed by `:` and a second run. A compact run
/// longer than two digits is split before its last two digits.
fn split_digits(body: &str) -> Option<(&str, Option<&str>)> {
    let start = body.find(|c: char| c.is_ascii_digit())?;
    let rest = &body[start..];

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    let (digits, tail) = rest.split_at(digits_end);

    if let Some(after_colon) = tail.strip_prefix(':') {
        let minutes_end = after_colon
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(after_colon.len());

        if minutes_end > 0 {
            return Some((digits, Some(&after_colon[..minutes_end])));
        }

        return Some((digits, None));
    }

    if digits.len() > 2 {
        let (hours, minutes) = digits.split_at(digits.len() - 2);
        return Some((hours, Some(minutes)));
    }

    Some((digits, None))
}
