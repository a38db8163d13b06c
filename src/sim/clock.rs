//! Simulated wall-clock time as (days, hours, minutes).

use std::fmt;
use std::str::FromStr;

/// Minutes in one simulated day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Elapsed simulated time, always normalized: `minutes < 60`, `hours < 24`.
///
/// Negative time is not representable. Overflowing minutes carry into hours
/// and overflowing hours into days on every mutation.
///
/// # Examples
///
/// ```
/// use v2g_sim::sim::clock::GridClock;
///
/// let mut clock = GridClock::new(0, 23, 50);
/// clock.add_minutes(25);
/// assert_eq!(clock.to_string(), "01-00:15");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridClock {
    days: u32,
    hours: u32,
    minutes: u32,
}

/// Rejected time string, with the offending input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockParseError {
    /// The string that failed to parse.
    pub input: String,
}

impl fmt::Display for ClockParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid time string \"{}\", expected \"dd-hh:mm\"",
            self.input
        )
    }
}

impl std::error::Error for ClockParseError {}

impl GridClock {
    /// Creates a clock from a possibly unnormalized triple.
    pub fn new(days: u32, hours: u32, minutes: u32) -> Self {
        let mut clock = Self {
            days,
            hours,
            minutes,
        };
        clock.normalize();
        clock
    }

    /// Advances the clock by whole minutes.
    pub fn add_minutes(&mut self, minutes: u32) {
        self.minutes += minutes;
        self.normalize();
    }

    /// Advances the clock by a (days, hours, minutes) delta.
    pub fn add_delta(&mut self, days: u32, hours: u32, minutes: u32) {
        self.days += days;
        self.hours += hours;
        self.minutes += minutes;
        self.normalize();
    }

    fn normalize(&mut self) {
        self.hours += self.minutes / 60;
        self.minutes %= 60;
        self.days += self.hours / 24;
        self.hours %= 24;
    }

    /// Day counter.
    pub fn days(&self) -> u32 {
        self.days
    }

    /// Hour of day, 0–23.
    pub fn hours(&self) -> u32 {
        self.hours
    }

    /// Minute of hour, 0–59.
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// Minute of day, 0–1439.
    pub fn minute_of_day(&self) -> u32 {
        self.hours * 60 + self.minutes
    }

    /// Total elapsed minutes since day 0, 00:00.
    pub fn total_minutes(&self) -> u64 {
        u64::from(self.days) * u64::from(MINUTES_PER_DAY) + u64::from(self.minute_of_day())
    }

    /// Parses `"dd-hh:mm"`.
    ///
    /// Hours and minutes must carry exactly two digits; the day field takes
    /// one or more, so rendered clocks beyond day 99 still round-trip. The
    /// result is normalized.
    ///
    /// # Errors
    ///
    /// Returns a [`ClockParseError`] describing the rejected input.
    pub fn parse(input: &str) -> Result<Self, ClockParseError> {
        let reject = || ClockParseError {
            input: input.to_string(),
        };

        let (day, clock_part) = input.split_once('-').ok_or_else(reject)?;
        let (hour, minute) = clock_part.split_once(':').ok_or_else(reject)?;

        if day.is_empty() || hour.len() != 2 || minute.len() != 2 {
            return Err(reject());
        }

        let days = day.parse::<u32>().map_err(|_| reject())?;
        let hours = hour.parse::<u32>().map_err(|_| reject())?;
        let minutes = minute.parse::<u32>().map_err(|_| reject())?;

        Ok(Self::new(days, hours, minutes))
    }
}

impl FromStr for GridClock {
    type Err = ClockParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for GridClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:02}:{:02}",
            self.days, self.hours, self.minutes
        )
    }
}
