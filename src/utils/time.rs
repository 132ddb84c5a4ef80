//! Time expression parsing and formatting utilities

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::errors::ConversionError;

/// `<int><unit>` where unit is one of ms, min, h, m, s. Alternation order matters:
/// `ms` and `min` must be tried before `m`.
static COMPONENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([0-9]+)(ms|min|h|m|s)").expect("time component pattern is valid")
});

/// Parser for human time expressions like `1h 2m 3s 400ms`
pub struct TimeParser;

impl TimeParser {
    /// Create a new time parser
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimeParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Components found in one expression; the first occurrence of a unit wins
#[derive(Debug, Default)]
struct Components {
    hours: Option<u64>,
    minutes: Option<u64>,
    seconds: Option<u64>,
    milliseconds: Option<u64>,
}

impl Components {
    fn is_empty(&self) -> bool {
        self.hours.is_none()
            && self.minutes.is_none()
            && self.seconds.is_none()
            && self.milliseconds.is_none()
    }

    fn total_millis(&self) -> Option<u64> {
        let hours = self.hours.unwrap_or(0).checked_mul(3_600_000)?;
        let minutes = self.minutes.unwrap_or(0).checked_mul(60_000)?;
        let seconds = self.seconds.unwrap_or(0).checked_mul(1_000)?;
        hours
            .checked_add(minutes)?
            .checked_add(seconds)?
            .checked_add(self.milliseconds.unwrap_or(0))
    }
}

impl TimeParser {
    /// Parse a time expression into a duration.
    ///
    /// Groups may appear in any order, separated by optional whitespace and
    /// matched case-insensitively. Text that belongs to no group is ignored,
    /// so `"5h garbage"` is five hours while `"5q"` is an error.
    pub fn parse_duration(&self, input: &str) -> Result<Duration, ConversionError> {
        let invalid = || ConversionError::InvalidTimeFormat {
            input: input.to_string(),
        };

        if input.trim().is_empty() {
            return Err(invalid());
        }

        let mut components = Components::default();
        for caps in COMPONENT.captures_iter(input) {
            let value: u64 = caps[1].parse().map_err(|_| invalid())?;
            let slot = match caps[2].to_ascii_lowercase().as_str() {
                "h" => &mut components.hours,
                "m" | "min" => &mut components.minutes,
                "s" => &mut components.seconds,
                _ => &mut components.milliseconds,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }

        if components.is_empty() {
            return Err(invalid());
        }

        let millis = components.total_millis().ok_or_else(invalid)?;
        Ok(Duration::from_millis(millis))
    }

    /// Format a duration the way ffmpeg accepts it: `HH:MM:SS.mmm`.
    ///
    /// Sub-millisecond remainders round up, so a non-zero duration never
    /// prints as zero.
    pub fn format_duration(&self, duration: Duration) -> String {
        let total_millis = duration.as_nanos().div_ceil(1_000_000);
        let total_seconds = total_millis / 1000;
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        let milliseconds = total_millis % 1000;

        format!(
            "{:02}:{:02}:{:02}.{:03}",
            hours, minutes, seconds, milliseconds
        )
    }
}
