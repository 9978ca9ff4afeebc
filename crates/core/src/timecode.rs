//! Timeline timecodes (`S`, `M:SS`, `H:MM:SS`, optional `.fff`).
//!
//! A [`Timecode`] is stored as whole milliseconds so comparisons are exact.
//! It serializes as its canonical string form, which always parses back to
//! the same value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum number of fractional-second digits accepted (millisecond precision).
pub const MAX_FRACTION_DIGITS: usize = 3;

const MS_PER_SECOND: u64 = 1_000;
const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimecodeError {
    #[error("timecode is empty")]
    Empty,

    #[error("invalid timecode '{0}': expected S, M:SS or H:MM:SS with optional .fff")]
    Malformed(String),

    #[error("invalid timecode '{input}': {field} must be below 60")]
    OutOfRange { input: String, field: &'static str },

    #[error("timecode '{0}' is too large")]
    Overflow(String),
}

/// A point on the video timeline with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timecode(u64);

impl Timecode {
    pub const ZERO: Timecode = Timecode(0);

    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(MS_PER_SECOND))
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / MS_PER_SECOND as f64
    }

    /// Parse a textual timecode.
    ///
    /// Accepts one to three `:`-separated components. Components after the
    /// first are one or two digits and must be below 60. An optional
    /// fractional part of up to three digits follows a `.`.
    pub fn parse(input: &str) -> Result<Self, TimecodeError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TimecodeError::Empty);
        }
        let malformed = || TimecodeError::Malformed(trimmed.to_string());
        let overflow = || TimecodeError::Overflow(trimmed.to_string());

        let (clock, fraction) = match trimmed.split_once('.') {
            Some((clock, fraction)) => (clock, Some(fraction)),
            None => (trimmed, None),
        };

        let fraction_ms = match fraction {
            None => 0,
            Some(f) => {
                if f.is_empty() || f.len() > MAX_FRACTION_DIGITS || !is_digits(f) {
                    return Err(malformed());
                }
                // Right-pad to milliseconds: ".5" is 500 ms.
                let padded = format!("{f:0<width$}", width = MAX_FRACTION_DIGITS);
                padded.parse::<u64>().map_err(|_| malformed())?
            }
        };

        let parts: Vec<&str> = clock.split(':').collect();
        if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| !is_digits(p)) {
            return Err(malformed());
        }
        if parts[1..].iter().any(|p| p.len() > 2) {
            return Err(malformed());
        }

        let mut values = Vec::with_capacity(parts.len());
        for part in &parts {
            values.push(part.parse::<u64>().map_err(|_| overflow())?);
        }

        let field_names: &[&'static str] = match values.len() {
            2 => &["minutes", "seconds"],
            3 => &["hours", "minutes", "seconds"],
            _ => &["seconds"],
        };
        for (value, field) in values.iter().zip(field_names).skip(1) {
            if *value >= SECONDS_PER_MINUTE {
                return Err(TimecodeError::OutOfRange {
                    input: trimmed.to_string(),
                    field: *field,
                });
            }
        }

        let total_secs = values
            .iter()
            .try_fold(0u64, |acc, v| acc.checked_mul(SECONDS_PER_MINUTE)?.checked_add(*v))
            .ok_or_else(overflow)?;

        total_secs
            .checked_mul(MS_PER_SECOND)
            .and_then(|ms| ms.checked_add(fraction_ms))
            .map(Timecode)
            .ok_or_else(overflow)
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.0 / MS_PER_SECOND;
        let millis = self.0 % MS_PER_SECOND;
        let hours = total_secs / SECONDS_PER_HOUR;
        let minutes = (total_secs % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
        let seconds = total_secs % SECONDS_PER_MINUTE;

        if hours > 0 {
            write!(f, "{hours}:{minutes:02}:{seconds:02}")?;
        } else {
            write!(f, "{minutes}:{seconds:02}")?;
        }
        if millis != 0 {
            write!(f, ".{millis:03}")?;
        }
        Ok(())
    }
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Timecode {
    type Error = TimecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Timecode> for String {
    fn from(value: Timecode) -> Self {
        value.to_string()
    }
}
