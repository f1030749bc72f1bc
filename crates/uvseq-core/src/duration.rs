//! Duration codec.
//!
//! Converts between the fixed-width `HH:MM:SS` representation used by the
//! operator form and the wire protocol, and a total-seconds integer used by
//! the sequencer.
//!
//! Fields are never range-checked: `"00:99:99"` is legal input and is worth
//! `99 * 60 + 99` seconds. Formatting always normalizes, so the two functions
//! only round-trip on text that [`format_duration`] produced.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DurationError;

/// Number of digits in the fixed-width numeral (`HHMMSS`).
pub const DIGIT_COUNT: usize = 6;

/// Parse `HH:MM:SS` or a six-digit numeral into total seconds.
///
/// Each colon-separated field may have any number of digits.
pub fn parse_duration(text: &str) -> Result<u64, DurationError> {
    let [hours, minutes, seconds] = split_fields(text)?;
    let field = |raw: &str| {
        raw.parse::<u64>().map_err(|_| DurationError::Field {
            input: text.to_string(),
            field: raw.to_string(),
        })
    };
    Ok(field(hours)?
        .saturating_mul(3600)
        .saturating_add(field(minutes)?.saturating_mul(60))
        .saturating_add(field(seconds)?))
}

/// Format total seconds as zero-padded `HH:MM:SS`.
///
/// Hours are not wrapped; 100 hours or more yields a wider hour field.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

fn split_fields(text: &str) -> Result<[&str; 3], DurationError> {
    let fields: Vec<&str> = if text.contains(':') {
        text.split(':').collect()
    } else if text.len() == DIGIT_COUNT && text.bytes().all(|b| b.is_ascii_digit()) {
        vec![&text[0..2], &text[2..4], &text[4..6]]
    } else {
        return Err(DurationError::Format(text.to_string()));
    };

    let &[hours, minutes, seconds] = fields.as_slice() else {
        return Err(DurationError::Format(text.to_string()));
    };
    for raw in [hours, minutes, seconds] {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DurationError::Field {
                input: text.to_string(),
                field: raw.to_string(),
            });
        }
    }
    Ok([hours, minutes, seconds])
}

/// A step duration as three two-digit fields.
///
/// This is what the digit-shift input produces and what a [`Step`] carries.
/// Minutes and seconds may exceed 59; see the module docs.
///
/// [`Step`]: crate::procedure::Step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FixedDuration {
    hours: u8,
    minutes: u8,
    seconds: u8,
}

impl FixedDuration {
    pub const ZERO: Self = Self {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Build from individual fields. Returns `None` if any field exceeds 99.
    pub fn new(hours: u8, minutes: u8, seconds: u8) -> Option<Self> {
        if hours > 99 || minutes > 99 || seconds > 99 {
            return None;
        }
        Some(Self {
            hours,
            minutes,
            seconds,
        })
    }

    /// Build from a six-digit `HHMMSS` numeral.
    pub fn from_digits(digits: &str) -> Result<Self, DurationError> {
        if digits.len() != DIGIT_COUNT || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DurationError::Format(digits.to_string()));
        }
        let pair = |i: usize| {
            let b = digits.as_bytes();
            (b[i] - b'0') * 10 + (b[i + 1] - b'0')
        };
        Ok(Self {
            hours: pair(0),
            minutes: pair(2),
            seconds: pair(4),
        })
    }

    /// The six-digit `HHMMSS` numeral.
    pub fn digits(&self) -> String {
        format!("{:02}{:02}{:02}", self.hours, self.minutes, self.seconds)
    }

    pub fn hours(&self) -> u8 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    /// `hours * 3600 + minutes * 60 + seconds`, without range normalization.
    pub fn total_seconds(&self) -> u64 {
        u64::from(self.hours) * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }

    pub fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }
}

impl fmt::Display for FixedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

impl FromStr for FixedDuration {
    type Err = DurationError;

    /// Accepts `HH:MM:SS` (one or two digits per field) or six digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let fields = split_fields(s)?;
        let mut parsed = [0u8; 3];
        for (slot, raw) in parsed.iter_mut().zip(fields) {
            if raw.len() > 2 {
                return Err(DurationError::FieldTooWide {
                    input: s.to_string(),
                    field: raw.to_string(),
                });
            }
            *slot = raw.parse().map_err(|_| DurationError::Field {
                input: s.to_string(),
                field: raw.to_string(),
            })?;
        }
        let [hours, minutes, seconds] = parsed;
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }
}

impl TryFrom<String> for FixedDuration {
    type Error = DurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FixedDuration> for String {
    fn from(value: FixedDuration) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_colon_form() {
        assert_eq!(parse_duration("01:05:30").unwrap(), 3600 + 5 * 60 + 30);
        assert_eq!(parse_duration("00:00:00").unwrap(), 0);
    }

    #[test]
    fn parse_six_digit_form() {
        assert_eq!(parse_duration("001234").unwrap(), 12 * 60 + 34);
    }

    #[test]
    fn parse_accepts_overflowing_fields_verbatim() {
        assert_eq!(parse_duration("00:99:99").unwrap(), 99 * 60 + 99);
        assert_eq!(parse_duration("999999").unwrap(), 99 * 3600 + 99 * 60 + 99);
        assert_eq!(parse_duration("100:00:00").unwrap(), 360_000);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(parse_duration("12:34"), Err(DurationError::Format(_))));
        assert!(matches!(parse_duration("12345"), Err(DurationError::Format(_))));
        assert!(matches!(
            parse_duration("00:-1:00"),
            Err(DurationError::Field { .. })
        ));
        assert!(matches!(parse_duration("00::00"), Err(DurationError::Field { .. })));
    }

    #[test]
    fn format_pads_and_normalizes() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(754), "00:12:34");
        assert_eq!(format_duration(99 * 60 + 99), "01:40:39");
        assert_eq!(format_duration(360_000), "100:00:00");
    }

    #[test]
    fn fixed_duration_from_digits() {
        let d = FixedDuration::from_digits("013059").unwrap();
        assert_eq!((d.hours(), d.minutes(), d.seconds()), (1, 30, 59));
        assert_eq!(d.to_string(), "01:30:59");
        assert_eq!(d.digits(), "013059");
        assert_eq!(d.total_seconds(), 5459);
        assert!(FixedDuration::from_digits("01305").is_err());
        assert!(FixedDuration::from_digits("01a059").is_err());
    }

    #[test]
    fn fixed_duration_from_str() {
        let d: FixedDuration = "0:5:7".parse().unwrap();
        assert_eq!(d.to_string(), "00:05:07");
        let d: FixedDuration = "000010".parse().unwrap();
        assert_eq!(d.total_seconds(), 10);
        assert!(matches!(
            "100:00:00".parse::<FixedDuration>(),
            Err(DurationError::FieldTooWide { .. })
        ));
    }

    #[test]
    fn fixed_duration_serde_uses_colon_text() {
        let d = FixedDuration::new(0, 1, 2).unwrap();
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"00:01:02\"");
        let back: FixedDuration = serde_json::from_str("\"00:01:02\"").unwrap();
        assert_eq!(back, d);
        assert!(serde_json::from_str::<FixedDuration>("\"soon\"").is_err());
    }

    #[test]
    fn fixed_duration_new_bounds() {
        assert!(FixedDuration::new(99, 99, 99).is_some());
        assert!(FixedDuration::new(100, 0, 0).is_none());
    }

    proptest! {
        #[test]
        fn format_then_parse_round_trips(secs in 0u64..=359_999) {
            let text = format_duration(secs);
            prop_assert_eq!(parse_duration(&text).unwrap(), secs);
            prop_assert_eq!(format_duration(parse_duration(&text).unwrap()), text);
        }

        #[test]
        fn digits_and_colon_forms_agree(h in 0u8..=99, m in 0u8..=99, s in 0u8..=99) {
            let d = FixedDuration::new(h, m, s).unwrap();
            prop_assert_eq!(parse_duration(&d.digits()).unwrap(), d.total_seconds());
            prop_assert_eq!(parse_duration(&d.to_string()).unwrap(), d.total_seconds());
        }
    }
}
