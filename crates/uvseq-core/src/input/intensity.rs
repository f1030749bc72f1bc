//! Bounded intensity entry (0..=100).
//!
//! Typing that would overflow is discarded rather than clamped, so the
//! field keeps its last legal value.

use serde::{Deserialize, Serialize};

pub const MAX_INTENSITY: u8 = 100;

/// Apply one raw edit of the text field to the current intensity.
///
/// A lone typed digit is covered by the last-three-digits rule, so a field
/// sitting at `0` does not accumulate leading zeros.
pub fn edit_intensity(current: u8, raw: &str) -> u8 {
    let current = current.min(MAX_INTENSITY);
    let typed: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if typed.is_empty() {
        return 0;
    }

    let tail = &typed[typed.len().saturating_sub(3)..];
    let value: u16 = tail.parse().unwrap_or(0);

    if current == MAX_INTENSITY && typed.len() > 3 {
        MAX_INTENSITY
    } else if value > u16::from(MAX_INTENSITY) {
        current
    } else {
        value as u8
    }
}

/// Per-step intensity field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntensityInput {
    value: u8,
}

impl IntensityInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edit(&mut self, raw: &str) -> u8 {
        self.value = edit_intensity(self.value, raw);
        self.value
    }

    /// Type one digit after the displayed value. Values above 9 are ignored.
    pub fn type_digit(&mut self, digit: u8) -> u8 {
        if digit > 9 {
            return self.value;
        }
        let raw = format!("{}{}", self.value, digit);
        self.edit(&raw)
    }

    pub fn backspace(&mut self) -> u8 {
        let mut raw = self.value.to_string();
        raw.pop();
        self.edit(&raw)
    }

    /// Overwrite without edit rules (preset load). Saturates at 100.
    pub fn set(&mut self, value: u8) {
        self.value = value.min(MAX_INTENSITY);
    }

    pub fn clear(&mut self) {
        self.value = 0;
    }

    pub fn value(&self) -> u8 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn typing_200_from_zero_stops_at_20() {
        let mut input = IntensityInput::new();
        assert_eq!(input.type_digit(2), 2);
        assert_eq!(input.type_digit(0), 20);
        assert_eq!(input.type_digit(0), 20);
    }

    #[test]
    fn typing_150_rejects_the_trailing_zero() {
        let mut input = IntensityInput::new();
        input.type_digit(1);
        input.type_digit(5);
        assert_eq!(input.type_digit(0), 15);
    }

    #[test]
    fn hundred_is_reachable_and_sticky() {
        let mut input = IntensityInput::new();
        for d in [1, 0, 0] {
            input.type_digit(d);
        }
        assert_eq!(input.value(), 100);
        assert_eq!(input.type_digit(7), 100);
        assert_eq!(edit_intensity(100, "1000"), 100);
    }

    #[test]
    fn empty_field_means_zero() {
        assert_eq!(edit_intensity(42, ""), 0);
        assert_eq!(edit_intensity(42, "abc"), 0);
    }

    #[test]
    fn backspace_drops_last_digit() {
        let mut input = IntensityInput::new();
        input.set(85);
        assert_eq!(input.backspace(), 8);
        assert_eq!(input.backspace(), 0);
        assert_eq!(input.backspace(), 0);
    }

    #[test]
    fn uses_only_last_three_digits() {
        assert_eq!(edit_intensity(12, "0012"), 12);
        assert_eq!(edit_intensity(5, "99050"), 50);
    }

    #[test]
    fn zero_field_takes_single_digit() {
        assert_eq!(edit_intensity(0, "7"), 7);
        assert_eq!(edit_intensity(0, "07"), 7);
    }

    #[test]
    fn set_saturates() {
        let mut input = IntensityInput::new();
        input.set(250);
        assert_eq!(input.value(), 100);
    }

    proptest! {
        #[test]
        fn value_stays_in_range(start in 0u8..=100, edits in prop::collection::vec(".{0,6}", 0..30)) {
            let mut value = start;
            for raw in edits {
                value = edit_intensity(value, &raw);
                prop_assert!(value <= MAX_INTENSITY);
            }
        }

        #[test]
        fn digit_keystrokes_stay_in_range(digits in prop::collection::vec(0u8..=12, 0..30)) {
            let mut input = IntensityInput::new();
            for d in digits {
                input.type_digit(d);
                prop_assert!(input.value() <= MAX_INTENSITY);
            }
        }
    }
}
