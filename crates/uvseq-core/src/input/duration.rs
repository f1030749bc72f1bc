//! Digit-shift duration entry.
//!
//! The field always shows a complete `HH:MM:SS`. Each keystroke the text
//! widget reports is reduced to "a digit was added" or "something was
//! removed", and the six-digit register shifts accordingly:
//!
//! ```text
//! type 1  -> 000001    backspace -> 000012
//! type 2  -> 000012    backspace -> 000001
//! type 3  -> 000123
//! ```

use serde::{Deserialize, Serialize};

use crate::duration::{FixedDuration, DIGIT_COUNT};

/// Apply one raw edit of the text field to the current duration.
///
/// `raw` is whatever the widget now contains, punctuation included. Fewer
/// than six digits means a deletion: shift right, a zero enters on the
/// left. Otherwise the last digit typed enters on the right and the
/// leftmost digit falls off.
pub fn shift_duration(current: FixedDuration, raw: &str) -> FixedDuration {
    let typed: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let digits = current.digits();

    let next = if typed.len() < DIGIT_COUNT {
        format!("0{}", &digits[..DIGIT_COUNT - 1])
    } else {
        format!("{}{}", &digits[1..], &typed[typed.len() - 1..])
    };

    FixedDuration::from_digits(&next).unwrap_or(current)
}

/// Per-step duration register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationInput {
    value: FixedDuration,
}

impl DurationInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the raw text of the field after an edit.
    pub fn edit(&mut self, raw: &str) -> FixedDuration {
        self.value = shift_duration(self.value, raw);
        self.value
    }

    /// Type one digit at the end of the displayed value. Values above 9 are ignored.
    pub fn type_digit(&mut self, digit: u8) -> FixedDuration {
        if digit > 9 {
            return self.value;
        }
        let raw = format!("{}{}", self.display(), digit);
        self.edit(&raw)
    }

    /// Delete the last displayed character.
    pub fn backspace(&mut self) -> FixedDuration {
        let mut raw = self.display();
        raw.pop();
        self.edit(&raw)
    }

    /// Overwrite the register without shifting (preset load).
    pub fn set(&mut self, value: FixedDuration) {
        self.value = value;
    }

    pub fn clear(&mut self) {
        self.value = FixedDuration::ZERO;
    }

    pub fn value(&self) -> FixedDuration {
        self.value
    }

    /// Six-digit register contents, e.g. `"000123"`.
    pub fn raw_digits(&self) -> String {
        self.value.digits()
    }

    /// What the field shows, e.g. `"00:01:23"`.
    pub fn display(&self) -> String {
        self.value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn typing_shifts_left() {
        let mut input = DurationInput::new();
        assert_eq!(input.type_digit(1).digits(), "000001");
        assert_eq!(input.type_digit(2).digits(), "000012");
        assert_eq!(input.type_digit(3).digits(), "000123");
        assert_eq!(input.display(), "00:01:23");
    }

    #[test]
    fn backspace_shifts_zero_in_from_left() {
        let mut input = DurationInput::new();
        input.set(FixedDuration::from_digits("123456").unwrap());
        assert_eq!(input.backspace().digits(), "012345");
        assert_eq!(input.backspace().digits(), "001234");
    }

    #[test]
    fn seventh_digit_drops_the_oldest() {
        let mut input = DurationInput::new();
        for d in [1, 2, 3, 4, 5, 6, 7] {
            input.type_digit(d);
        }
        assert_eq!(input.raw_digits(), "234567");
    }

    #[test]
    fn non_digit_characters_are_stripped() {
        let current = FixedDuration::from_digits("000012").unwrap();
        assert_eq!(shift_duration(current, "00:00:12x9").digits(), "000129");
        // All six digits still present plus junk: treated as an append of the last digit.
        assert_eq!(shift_duration(current, "00:00:12x").digits(), "000122");
    }

    #[test]
    fn clearing_the_field_is_a_single_backspace() {
        let current = FixedDuration::from_digits("123456").unwrap();
        assert_eq!(shift_duration(current, "").digits(), "012345");
    }

    #[test]
    fn minutes_above_59_are_allowed() {
        let mut input = DurationInput::new();
        for d in [9, 9, 0, 0] {
            input.type_digit(d);
        }
        assert_eq!(input.display(), "00:99:00");
        assert_eq!(input.value().total_seconds(), 99 * 60);
    }

    #[test]
    fn out_of_range_digit_is_ignored() {
        let mut input = DurationInput::new();
        input.type_digit(12);
        assert_eq!(input.raw_digits(), "000000");
    }

    #[derive(Debug, Clone)]
    enum Key {
        Digit(u8),
        Backspace,
        Raw(String),
    }

    fn key() -> impl Strategy<Value = Key> {
        prop_oneof![
            (0u8..=9).prop_map(Key::Digit),
            Just(Key::Backspace),
            ".{0,12}".prop_map(Key::Raw),
        ]
    }

    proptest! {
        #[test]
        fn register_is_always_six_digits(keys in prop::collection::vec(key(), 0..40)) {
            let mut input = DurationInput::new();
            for k in keys {
                match k {
                    Key::Digit(d) => { input.type_digit(d); }
                    Key::Backspace => { input.backspace(); }
                    Key::Raw(raw) => { input.edit(&raw); }
                }
                let digits = input.raw_digits();
                prop_assert_eq!(digits.len(), 6);
                prop_assert!(digits.bytes().all(|b| b.is_ascii_digit()));
            }
        }
    }
}
