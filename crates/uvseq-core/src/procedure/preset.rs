//! Recipe presets.
//!
//! A preset is a flat record as it appears in configuration:
//!
//! ```toml
//! [presets.standard_cure]
//! procedure = "Standard Cure"
//! step_1_time = "00:01:00"
//! step_1_value = 50
//! ```
//!
//! with one `step_N_time` / `step_N_value` pair per form slot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::duration::FixedDuration;
use crate::error::PresetError;
use crate::input::MAX_INTENSITY;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PresetField {
    Text(String),
    Number(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Display name shown to the operator.
    pub procedure: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, PresetField>,
}

impl Preset {
    /// Build a preset record from step pairs, numbering from 1.
    pub fn from_steps(display_name: &str, steps: &[(FixedDuration, u8)]) -> Self {
        let mut fields = BTreeMap::new();
        for (i, (duration, intensity)) in steps.iter().enumerate() {
            let n = i + 1;
            fields.insert(
                format!("step_{n}_time"),
                PresetField::Text(duration.to_string()),
            );
            fields.insert(
                format!("step_{n}_value"),
                PresetField::Number(i64::from(*intensity)),
            );
        }
        Self {
            procedure: display_name.to_string(),
            fields,
        }
    }

    /// Decode the first `count` step pairs. `key` only labels errors.
    pub fn steps(&self, key: &str, count: usize) -> Result<Vec<(FixedDuration, u8)>, PresetError> {
        (1..=count)
            .map(|n| Ok((self.time(key, n)?, self.value(key, n)?)))
            .collect()
    }

    fn field(&self, key: &str, name: &str) -> Result<&PresetField, PresetError> {
        self.fields.get(name).ok_or_else(|| PresetError::MissingField {
            preset: key.to_string(),
            field: name.to_string(),
        })
    }

    fn time(&self, key: &str, n: usize) -> Result<FixedDuration, PresetError> {
        let name = format!("step_{n}_time");
        let invalid = |message: String| PresetError::InvalidField {
            preset: key.to_string(),
            field: name.clone(),
            message,
        };
        match self.field(key, &name)? {
            PresetField::Text(text) => text.parse().map_err(|e| invalid(format!("{e}"))),
            PresetField::Number(_) => Err(invalid("expected \"HH:MM:SS\" text".into())),
        }
    }

    fn value(&self, key: &str, n: usize) -> Result<u8, PresetError> {
        let name = format!("step_{n}_value");
        match self.field(key, &name)? {
            PresetField::Number(v) if (0..=i64::from(MAX_INTENSITY)).contains(v) => Ok(*v as u8),
            other => Err(PresetError::InvalidField {
                preset: key.to_string(),
                field: name,
                message: format!("expected an integer 0-{MAX_INTENSITY}, got {other:?}"),
            }),
        }
    }
}

/// Presets shipped in a fresh configuration.
pub fn builtin_presets() -> BTreeMap<String, Preset> {
    let d = |h, m, s| FixedDuration::new(h, m, s).unwrap_or_default();
    let zero = (FixedDuration::ZERO, 0);
    BTreeMap::from([
        (
            "standard_cure".to_string(),
            Preset::from_steps(
                "Standard Cure",
                &[
                    (d(0, 1, 0), 50),
                    (d(0, 0, 30), 80),
                    (d(0, 0, 30), 100),
                    zero,
                    zero,
                ],
            ),
        ),
        (
            "gentle_ramp".to_string(),
            Preset::from_steps(
                "Gentle Ramp",
                &[
                    (d(0, 2, 0), 20),
                    (d(0, 2, 0), 40),
                    (d(0, 2, 0), 60),
                    (d(0, 2, 0), 80),
                    (d(0, 1, 0), 100),
                ],
            ),
        ),
        (
            "sterilize".to_string(),
            Preset::from_steps("Sterilize", &[(d(0, 15, 0), 100), zero, zero, zero, zero]),
        ),
    ])
}
