//! Serde helpers for numeric form fields that clients may send as strings.
//!
//! Browser forms hand over input values as text, so `"12.5"` and `12.5` are
//! both accepted wherever a number is expected.

use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<N> {
    Number(N),
    Text(String),
}

/// Deserialize an optional number given either as a JSON number or a string.
///
/// Null and blank strings become `None`. A string that is not a number
/// becomes `NaN` so that range checks on the field reject it.
pub mod optional_number {
    use serde::{Deserialize, Deserializer};

    use super::NumberOrText;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<NumberOrText<f64>>::deserialize(deserializer)?;

        Ok(raw.and_then(|raw| match raw {
            NumberOrText::Number(number) => Some(number),
            NumberOrText::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(text.parse().unwrap_or(f64::NAN))
                }
            }
        }))
    }
}

/// Deserialize an optional integer ID given either as a JSON integer or a string.
///
/// Null, blank strings and strings that are not integers all become `None`,
/// which callers treat as a missing ID.
pub mod optional_id {
    use serde::{Deserialize, Deserializer};

    use super::NumberOrText;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<NumberOrText<i64>>::deserialize(deserializer)?;

        Ok(raw.and_then(|raw| match raw {
            NumberOrText::Number(id) => Some(id),
            NumberOrText::Text(text) => text.trim().parse().ok(),
        }))
    }
}
