use serde::{Deserialize, Serialize};

/// One raw modifier entry as provided by the caller. Stored modifier lists mix plain
/// numbers with variously formatted strings, so this deserialises from either form.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModifierEntry {
    /// A plain number, usable as both addition and subtraction when non-negative.
    Number(f64),
    /// A textual entry: `+x` is addition only, `-x` is subtraction only, an unsigned
    /// numeric string is usable as both. Anything unparseable is silently dropped.
    Text(String),
}

impl From<f64> for ModifierEntry {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ModifierEntry {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ModifierEntry {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// The clean numeric collections derived from a raw modifier list. Duplicates are
/// preserved, they affect combination counts.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct NormalizedModifiers {
    /// Non-negative values usable as additions.
    pub additions: Vec<f64>,
    /// Non-negative values usable as subtractions.
    pub subtractions: Vec<f64>,
}

impl NormalizedModifiers {
    /// Check if both collections are empty.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.subtractions.is_empty()
    }

    fn push_unsigned(&mut self, value: f64) {
        if value >= 0.0 {
            self.additions.push(value);
            self.subtractions.push(value);
        } else {
            self.subtractions.push(value.abs());
        }
    }
}

/// Split a raw modifier list into addition and subtraction values.
///
/// Entries are parsed after stripping surrounding quote/whitespace noise (storage round
/// trips tend to leave both behind). A `+` prefix selects the addition bucket, a `-`
/// prefix the subtraction bucket, both using the absolute value. Unsigned entries land in
/// both buckets, except that a negative parsed value defensively goes to subtractions
/// only. Unparseable entries are skipped, this function never fails.
pub fn normalize(entries: &[ModifierEntry]) -> NormalizedModifiers {
    let mut normalized = NormalizedModifiers::default();
    for entry in entries {
        match entry {
            ModifierEntry::Number(value) => normalized.push_unsigned(*value),
            ModifierEntry::Text(text) => {
                let token = strip_noise(text);
                if let Some(rest) = token.strip_prefix('+') {
                    if let Ok(value) = rest.trim().parse::<f64>() {
                        normalized.additions.push(value.abs());
                    }
                } else if let Some(rest) = token.strip_prefix('-') {
                    if let Ok(value) = rest.trim().parse::<f64>() {
                        normalized.subtractions.push(value.abs());
                    }
                } else if let Ok(value) = token.parse::<f64>() {
                    normalized.push_unsigned(value);
                }
            }
        }
    }
    normalized
}

/// Strip surrounding whitespace and quote characters from a stored token.
pub(crate) fn strip_noise(text: &str) -> &str {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
}
