use std::sync::LazyLock;

use indexmap::IndexMap;
use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Match, Tolerance, modifier::strip_noise};

/// Known human readable names for modifier magnitudes, keyed by a signed or unsigned
/// numeric string. A signed key (`+x`, `-x`) only matches values of that sign, an
/// unsigned key matches by magnitude and the resolved name is prefixed with the sign of
/// the matched value. Insertion order determines resolution order.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NameMap(IndexMap<String, String>);

impl NameMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the name for a numeric-string key.
    pub fn insert(&mut self, number: impl Into<String>, name: impl Into<String>) {
        self.0.insert(number.into(), name.into());
    }

    /// Check if the map holds no names.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of names in the map.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A starter table of common small mass differences.
    pub fn default_names() -> Self {
        [
            ("-1.007", "Hydrogen loss"),
            ("1.008", "Hydrogen gain"),
            ("2.016", "Deuterium gain"),
            ("15.995", "Oxygen gain"),
            ("18.011", "Water loss"),
            ("17.003", "Ammonia loss"),
            ("14.003", "Nitrogen addition"),
            ("43.989", "CO2 loss"),
        ]
        .into_iter()
        .collect()
    }

    /// All names matching the given value within tolerance, deduplicated by resulting
    /// string, first occurrence order preserved. Unparseable keys are skipped, a NaN
    /// value matches nothing.
    pub fn resolve(&self, value: f64, tolerance: Tolerance) -> Vec<String> {
        if value.is_nan() {
            return Vec::new();
        }
        let mut names = Vec::new();
        for (key, name) in &self.0 {
            let key = strip_noise(key);
            if let Some(rest) = key.strip_prefix('+') {
                if let Ok(magnitude) = rest.parse::<f64>() {
                    if tolerance.within(magnitude, value) {
                        names.push(name.clone());
                    }
                }
            } else if let Some(rest) = key.strip_prefix('-') {
                if let Ok(magnitude) = rest.parse::<f64>() {
                    if tolerance.within(-magnitude, value) {
                        names.push(name.clone());
                    }
                }
            } else if let Ok(magnitude) = key.parse::<f64>() {
                if tolerance.within(magnitude.abs(), value.abs()) {
                    let sign = if value >= 0.0 { '+' } else { '-' };
                    names.push(format!("{sign}{name}"));
                }
            }
        }
        names.into_iter().unique().collect()
    }

    /// Resolve every operand of a match, deduplicated over the whole record. This
    /// consumes the structured operand list, not the description text.
    pub fn annotate(&self, found: &Match, tolerance: Tolerance) -> Vec<String> {
        found
            .operands
            .iter()
            .flat_map(|operand| self.resolve(*operand, tolerance))
            .unique()
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NameMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

static NUMERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("invalid numeral regex"));

/// Extract every numeral in a description and recover its intended sign from the
/// preceding text: a directly preceding `-` (after whitespace) negates, a preceding
/// parenthesis defers to the sign one character further back. This tolerates any
/// description format the engine produces, but it is a display compatibility path only,
/// [`Match::operands`] is the structured source for annotation.
pub fn extract_signed_numbers(description: &str) -> Vec<f64> {
    NUMERAL
        .find_iter(description)
        .filter_map(|found| {
            let value: f64 = found.as_str().parse().ok()?;
            Some(preceding_sign(&description[..found.start()]) * value)
        })
        .collect()
}

/// The sign implied by the characters directly before a numeral.
fn preceding_sign(prefix: &str) -> f64 {
    let mut before = prefix.chars().rev().skip_while(|c| c.is_whitespace());
    match before.next() {
        Some('-') => -1.0,
        Some('(' | ')') => match before.find(|c| !c.is_whitespace()) {
            Some('-') => -1.0,
            _ => 1.0,
        },
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_key_matches_sign_and_magnitude() {
        let names: NameMap = [("-1.007", "Hydrogen loss")].into_iter().collect();
        let tolerance = Tolerance::new_absolute(0.01);
        assert_eq!(names.resolve(-1.006, tolerance), vec!["Hydrogen loss"]);
        assert!(names.resolve(1.006, tolerance).is_empty());
    }

    #[test]
    fn unsigned_key_matches_magnitude_and_directs_the_sign() {
        let names: NameMap = [("1.008", "Hydrogen")].into_iter().collect();
        let tolerance = Tolerance::new_absolute(0.01);
        assert_eq!(names.resolve(-1.007, tolerance), vec!["-Hydrogen"]);
        assert_eq!(names.resolve(1.009, tolerance), vec!["+Hydrogen"]);
    }

    #[test]
    fn all_matches_are_returned_deduplicated_in_order() {
        let names: NameMap = [
            ("18.011", "Water loss"),
            ("18.012", "Water loss"),
            ("18.010", "Condensation"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            names.resolve(18.011, Tolerance::new_absolute(0.01)),
            vec!["+Water loss", "+Condensation"]
        );
    }

    #[test]
    fn unparseable_keys_are_skipped() {
        let names: NameMap = [("water", "Water loss"), ("18.011", "Water loss")]
            .into_iter()
            .collect();
        assert_eq!(
            names.resolve(18.011, Tolerance::new_absolute(0.01)),
            vec!["+Water loss"]
        );
    }

    #[test]
    fn annotate_uses_the_operands() {
        let names = NameMap::default_names();
        let found = Match {
            steps: 2,
            value: 83.0,
            error: 0.0,
            description: "-18.01100 +1.00800".to_string(),
            operands: vec![-18.011, 1.008],
            target_label: None,
        };
        assert_eq!(
            names.annotate(&found, Tolerance::new_absolute(0.001)),
            vec!["-Water loss", "+Hydrogen gain"]
        );
    }

    #[test]
    fn extraction_recovers_signs() {
        assert_eq!(
            extract_signed_numbers("-18.01100 +1.00800"),
            vec![-18.011, 1.008]
        );
        // A parenthesis defers to the sign behind it, a comma does not carry one.
        assert_eq!(
            extract_signed_numbers("- (18.011, 1.008)"),
            vec![-18.011, 1.008]
        );
        assert_eq!(extract_signed_numbers("base sum"), Vec::<f64>::new());
    }

    #[test]
    fn extraction_matches_engine_descriptions() {
        assert_eq!(
            extract_signed_numbers("fragment 2-4 +1.50000"),
            vec![2.0, -4.0, 1.5]
        );
    }
}
