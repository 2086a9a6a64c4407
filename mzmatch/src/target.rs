use serde::{Deserialize, Serialize};

use crate::search::SearchError;

/// What to search against: one explicit target value, or an observed mass-to-charge
/// ratio with a set of selected charge states, each of which derives one target.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum TargetSpec {
    /// A single neutral target value.
    Single(f64),
    /// An observed m/z reference with the charge states to consider.
    MassOverCharge {
        /// The observed mass-to-charge ratio.
        reference: f64,
        /// The selected positive charge states, must not be empty.
        charges: Vec<u32>,
    },
}

/// One derived target for a single sub-run of the search.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    /// The value candidates are tested against.
    pub value: f64,
    /// Identifies which derivation produced this target (`z=2`), absent for a single
    /// explicit target.
    pub label: Option<String>,
}

impl TargetSpec {
    /// All targets this specification derives to. Each charge state `z` maps to the
    /// neutral value `reference * z - z` (the observed ratio scaled up, minus one charge
    /// carrier per charge).
    ///
    /// # Errors
    /// When in m/z mode without any charge state selected, as that is a usage error
    /// rather than a "no matches" outcome.
    pub fn targets(&self) -> Result<Vec<Target>, SearchError> {
        match self {
            Self::Single(value) => Ok(vec![Target {
                value: *value,
                label: None,
            }]),
            Self::MassOverCharge { reference, charges } => {
                if charges.is_empty() {
                    return Err(SearchError::NoChargeStates);
                }
                Ok(charges
                    .iter()
                    .map(|z| Target {
                        value: reference * f64::from(*z) - f64::from(*z),
                        label: Some(format!("z={z}")),
                    })
                    .collect())
            }
        }
    }
}
