use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A single in-tolerance combination found by the search engine.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Match {
    /// The number of arithmetic terms combined on top of the starting sum, the primary
    /// ranking key.
    pub steps: usize,
    /// The computed value of the combination.
    pub value: f64,
    /// The absolute deviation from the target, the secondary ranking key.
    pub error: f64,
    /// Human readable rendition of the operation, with operand values formatted to five
    /// decimals. For display only, the numeric operands live in [`Self::operands`].
    pub description: String,
    /// The signed modifier operands used in this combination. This is the structured
    /// source for name annotation, so that nothing has to be parsed back out of
    /// [`Self::description`].
    pub operands: Vec<f64>,
    /// The label of the derived target that produced this match, absent when the search
    /// ran against a single explicit target.
    pub target_label: Option<String>,
}

impl Match {
    /// The presentation order: ascending step count, then ascending absolute error. Use
    /// with a stable sort to keep ties in enumeration order.
    pub fn cmp_rank(&self, other: &Self) -> Ordering {
        self.steps
            .cmp(&other.steps)
            .then(self.error.total_cmp(&other.error))
    }
}
