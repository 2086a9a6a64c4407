//! The combination search engine. One invocation takes all inputs as immutable values,
//! enumerates every enabled strategy against every derived target, and returns a fresh
//! ranked list of matches. No state survives the call.

mod fragment;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    Match, Target, TargetSpec, Tolerance,
    modifier::NormalizedModifiers,
};

/// The number of evaluated combinations between two progress reports.
pub const PROGRESS_BATCH: usize = 200;

/// The maximal number of values drawn for addition and subtraction combinations.
const MAX_COMBINATION_SIZE: usize = 3;

/// Which enumeration strategies to run, all independently selectable.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Strategies {
    /// The base sum alone (step count 0).
    pub base_only: bool,
    /// Multiset combinations of up to three addition values, drawn with replacement,
    /// added to the base sum.
    pub additions: bool,
    /// Combinations of up to three subtraction values, drawn without replacement over the
    /// positional sequence, subtracted from the base sum.
    pub subtractions: bool,
    /// Every (subtraction, addition) pair applied to the base sum, skipping pairs with
    /// exactly equal values.
    pub subtract_add: bool,
    /// Contiguous fragment sums of the base list, with optional modifiers and neighbor
    /// substitutions.
    pub fragment_substitution: bool,
}

impl Strategies {
    /// Every strategy enabled.
    pub const ALL: Self = Self {
        base_only: true,
        additions: true,
        subtractions: true,
        subtract_add: true,
        fragment_substitution: true,
    };

    /// No strategy enabled.
    pub const NONE: Self = Self {
        base_only: false,
        additions: false,
        subtractions: false,
        subtract_add: false,
        fragment_substitution: false,
    };

    /// Check whether at least one strategy is enabled.
    pub const fn any(self) -> bool {
        self.base_only
            || self.additions
            || self.subtractions
            || self.subtract_add
            || self.fragment_substitution
    }
}

impl Default for Strategies {
    fn default() -> Self {
        Self::ALL
    }
}

/// A search invocation that cannot produce any result because of how it was configured.
/// This is a usage error, distinct from an empty result list which is a valid "no
/// matches" outcome.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum SearchError {
    /// The base list holds no values, so there is no starting sum.
    #[error("the base list is empty")]
    EmptyBaseList,
    /// Every strategy is disabled, so nothing would be enumerated.
    #[error("no search strategy is enabled")]
    NoStrategies,
    /// The target is an m/z reference but no charge state is selected, so no target value
    /// can be derived.
    #[error("no charge state is selected")]
    NoChargeStates,
}

/// Run the search. See [`search_with_progress`] for the variant that reports progress.
///
/// # Errors
/// A [`SearchError`] when the invocation is configured such that it cannot produce any
/// result.
pub fn search(
    base: &[f64],
    modifiers: &NormalizedModifiers,
    target_spec: &TargetSpec,
    tolerance: Tolerance,
    strategies: Strategies,
) -> Result<Vec<Match>, SearchError> {
    search_with_progress(base, modifiers, target_spec, tolerance, strategies, |_| ())
}

/// Run every enabled strategy against every target derived from the specification and
/// collect all in-tolerance combinations, ranked by step count then absolute error
/// (stable for ties). The progress callback receives the cumulative number of evaluated
/// combinations after every [`PROGRESS_BATCH`] evaluations and once more on completion;
/// it has no effect on results or ordering.
///
/// # Errors
/// A [`SearchError`] when the invocation is configured such that it cannot produce any
/// result.
pub fn search_with_progress(
    base: &[f64],
    modifiers: &NormalizedModifiers,
    target_spec: &TargetSpec,
    tolerance: Tolerance,
    strategies: Strategies,
    mut progress: impl FnMut(usize),
) -> Result<Vec<Match>, SearchError> {
    if base.is_empty() {
        return Err(SearchError::EmptyBaseList);
    }
    if !strategies.any() {
        return Err(SearchError::NoStrategies);
    }
    let targets = target_spec.targets()?;

    let total: f64 = base.iter().sum();
    let mut matches = Vec::new();
    let mut evaluated = 0;
    for target in &targets {
        let mut run = Run {
            total,
            target,
            tolerance,
            matches: &mut matches,
            evaluated: &mut evaluated,
            progress: &mut progress,
        };
        if strategies.base_only {
            run.base_only();
        }
        if strategies.additions {
            run.additions(&modifiers.additions);
        }
        if strategies.subtractions {
            run.subtractions(&modifiers.subtractions);
        }
        if strategies.subtract_add {
            run.subtract_add(modifiers);
        }
        if strategies.fragment_substitution {
            fragment::run(&mut run, base, modifiers);
        }
    }
    progress(evaluated);

    matches.sort_by(Match::cmp_rank);
    Ok(matches)
}

/// The evaluation state for one target within one search invocation.
struct Run<'a> {
    total: f64,
    target: &'a Target,
    tolerance: Tolerance,
    matches: &'a mut Vec<Match>,
    evaluated: &'a mut usize,
    progress: &'a mut dyn FnMut(usize),
}

impl Run<'_> {
    /// Evaluate one candidate value: count it, report progress on batch boundaries, and
    /// record a match when it falls within tolerance of the target. The description is
    /// only rendered for actual matches.
    fn test(
        &mut self,
        value: f64,
        steps: usize,
        operands: &[f64],
        description: impl FnOnce() -> String,
    ) {
        *self.evaluated += 1;
        if *self.evaluated % PROGRESS_BATCH == 0 {
            (self.progress)(*self.evaluated);
        }
        if self.tolerance.within(self.target.value, value) {
            self.matches.push(Match {
                steps,
                value,
                error: (value - self.target.value).abs(),
                description: description(),
                operands: operands.to_vec(),
                target_label: self.target.label.clone(),
            });
        }
    }

    fn base_only(&mut self) {
        let total = self.total;
        self.test(total, 0, &[], || "base sum".to_string());
    }

    fn additions(&mut self, additions: &[f64]) {
        for r in 1..=MAX_COMBINATION_SIZE {
            for combo in additions.iter().copied().combinations_with_replacement(r) {
                let value = self.total + combo.iter().sum::<f64>();
                self.test(value, r, &combo, || format_terms(&combo));
            }
        }
    }

    fn subtractions(&mut self, subtractions: &[f64]) {
        for r in 1..=MAX_COMBINATION_SIZE {
            for combo in subtractions.iter().copied().combinations(r) {
                let value = self.total - combo.iter().sum::<f64>();
                let operands: Vec<f64> = combo.iter().map(|v| -v).collect();
                self.test(value, r, &operands, || format_terms(&operands));
            }
        }
    }

    fn subtract_add(&mut self, modifiers: &NormalizedModifiers) {
        for &sub in &modifiers.subtractions {
            for &add in &modifiers.additions {
                // Exactly equal pairs cancel out to the bare base sum and are skipped.
                if sub == add {
                    continue;
                }
                let operands = [-sub, add];
                self.test(self.total - sub + add, 2, &operands, || {
                    format_terms(&operands)
                });
            }
        }
    }
}

/// Format signed terms with an explicit sign and five decimals, `+1.00800 -18.01100`.
fn format_terms(terms: &[f64]) -> String {
    terms.iter().map(|term| format!("{term:+.5}")).join(" ")
}
