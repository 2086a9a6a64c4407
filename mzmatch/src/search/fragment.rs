//! Fragment and neighbor substitution enumeration. Fragments are contiguous index ranges
//! of the base list, summed via prefix sums, optionally adjusted by one or two signed
//! modifiers and/or by replacing one element's contribution with a neighboring value.

use std::collections::HashSet;

use ordered_float::OrderedFloat;

use super::{Run, format_terms};
use crate::modifier::NormalizedModifiers;

/// Neighbor values closer than this are considered equal and produce no substitution.
const SUBSTITUTION_EPSILON: f64 = 1e-9;

pub(super) fn run(state: &mut Run<'_>, base: &[f64], modifiers: &NormalizedModifiers) {
    let sums = PrefixSums::new(base);
    let signed = signed_modifiers(base, modifiers);
    let n = base.len();

    for start in 0..n {
        for end in start + 1..=n {
            let fragment = sums.sum(start, end);
            // 1-based, inclusive-exclusive shown as start-end.
            let range = move || format!("fragment {}-{}", start + 1, end + 1);

            state.test(fragment, 0, &[], range);
            with_modifiers(state, fragment, 0, &signed, &range);

            for k in start..end {
                for neighbor in [k.checked_sub(1), (k + 1 < n).then_some(k + 1)]
                    .into_iter()
                    .flatten()
                {
                    if (base[k] - base[neighbor]).abs() <= SUBSTITUTION_EPSILON {
                        continue;
                    }
                    let substituted = fragment - base[k] + base[neighbor];
                    let substitution = move || {
                        format!(
                            "{} ({}: {:.5} -> {:.5})",
                            range(),
                            k + 1,
                            base[k],
                            base[neighbor]
                        )
                    };
                    state.test(substituted, 1, &[], substitution);
                    with_modifiers(state, substituted, 1, &signed, &substitution);
                }
            }
        }
    }
}

/// Test a starting value combined with one signed modifier, then with every unordered
/// pair of signed modifiers (with repetition).
fn with_modifiers(
    state: &mut Run<'_>,
    value: f64,
    base_steps: usize,
    signed: &[f64],
    prefix: &impl Fn() -> String,
) {
    for &modifier in signed {
        let operands = [modifier];
        state.test(value + modifier, base_steps + 1, &operands, || {
            format!("{} {}", prefix(), format_terms(&operands))
        });
    }
    for (i, &first) in signed.iter().enumerate() {
        for &second in &signed[i..] {
            let operands = [first, second];
            state.test(value + first + second, base_steps + 2, &operands, || {
                format!("{} {}", prefix(), format_terms(&operands))
            });
        }
    }
}

/// The deduplicated signed modifiers used for fragment adjustment: `+v` for every
/// addition value and `-v` for every subtraction value, excluding magnitudes already
/// present in the base list and collapsing duplicate (sign, magnitude) pairs to their
/// first occurrence. Magnitudes are compared after rounding to six decimals.
fn signed_modifiers(base: &[f64], modifiers: &NormalizedModifiers) -> Vec<f64> {
    let base_values: HashSet<OrderedFloat<f64>> =
        base.iter().map(|value| rounded(*value)).collect();
    let mut seen: HashSet<(bool, OrderedFloat<f64>)> = HashSet::new();
    let mut signed = Vec::new();
    for &value in &modifiers.additions {
        let magnitude = rounded(value.abs());
        if !base_values.contains(&magnitude) && seen.insert((true, magnitude)) {
            signed.push(value.abs());
        }
    }
    for &value in &modifiers.subtractions {
        let magnitude = rounded(value.abs());
        if !base_values.contains(&magnitude) && seen.insert((false, magnitude)) {
            signed.push(-value.abs());
        }
    }
    signed
}

/// The value rounded to six decimals, in a hashable form.
fn rounded(value: f64) -> OrderedFloat<f64> {
    OrderedFloat((value * 1e6).round() / 1e6)
}

/// Sums of contiguous ranges of the base list in constant time per lookup.
struct PrefixSums {
    prefix: Vec<f64>,
}

impl PrefixSums {
    fn new(base: &[f64]) -> Self {
        let mut prefix = Vec::with_capacity(base.len() + 1);
        prefix.push(0.0);
        let mut sum = 0.0;
        for value in base {
            sum += value;
            prefix.push(sum);
        }
        Self { prefix }
    }

    /// The sum of `base[start..end]`.
    fn sum(&self, start: usize, end: usize) -> f64 {
        self.prefix[end] - self.prefix[start]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Match, TargetSpec, Tolerance,
        search::{Strategies, search},
    };

    fn fragments(base: &[f64], modifiers: &NormalizedModifiers, target: f64) -> Vec<Match> {
        search(
            base,
            modifiers,
            &TargetSpec::Single(target),
            Tolerance::new_absolute(0.001),
            Strategies {
                fragment_substitution: true,
                ..Strategies::NONE
            },
        )
        .unwrap()
    }

    #[test]
    fn fragment_ranges_are_contiguous_and_one_based() {
        let base = [10.0, 20.0, 30.0];
        let none = NormalizedModifiers::default();

        // Substitutions can land on the same value, the plain fragment ranks first.
        let matches = fragments(&base, &none, 10.0);
        assert_eq!(matches[0].description, "fragment 1-2");
        assert_eq!(matches[0].steps, 0);

        let matches = fragments(&base, &none, 20.0);
        assert_eq!(matches[0].description, "fragment 2-3");
        assert_eq!(matches[0].steps, 0);

        // 10 + 20, not the non-contiguous 10 + 30.
        let matches = fragments(&base, &none, 30.0);
        assert_eq!(
            matches.iter().map(|m| m.description.as_str()).collect::<Vec<_>>(),
            vec!["fragment 1-3", "fragment 3-4"]
        );
    }

    #[test]
    fn fragment_with_one_modifier() {
        let base = [10.0, 20.0, 30.0];
        let modifiers = NormalizedModifiers {
            additions: vec![1.5],
            subtractions: Vec::new(),
        };
        let matches = fragments(&base, &modifiers, 31.5);
        assert!(
            matches
                .iter()
                .any(|m| m.description == "fragment 1-3 +1.50000"
                    && m.steps == 1
                    && m.operands == vec![1.5])
        );
    }

    #[test]
    fn fragment_with_a_modifier_pair_with_repetition() {
        let base = [10.0];
        let modifiers = NormalizedModifiers {
            additions: vec![1.5],
            subtractions: Vec::new(),
        };
        let matches = fragments(&base, &modifiers, 13.0);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].description, "fragment 1-2 +1.50000 +1.50000");
        assert_eq!(matches[0].steps, 2);
        assert_eq!(matches[0].operands, vec![1.5, 1.5]);
    }

    #[test]
    fn neighbor_substitution() {
        let base = [10.0, 20.0, 30.0];
        let none = NormalizedModifiers::default();
        // Fragment [0, 2) with the 20 replaced by its right neighbor 30: 10 + 30 = 40.
        let matches = fragments(&base, &none, 40.0);
        assert!(
            matches
                .iter()
                .any(|m| m.description == "fragment 1-3 (2: 20.00000 -> 30.00000)"
                    && m.steps == 1)
        );
    }

    #[test]
    fn substitution_with_modifiers_counts_all_terms() {
        let base = [10.0, 20.0, 30.0];
        let modifiers = NormalizedModifiers {
            additions: Vec::new(),
            subtractions: vec![1.5],
        };
        // 10 + 30 - 1.5 - 1.5 = 37.0, a substitution plus a modifier pair.
        let matches = fragments(&base, &modifiers, 37.0);
        assert!(matches.iter().any(|m| m.steps == 3
            && m.operands == vec![-1.5, -1.5]
            && m.description == "fragment 1-3 (2: 20.00000 -> 30.00000) -1.50000 -1.50000"));
    }

    #[test]
    fn equal_neighbors_produce_no_substitution() {
        let base = [10.0, 10.0];
        let none = NormalizedModifiers::default();
        // A substitution of equal values would duplicate the plain fragment at 10.0.
        let matches = fragments(&base, &none, 10.0);
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.steps == 0));
    }

    #[test]
    fn modifier_magnitudes_matching_base_values_are_excluded() {
        let base = [10.0, 20.0];
        let modifiers = NormalizedModifiers {
            additions: vec![10.0, 1.5, 1.5000001],
            subtractions: vec![1.5],
        };
        let signed = signed_modifiers(&base, &modifiers);
        // 10.0 collides with a base value; 1.5000001 rounds to 1.5 which is already seen.
        assert_eq!(signed, vec![1.5, -1.5]);
    }

    #[test]
    fn prefix_sums() {
        let sums = PrefixSums::new(&[10.0, 20.0, 30.0]);
        assert_eq!(sums.sum(0, 1), 10.0);
        assert_eq!(sums.sum(1, 2), 20.0);
        assert_eq!(sums.sum(0, 3), 60.0);
        assert_eq!(sums.sum(2, 2), 0.0);
    }
}
