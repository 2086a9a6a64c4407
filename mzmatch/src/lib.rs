#![doc = include_str!("../README.md")]

/// Raw modifier entries and their normalisation into addition/subtraction values.
pub mod modifier;
/// Human readable names for modifier magnitudes and numeric token extraction.
pub mod names;
mod result;
/// The combination search engine and its strategy selection.
pub mod search;
mod target;
mod tolerance;

pub use result::Match;
pub use target::{Target, TargetSpec};
pub use tolerance::Tolerance;

/// A subset of the types and functions that are envisioned to be used the most, importing this is a good starting point for working with the crate
pub mod prelude {
    pub use crate::modifier::{ModifierEntry, NormalizedModifiers, normalize};
    pub use crate::names::NameMap;
    pub use crate::search::{SearchError, Strategies, search, search_with_progress};
    pub use crate::{Match, Target, TargetSpec, Tolerance};
}
