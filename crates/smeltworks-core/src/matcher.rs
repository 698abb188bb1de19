//! Material matchers: predicates over material identity.
//!
//! A matcher describes which concrete materials qualify for an input or
//! output slot of a recipe. Matchers are compared structurally; the
//! canonical [`MaterialMatcher::key`] string is stable and totally ordered,
//! which the planner relies on for memoization and cycle detection.

use crate::id::{CategoryId, MaterialId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Errors raised when constructing a matcher.
#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("category matcher requires a non-empty category set")]
    EmptyCategorySet,
}

/// A predicate over material identity.
///
/// Category sets are `BTreeSet` so iteration order (and therefore the
/// canonical key) is independent of construction order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialMatcher {
    /// Matches every material.
    Any,
    /// Matches exactly one material id.
    Id(MaterialId),
    /// Matches a material carrying at least one of the categories.
    AnyOfCategories(BTreeSet<CategoryId>),
    /// Matches a material carrying every one of the categories.
    AllOfCategories(BTreeSet<CategoryId>),
}

impl MaterialMatcher {
    pub fn any() -> Self {
        MaterialMatcher::Any
    }

    pub fn id(material: MaterialId) -> Self {
        MaterialMatcher::Id(material)
    }

    /// Matcher for "at least one of these categories". Fails on an empty set.
    pub fn any_of(categories: impl IntoIterator<Item = CategoryId>) -> Result<Self, MatcherError> {
        let set: BTreeSet<CategoryId> = categories.into_iter().collect();
        if set.is_empty() {
            return Err(MatcherError::EmptyCategorySet);
        }
        Ok(MaterialMatcher::AnyOfCategories(set))
    }

    /// Matcher for "all of these categories". Fails on an empty set.
    pub fn all_of(categories: impl IntoIterator<Item = CategoryId>) -> Result<Self, MatcherError> {
        let set: BTreeSet<CategoryId> = categories.into_iter().collect();
        if set.is_empty() {
            return Err(MatcherError::EmptyCategorySet);
        }
        Ok(MaterialMatcher::AllOfCategories(set))
    }

    /// Ranking used to break ties between simultaneously eligible recipes.
    /// An exact id beats category constraints, which beat a wildcard.
    pub fn specificity(&self) -> u32 {
        match self {
            MaterialMatcher::Id(_) => 1000,
            MaterialMatcher::AllOfCategories(_) => 200,
            MaterialMatcher::AnyOfCategories(_) => 100,
            MaterialMatcher::Any => 0,
        }
    }

    /// Canonical structural key. Two matchers are interchangeable for
    /// planning purposes iff their keys are equal.
    pub fn key(&self) -> String {
        fn fmt_set(set: &BTreeSet<CategoryId>) -> String {
            let inner: Vec<String> = set.iter().map(|c| c.0.to_string()).collect();
            format!("{{{}}}", inner.join(","))
        }

        match self {
            MaterialMatcher::Any => "ANY".to_string(),
            MaterialMatcher::Id(m) => format!("ID:{}", m.0),
            MaterialMatcher::AnyOfCategories(set) => format!("CAT_ANY:{}", fmt_set(set)),
            MaterialMatcher::AllOfCategories(set) => format!("CAT_ALL:{}", fmt_set(set)),
        }
    }

    /// Evaluate against a concrete material. `categories` are the
    /// categories of that material (catalog lookup done by the caller).
    pub fn matches(&self, material: MaterialId, categories: &BTreeSet<CategoryId>) -> bool {
        match self {
            MaterialMatcher::Any => true,
            MaterialMatcher::Id(m) => *m == material,
            MaterialMatcher::AnyOfCategories(wanted) => {
                wanted.iter().any(|c| categories.contains(c))
            }
            MaterialMatcher::AllOfCategories(wanted) => {
                wanted.iter().all(|c| categories.contains(c))
            }
        }
    }

    /// Whether this matcher, as a producer's output, can satisfy `target`.
    ///
    /// `Any` covers everything; otherwise the matchers must be structurally
    /// equal. Category matchers are opaque here: no subset reasoning is
    /// attempted between them. Category-shaped goals go through the facade's
    /// target expansion instead.
    pub fn covers(&self, target: &MaterialMatcher) -> bool {
        matches!(self, MaterialMatcher::Any) || self == target
    }
}

impl fmt::Display for MaterialMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
