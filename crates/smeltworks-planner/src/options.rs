//! Search limits.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanOptionsError {
    #[error("max_depth must be at least 1")]
    ZeroDepth,
    #[error("max_plans must be at least 1")]
    ZeroPlans,
}

/// Limits applied to a single planning call.
///
/// `max_depth` bounds recipe-chain nesting inclusively: the root target
/// sits at depth 0, so `max_depth = 1` still admits a single-recipe
/// chain whose input resolves at depth 1. `max_plans` bounds the total
/// number of candidate plans constructed (the search budget), and
/// `deduplicate` collapses structurally identical candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOptions {
    max_depth: u32,
    max_plans: u32,
    deduplicate: bool,
}

impl PlanOptions {
    pub fn new(max_depth: u32, max_plans: u32, deduplicate: bool) -> Result<Self, PlanOptionsError> {
        if max_depth == 0 {
            return Err(PlanOptionsError::ZeroDepth);
        }
        if max_plans == 0 {
            return Err(PlanOptionsError::ZeroPlans);
        }
        Ok(Self {
            max_depth,
            max_plans,
            deduplicate,
        })
    }

    /// Defaults sized for interactive use: depth 16, budget 5000, dedup on.
    pub fn safe_defaults() -> Self {
        Self {
            max_depth: 16,
            max_plans: 5000,
            deduplicate: true,
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn max_plans(&self) -> u32 {
        self.max_plans
    }

    pub fn deduplicate(&self) -> bool {
        self.deduplicate
    }
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self::safe_defaults()
    }
}
