//! Smeltworks Planner -- backward-chaining crafting route search.
//!
//! Given a frozen [`smeltworks_core::catalog::Catalog`], a target matcher
//! and a set of already-available matchers, this crate answers three
//! questions at increasing cost: the single cheapest crafting chain, the
//! `k` cheapest chains, or every distinct chain discoverable within the
//! configured limits.
//!
//! # Key Types
//!
//! - [`planner::CraftPlanner`] -- the search itself, one matcher target
//!   per call. Unreachable targets come back as the impossible sentinel,
//!   never as an error.
//! - [`facade::PlannerFacade`] -- goal-level wrapper that expands
//!   category goals into concrete materials and merges their routes.
//! - [`plan::Plan`] / [`plan::PlanNode`] -- the resulting tree, with a
//!   derived dependency-ordered step list.
//! - [`options::PlanOptions`] -- depth limit, candidate budget and
//!   deduplication toggle.
//!
//! Enable the `parallel` feature to fan goal expansion out across a
//! rayon thread pool; each concrete target still runs an independent
//! search with its own memo table and budget.

pub mod facade;
pub mod options;
pub mod plan;
pub mod planner;

pub use facade::PlannerFacade;
pub use options::{PlanOptions, PlanOptionsError};
pub use plan::{Cost, Plan, PlanNode, PlanStep, IMPOSSIBLE_COST};
pub use planner::CraftPlanner;
