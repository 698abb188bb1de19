//! Smeltworks Core -- materials, recipes and factory process sessions.
//!
//! This crate provides the building blocks a crafting simulation runs on:
//! material matchers, recipe selectors, an immutable recipe catalog, and
//! the per-facility process state machine that turns matched inputs into
//! outputs over a time window or under manual interaction.
//!
//! # Lifecycle
//!
//! 1. **Register** -- the embedding application assembles a
//!    [`catalog::CatalogBuilder`]: categories, materials, factory
//!    templates and recipes. Duplicate names fail here, dangling id
//!    references fail at `build()`.
//! 2. **Freeze** -- `build()` produces an immutable [`catalog::Catalog`],
//!    shared by reference across every factory instance and planner call.
//! 3. **Run** -- a [`world::ProductionWorld`] spawns factory instances
//!    (resolving each one's eligible recipe subset once via selector
//!    match) and drives them with a single logical tick per interval.
//!
//! # Key Types
//!
//! - [`matcher::MaterialMatcher`] -- predicate over material identity:
//!   exact id, wildcard, or category constraints.
//! - [`selector::RecipeSelector`] -- predicate over facility identity.
//! - [`recipe::Recipe`] -- immutable recipe data with a closed
//!   [`recipe::ProcessKind`] (timed window or manual accumulation).
//! - [`factory::Factory`] -- the Idle/Active session state machine.
//! - [`world::ProductionWorld`] -- catalog + instances + tick loop, and
//!   the place where output matchers become concrete materials.
//! - [`time::TimeWindow`] / [`time::Phase`] -- fixed-point session clock.

pub mod catalog;
pub mod event;
pub mod factory;
pub mod id;
pub mod material;
pub mod matcher;
pub mod recipe;
pub mod selector;
pub mod time;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
