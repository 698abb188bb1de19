//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these
//! helpers are available to unit tests, integration tests and the planner
//! crate's benches (via the `test-utils` feature).

use crate::catalog::{Catalog, CatalogBuilder};
use crate::id::MaterialId;
use crate::matcher::MaterialMatcher;
use crate::recipe::{ProcessKind, Recipe};
use crate::selector::RecipeSelector;
use crate::time::{Seconds, TimeWindow};

pub fn secs(v: f64) -> Seconds {
    Seconds::from_num(v)
}

pub fn timed(min: f64, max: f64) -> ProcessKind {
    ProcessKind::Timed(TimeWindow::new(secs(min), secs(max)).unwrap())
}

pub fn manual(action: &str, required: f64) -> ProcessKind {
    ProcessKind::Manual {
        action: action.into(),
        required: secs(required),
    }
}

// ===========================================================================
// Forge fixture
// ===========================================================================

/// Material ids of the forge fixture catalog.
#[derive(Debug, Clone, Copy)]
pub struct ForgeIds {
    pub iron_ore: MaterialId,
    pub coal: MaterialId,
    pub oak_log: MaterialId,
    pub charcoal: MaterialId,
    pub oak_plank: MaterialId,
    pub wood_handle: MaterialId,
    pub iron_ingot: MaterialId,
    pub steel_ingot: MaterialId,
    pub steel_blade: MaterialId,
    pub steel_sword: MaterialId,
}

/// A small smithing production chain with two alternative steel routes
/// (coal-fired and charcoal-fired), used across the factory and planner
/// test suites.
///
/// Recipe costs: saw 1, handle 1, charcoal 1, smelt iron 2, steel via
/// coal 3, steel via charcoal 2, blade 3, sword 2.
pub fn forge_catalog() -> (Catalog, ForgeIds) {
    let mut b = CatalogBuilder::new();

    let metal = b.category("metal");
    let wood = b.category("wood");
    let fuel = b.category("fuel");

    let iron_ore = b.register_material("iron_ore", [metal]).unwrap();
    let coal = b.register_material("coal", [fuel]).unwrap();
    let oak_log = b.register_material("oak_log", [wood]).unwrap();
    let charcoal = b.register_material("charcoal", [fuel]).unwrap();
    let oak_plank = b.register_material("oak_plank", [wood]).unwrap();
    let wood_handle = b.register_material("wood_handle", [wood]).unwrap();
    let iron_ingot = b.register_material("iron_ingot", [metal]).unwrap();
    let steel_ingot = b.register_material("steel_ingot", [metal]).unwrap();
    let steel_blade = b.register_material("steel_blade", [metal]).unwrap();
    let steel_sword = b.register_material("steel_sword", []).unwrap();

    let woodworking = b.group("woodworking");
    let smelting = b.group("smelting");
    let smithing = b.group("smithing");

    b.register_factory("sawmill", [woodworking], 1).unwrap();
    b.register_factory("charcoal_pit", [woodworking], 1).unwrap();
    b.register_factory("furnace", [smelting], 1).unwrap();
    b.register_factory("blast_furnace", [smelting], 2).unwrap();
    b.register_factory("anvil", [smithing], 1).unwrap();
    b.register_factory("workbench", [], 1).unwrap();

    let in_group = |b: &mut CatalogBuilder, g| RecipeSelector::new().with_groups([b.group(g)]);

    let saw = in_group(&mut b, "woodworking");
    b.register_recipe(
        Recipe::new("saw_plank", timed(1.0, 3.0))
            .with_selector(saw)
            .with_inputs([MaterialMatcher::id(oak_log)])
            .with_outputs([MaterialMatcher::id(oak_plank)])
            .with_cost(1),
    )
    .unwrap();

    let carve = in_group(&mut b, "woodworking");
    b.register_recipe(
        Recipe::new("make_handle", timed(1.0, 2.0))
            .with_selector(carve)
            .with_inputs([MaterialMatcher::id(oak_plank)])
            .with_outputs([MaterialMatcher::id(wood_handle)])
            .with_cost(1),
    )
    .unwrap();

    let burn = in_group(&mut b, "woodworking");
    b.register_recipe(
        Recipe::new("make_charcoal", timed(4.0, 10.0))
            .with_selector(burn)
            .with_inputs([MaterialMatcher::id(oak_log)])
            .with_outputs([MaterialMatcher::id(charcoal)])
            .with_cost(1),
    )
    .unwrap();

    let smelt = in_group(&mut b, "smelting");
    b.register_recipe(
        Recipe::new("smelt_iron", timed(2.0, 5.0))
            .with_selector(smelt)
            .with_inputs([MaterialMatcher::id(iron_ore)])
            .with_outputs([MaterialMatcher::id(iron_ingot)])
            .with_cost(2),
    )
    .unwrap();

    let blast = RecipeSelector::new()
        .with_groups([b.group("smelting")])
        .with_min_level(2);
    b.register_recipe(
        Recipe::new("smelt_steel_coal", timed(3.0, 6.0))
            .with_selector(blast.clone())
            .with_inputs([MaterialMatcher::id(iron_ingot), MaterialMatcher::id(coal)])
            .with_outputs([MaterialMatcher::id(steel_ingot)])
            .with_cost(3),
    )
    .unwrap();
    b.register_recipe(
        Recipe::new("smelt_steel_charcoal", timed(3.0, 6.0))
            .with_selector(blast)
            .with_inputs([
                MaterialMatcher::id(iron_ingot),
                MaterialMatcher::id(charcoal),
            ])
            .with_outputs([MaterialMatcher::id(steel_ingot)])
            .with_cost(2),
    )
    .unwrap();

    let forge = in_group(&mut b, "smithing");
    b.register_recipe(
        Recipe::new("forge_blade", manual("hammer", 3.0))
            .with_selector(forge)
            .with_inputs([MaterialMatcher::id(steel_ingot)])
            .with_outputs([MaterialMatcher::id(steel_blade)])
            .with_cost(3),
    )
    .unwrap();

    b.register_recipe(
        Recipe::new("assemble_sword", timed(1.0, 4.0))
            .with_inputs([
                MaterialMatcher::id(steel_blade),
                MaterialMatcher::id(wood_handle),
            ])
            .with_outputs([MaterialMatcher::id(steel_sword)])
            .with_cost(2),
    )
    .unwrap();

    let ids = ForgeIds {
        iron_ore,
        coal,
        oak_log,
        charcoal,
        oak_plank,
        wood_handle,
        iron_ingot,
        steel_ingot,
        steel_blade,
        steel_sword,
    };
    (b.build().unwrap(), ids)
}
