//! Property tests over the forge fixture: cost accounting, ordering and
//! availability invariants must hold for every target/availability
//! combination, not just the handpicked scenarios.

use std::sync::Arc;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use smeltworks_core::catalog::Catalog;
use smeltworks_core::id::MaterialId;
use smeltworks_core::matcher::MaterialMatcher;
use smeltworks_core::test_utils::{forge_catalog, ForgeIds};
use smeltworks_planner::{CraftPlanner, PlanNode, PlanOptions};

/// No target repeats along any root-to-leaf path, so the tree encodes an
/// acyclic dependency chain.
fn assert_acyclic(node: &PlanNode, trail: &mut Vec<String>) -> Result<(), TestCaseError> {
    let key = node.target().key();
    prop_assert!(!trail.contains(&key));
    if let PlanNode::Craft { children, .. } = node {
        trail.push(key);
        for child in children {
            assert_acyclic(child, trail)?;
        }
        trail.pop();
    }
    Ok(())
}

fn all_materials(ids: &ForgeIds) -> [MaterialId; 10] {
    [
        ids.iron_ore,
        ids.coal,
        ids.oak_log,
        ids.charcoal,
        ids.oak_plank,
        ids.wood_handle,
        ids.iron_ingot,
        ids.steel_ingot,
        ids.steel_blade,
        ids.steel_sword,
    ]
}

fn setup() -> (CraftPlanner, Arc<Catalog>, [MaterialId; 10]) {
    let (catalog, ids) = forge_catalog();
    let catalog = Arc::new(catalog);
    let planner = CraftPlanner::new(Arc::clone(&catalog));
    (planner, catalog, all_materials(&ids))
}

fn available_from_mask(materials: &[MaterialId; 10], mask: u16) -> Vec<MaterialMatcher> {
    materials
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1 << i) != 0)
        .map(|(_, m)| MaterialMatcher::id(*m))
        .collect()
}

proptest! {
    #[test]
    fn cost_is_sum_of_step_costs(target_ix in 0usize..10, mask in 0u16..1024) {
        let (planner, catalog, materials) = setup();
        let target = MaterialMatcher::id(materials[target_ix]);
        let available = available_from_mask(&materials, mask);

        let plan = planner.plan_best(&target, &available, PlanOptions::safe_defaults());
        if plan.feasible {
            let summed: u64 = plan
                .steps()
                .iter()
                .map(|s| u64::from(catalog.recipe(s.recipe).unwrap().cost))
                .sum();
            prop_assert_eq!(plan.total_cost, summed);
        } else {
            prop_assert!(plan.steps().is_empty());
        }
    }

    #[test]
    fn available_targets_cost_zero(target_ix in 0usize..10, mask in 0u16..1024) {
        let (planner, _, materials) = setup();
        let target = MaterialMatcher::id(materials[target_ix]);
        let mut available = available_from_mask(&materials, mask);
        available.push(target.clone());

        let plan = planner.plan_best(&target, &available, PlanOptions::safe_defaults());
        prop_assert!(plan.feasible);
        prop_assert_eq!(plan.total_cost, 0);
        prop_assert!(plan.steps().is_empty());
    }

    #[test]
    fn best_never_beaten_by_top_k(target_ix in 0usize..10, mask in 0u16..1024) {
        let (planner, _, materials) = setup();
        let target = MaterialMatcher::id(materials[target_ix]);
        let available = available_from_mask(&materials, mask);
        let options = PlanOptions::safe_defaults();

        let best = planner.plan_best(&target, &available, options);
        let top = planner.plan_top_k(&target, &available, 3, options);

        if let Some(first) = top.first() {
            prop_assert!(best.feasible);
            prop_assert_eq!(best.total_cost, first.total_cost);
        } else {
            prop_assert!(!best.feasible);
        }
        for plan in &top {
            prop_assert!(best.total_cost <= plan.total_cost);
        }
    }

    #[test]
    fn plans_are_acyclic(target_ix in 0usize..10, mask in 0u16..1024) {
        let (planner, _, materials) = setup();
        let target = MaterialMatcher::id(materials[target_ix]);
        let available = available_from_mask(&materials, mask);

        for plan in planner.plan_all(&target, &available, PlanOptions::safe_defaults()) {
            assert_acyclic(&plan.root, &mut Vec::new())?;
        }
    }

    #[test]
    fn plan_all_sorted_and_deduplicated(target_ix in 0usize..10, mask in 0u16..1024) {
        let (planner, _, materials) = setup();
        let target = MaterialMatcher::id(materials[target_ix]);
        let available = available_from_mask(&materials, mask);

        let plans = planner.plan_all(&target, &available, PlanOptions::safe_defaults());
        for w in plans.windows(2) {
            prop_assert!(w[0].total_cost <= w[1].total_cost);
        }
        let mut sigs: Vec<String> = plans.iter().map(|p| p.signature()).collect();
        let before = sigs.len();
        sigs.sort();
        sigs.dedup();
        prop_assert_eq!(sigs.len(), before);
    }

    #[test]
    fn extra_availability_never_hurts(target_ix in 0usize..10, mask in 0u16..1024, extra in 0usize..10) {
        let (planner, _, materials) = setup();
        let target = MaterialMatcher::id(materials[target_ix]);
        let options = PlanOptions::safe_defaults();

        let base = available_from_mask(&materials, mask);
        let mut widened = base.clone();
        widened.push(MaterialMatcher::id(materials[extra]));

        let before = planner.plan_best(&target, &base, options);
        let after = planner.plan_best(&target, &widened, options);

        if before.feasible {
            prop_assert!(after.feasible);
            prop_assert!(after.total_cost <= before.total_cost);
        }
    }
}
