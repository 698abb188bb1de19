//! Goal-oriented wrapper over [`CraftPlanner`].
//!
//! The planner proper answers "how do I obtain something covered by this
//! matcher". The facade answers the player-facing question "what can I
//! make, and how": category goals are expanded into the concrete catalog
//! materials they admit, each concrete material is planned independently,
//! and the per-material results are merged into a single ranked list.

use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use smeltworks_core::catalog::Catalog;
use smeltworks_core::matcher::MaterialMatcher;

use crate::options::PlanOptions;
use crate::plan::Plan;
use crate::planner::CraftPlanner;

/// Upper bound on concrete materials a category goal expands into.
const EXPAND_LIMIT: usize = 64;

#[derive(Debug, Clone)]
pub struct PlannerFacade {
    planner: CraftPlanner,
}

impl PlannerFacade {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            planner: CraftPlanner::new(catalog),
        }
    }

    pub fn planner(&self) -> &CraftPlanner {
        &self.planner
    }

    /// Cheapest plan across every concrete material the goal admits, or
    /// the impossible sentinel when none is reachable.
    pub fn best_route(
        &self,
        goal: &MaterialMatcher,
        available: &[MaterialMatcher],
        options: PlanOptions,
    ) -> Plan {
        self.routes(goal, available, 1, options)
            .into_iter()
            .next()
            .unwrap_or_else(|| Plan::impossible(goal.clone()))
    }

    /// Up to `k` cheapest plans across all admitted materials.
    pub fn top_routes(
        &self,
        goal: &MaterialMatcher,
        available: &[MaterialMatcher],
        k: usize,
        options: PlanOptions,
    ) -> Vec<Plan> {
        self.routes(goal, available, k, options)
    }

    /// Every distinct plan across all admitted materials, ascending by cost.
    pub fn all_routes(
        &self,
        goal: &MaterialMatcher,
        available: &[MaterialMatcher],
        options: PlanOptions,
    ) -> Vec<Plan> {
        let mut plans = self.plan_targets(goal, available, usize::MAX, options);
        dedup_sorted(&mut plans);
        plans
    }

    fn routes(
        &self,
        goal: &MaterialMatcher,
        available: &[MaterialMatcher],
        k: usize,
        options: PlanOptions,
    ) -> Vec<Plan> {
        if k == 0 {
            return Vec::new();
        }
        let mut plans = self.plan_targets(goal, available, k, options);
        dedup_sorted(&mut plans);
        plans.truncate(k);
        plans
    }

    /// Runs one independent search per concrete target and concatenates
    /// the results, unsorted.
    fn plan_targets(
        &self,
        goal: &MaterialMatcher,
        available: &[MaterialMatcher],
        k: usize,
        options: PlanOptions,
    ) -> Vec<Plan> {
        let targets = self.expand_goal(goal);

        #[cfg(feature = "parallel")]
        {
            targets
                .par_iter()
                .flat_map(|target| self.plan_one(target, available, k, options))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            targets
                .iter()
                .flat_map(|target| self.plan_one(target, available, k, options))
                .collect()
        }
    }

    fn plan_one(
        &self,
        target: &MaterialMatcher,
        available: &[MaterialMatcher],
        k: usize,
        options: PlanOptions,
    ) -> Vec<Plan> {
        if k == usize::MAX {
            self.planner.plan_all(target, available, options)
        } else {
            self.planner.plan_top_k(target, available, k, options)
        }
    }

    /// Concrete targets a goal admits. Exact goals pass through unchanged;
    /// category goals fan out to matching catalog materials (bounded by
    /// [`EXPAND_LIMIT`]); a bare wildcard admits nothing as a final goal.
    fn expand_goal(&self, goal: &MaterialMatcher) -> Vec<MaterialMatcher> {
        match goal {
            MaterialMatcher::Any => Vec::new(),
            MaterialMatcher::Id(_) => vec![goal.clone()],
            MaterialMatcher::AnyOfCategories(_) | MaterialMatcher::AllOfCategories(_) => {
                let mut ids = self.planner.catalog().materials_matching(goal);
                ids.truncate(EXPAND_LIMIT);
                ids.into_iter().map(MaterialMatcher::id).collect()
            }
        }
    }
}

fn dedup_sorted(plans: &mut Vec<Plan>) {
    plans.sort_by_key(|p| p.total_cost);
    let mut seen = std::collections::HashSet::new();
    plans.retain(|p| seen.insert(p.signature()));
}
