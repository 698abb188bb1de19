//! Backward-chaining crafting search.
//!
//! # Algorithm
//!
//! Planning for a target matcher works backwards: if the available set
//! already covers the target the answer is a zero-cost leaf; otherwise
//! every catalog recipe with an output covering the target is expanded by
//! recursively planning each of its inputs one level deeper, and the
//! per-input plan lists are combined into candidate trees. Candidates are
//! ranked by ascending total cost.
//!
//! The search is bounded three ways:
//! - a depth limit ([`PlanOptions::max_depth`]),
//! - a budget on constructed candidates ([`PlanOptions::max_plans`]),
//! - a visiting set keyed on matcher keys that cuts recipe cycles
//!   (a target reached again while still being expanded yields no plans
//!   through that path).
//!
//! Subproblem results are memoized per `(target key, mode, k, depth)` so
//! diamond-shaped dependency graphs do not re-expand shared inputs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use smeltworks_core::catalog::Catalog;
use smeltworks_core::matcher::MaterialMatcher;

use crate::options::PlanOptions;
use crate::plan::{Cost, Plan, PlanNode};

/// How many plans a search call is asked to keep per subproblem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Mode {
    BestOnly,
    TopK,
    All,
}

// ---------------------------------------------------------------------------
// Public planner
// ---------------------------------------------------------------------------

/// Stateless planning front end over a frozen [`Catalog`].
///
/// Every call runs an independent search with its own memo table and
/// budget; the planner itself holds no mutable state and is cheap to
/// clone and share.
#[derive(Debug, Clone)]
pub struct CraftPlanner {
    catalog: Arc<Catalog>,
}

impl CraftPlanner {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Cheapest plan for `target`, or the impossible sentinel when no
    /// chain reaches it within the limits.
    pub fn plan_best(
        &self,
        target: &MaterialMatcher,
        available: &[MaterialMatcher],
        options: PlanOptions,
    ) -> Plan {
        self.search(target, available, Mode::BestOnly, 1, options)
            .into_iter()
            .next()
            .unwrap_or_else(|| Plan::impossible(target.clone()))
    }

    /// Up to `k` cheapest plans, ascending by cost. May return fewer than
    /// `k` (including none) when the search space is smaller.
    pub fn plan_top_k(
        &self,
        target: &MaterialMatcher,
        available: &[MaterialMatcher],
        k: usize,
        options: PlanOptions,
    ) -> Vec<Plan> {
        if k == 0 {
            return Vec::new();
        }
        self.search(target, available, Mode::TopK, k, options)
    }

    /// Every distinct plan discovered within the limits, ascending by cost.
    pub fn plan_all(
        &self,
        target: &MaterialMatcher,
        available: &[MaterialMatcher],
        options: PlanOptions,
    ) -> Vec<Plan> {
        self.search(target, available, Mode::All, 0, options)
    }

    fn search(
        &self,
        target: &MaterialMatcher,
        available: &[MaterialMatcher],
        mode: Mode,
        k: usize,
        options: PlanOptions,
    ) -> Vec<Plan> {
        let mut search = Search {
            catalog: &self.catalog,
            available,
            mode,
            k,
            options,
            budget: Budget {
                remaining: options.max_plans(),
            },
            memo: HashMap::new(),
            visiting: HashSet::new(),
        };
        search.solve(target, 0)
    }
}

// ---------------------------------------------------------------------------
// Search state
// ---------------------------------------------------------------------------

/// Candidate-construction budget shared by one search call.
struct Budget {
    remaining: u32,
}

impl Budget {
    fn consume(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    fn exhausted(&self) -> bool {
        self.remaining == 0
    }
}

struct Search<'a> {
    catalog: &'a Catalog,
    available: &'a [MaterialMatcher],
    mode: Mode,
    k: usize,
    options: PlanOptions,
    budget: Budget,
    memo: HashMap<(String, Mode, usize, u32), Vec<Plan>>,
    visiting: HashSet<String>,
}

impl Search<'_> {
    /// Plans for `target` at the given recursion depth, ascending by cost.
    /// An empty result means the target is unreachable through this path.
    fn solve(&mut self, target: &MaterialMatcher, depth: u32) -> Vec<Plan> {
        if self.budget.exhausted() || depth > self.options.max_depth() {
            return Vec::new();
        }

        if self.available.iter().any(|a| a.covers(target)) {
            return vec![Plan::available(target.clone())];
        }

        let key = target.key();
        let memo_key = (key.clone(), self.mode, self.k, depth);
        if let Some(cached) = self.memo.get(&memo_key) {
            return cached.clone();
        }

        // A target still being expanded higher up the stack marks a recipe
        // cycle; it contributes nothing through this path.
        if !self.visiting.insert(key.clone()) {
            return Vec::new();
        }

        let mut candidates: Vec<Plan> = Vec::new();
        let catalog = self.catalog;

        'recipes: for (recipe_id, recipe) in catalog.recipes() {
            if !recipe.outputs.iter().any(|out| out.covers(target)) {
                continue;
            }

            // Resolve every input one level deeper. Any unreachable input
            // disqualifies the recipe outright.
            let mut per_input: Vec<Vec<Plan>> = Vec::with_capacity(recipe.inputs.len());
            let mut dead_input = false;
            for input in &recipe.inputs {
                let mut plans = self.solve(input, depth + 1);
                if plans.is_empty() {
                    dead_input = true;
                    break;
                }
                if self.mode != Mode::All {
                    plans.truncate(self.k.max(1));
                }
                per_input.push(plans);
            }
            if dead_input {
                continue;
            }

            // Cross product of per-input choices, cheapest combinations
            // surfacing first because every input list is sorted.
            let mut combos: Vec<(Cost, Vec<PlanNode>)> = vec![(0, Vec::new())];
            for plans in &per_input {
                let mut next = Vec::with_capacity(combos.len() * plans.len());
                for (cost, nodes) in &combos {
                    for plan in plans {
                        if self.budget.exhausted() {
                            break;
                        }
                        let mut nodes = nodes.clone();
                        nodes.push(plan.root.clone());
                        next.push((cost.saturating_add(plan.total_cost), nodes));
                    }
                }
                next.sort_by_key(|(cost, _)| *cost);
                combos = next;
            }

            for (inputs_cost, children) in combos {
                if self.budget.exhausted() {
                    break 'recipes;
                }
                self.budget.consume();
                candidates.push(Plan::crafted(
                    target.clone(),
                    recipe_id,
                    children,
                    inputs_cost.saturating_add(Cost::from(recipe.cost)),
                ));
            }

            // Keep a single running best; a recipe later in the catalog
            // may still beat it.
            if self.mode == Mode::BestOnly {
                candidates.sort_by_key(|p| p.total_cost);
                candidates.truncate(1);
            }
        }

        self.visiting.remove(&key);

        candidates.sort_by_key(|p| p.total_cost);

        if self.options.deduplicate() {
            let mut seen = HashSet::new();
            candidates.retain(|p| seen.insert(p.signature()));
        }

        match self.mode {
            Mode::BestOnly => candidates.truncate(1),
            Mode::TopK => candidates.truncate(self.k),
            Mode::All => {}
        }

        self.memo.insert(memo_key, candidates.clone());
        candidates
    }
}
