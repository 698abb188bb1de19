//! Recipe definitions.
//!
//! A recipe is pure data: matchers for its inputs and outputs, a selector
//! restricting which factories may run it, a cost figure for the planner,
//! and a [`ProcessKind`] describing how a session of it completes.
//! Behaviour dispatches via enum match (no trait objects).

use crate::catalog::Catalog;
use crate::material::MaterialUnit;
use crate::matcher::MaterialMatcher;
use crate::selector::RecipeSelector;
use crate::time::{Fixed64, TimeWindow};
use serde::{Deserialize, Serialize};

/// Default selection priority for recipes that do not override it.
pub const DEFAULT_PRIORITY: i32 = 100;

// ---------------------------------------------------------------------------
// Process kinds
// ---------------------------------------------------------------------------

/// How a session of this recipe runs and completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProcessKind {
    /// Runs against a wall-clock window; complete once elapsed reaches the
    /// window minimum, over-processed past the maximum.
    Timed(TimeWindow),

    /// Driven by discrete events: completes once actions with the given id
    /// (or raw presses) have accumulated `required` progress. Never
    /// completes from elapsed time alone.
    Manual { action: String, required: Fixed64 },
}

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// An immutable recipe. Registered once in the catalog and shared by
/// reference across every factory instance and planner call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique name; duplicate registration is a catalog error.
    pub name: String,
    pub selector: RecipeSelector,
    /// Whether input matching must respect declared order (inputs claim
    /// content units at strictly increasing positions).
    pub ordered: bool,
    pub inputs: Vec<MaterialMatcher>,
    /// Must be non-empty; enforced at registration.
    pub outputs: Vec<MaterialMatcher>,
    /// Planner cost of applying this recipe once.
    pub cost: u32,
    /// Session selection priority; higher wins.
    pub priority: i32,
    pub process: ProcessKind,
}

impl Recipe {
    pub fn new(name: impl Into<String>, process: ProcessKind) -> Self {
        Self {
            name: name.into(),
            selector: RecipeSelector::new(),
            ordered: false,
            inputs: Vec::new(),
            outputs: Vec::new(),
            cost: 0,
            priority: DEFAULT_PRIORITY,
            process,
        }
    }

    pub fn with_selector(mut self, selector: RecipeSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }

    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = MaterialMatcher>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    pub fn with_outputs(mut self, outputs: impl IntoIterator<Item = MaterialMatcher>) -> Self {
        self.outputs.extend(outputs);
        self
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sum of input matcher specificities; second selection tie-break key.
    pub fn specificity_score(&self) -> u32 {
        self.inputs.iter().map(MaterialMatcher::specificity).sum()
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// The time window, for timed recipes.
    pub fn time_window(&self) -> Option<TimeWindow> {
        match &self.process {
            ProcessKind::Timed(w) => Some(*w),
            ProcessKind::Manual { .. } => None,
        }
    }

    /// Greedily claim one unused content unit per input matcher. Returns
    /// the claimed indices in input order, or `None` if any matcher finds
    /// no match. Ordered recipes must claim at strictly increasing
    /// positions.
    pub fn match_inputs(&self, contents: &[MaterialUnit], catalog: &Catalog) -> Option<Vec<usize>> {
        let mut used = vec![false; contents.len()];
        let mut claimed = Vec::with_capacity(self.inputs.len());
        let mut floor = 0usize;

        for need in &self.inputs {
            let start = if self.ordered { floor } else { 0 };
            let found = contents
                .iter()
                .enumerate()
                .skip(start)
                .find(|(i, unit)| {
                    // Units of unregistered materials match nothing.
                    !used[*i]
                        && catalog
                            .categories_of(unit.material)
                            .is_some_and(|cats| need.matches(unit.material, cats))
                })
                .map(|(i, _)| i)?;

            used[found] = true;
            claimed.push(found);
            floor = found + 1;
        }

        Some(claimed)
    }

    /// Whether a session of this recipe could start on the given contents.
    pub fn can_start(&self, contents: &[MaterialUnit], catalog: &Catalog) -> bool {
        self.match_inputs(contents, catalog).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;
    use crate::id::MaterialId;
    use crate::time::secs;

    fn timed(min: f64, max: f64) -> ProcessKind {
        ProcessKind::Timed(TimeWindow::new(secs(min), secs(max)).unwrap())
    }

    fn unit(id: u32) -> MaterialUnit {
        MaterialUnit::new(MaterialId(id))
    }

    fn small_catalog() -> (Catalog, MaterialId, MaterialId, MaterialId) {
        let mut b = CatalogBuilder::new();
        let metal = b.category("metal");
        let fuel = b.category("fuel");
        let ore = b.register_material("ore", [metal]).unwrap();
        let coal = b.register_material("coal", [fuel]).unwrap();
        let ingot = b.register_material("ingot", [metal]).unwrap();
        (b.build().unwrap(), ore, coal, ingot)
    }

    #[test]
    fn specificity_sums_over_inputs() {
        let r = Recipe::new("r", timed(1.0, 2.0)).with_inputs([
            MaterialMatcher::id(MaterialId(0)),
            MaterialMatcher::any(),
        ]);
        assert_eq!(r.specificity_score(), 1000);
        assert_eq!(r.input_count(), 2);
    }

    #[test]
    fn unordered_matching_claims_distinct_units() {
        let (catalog, ore, coal, _) = small_catalog();
        let r = Recipe::new("smelt", timed(1.0, 2.0))
            .with_inputs([MaterialMatcher::id(ore), MaterialMatcher::id(coal)]);

        let contents = [MaterialUnit::new(coal), MaterialUnit::new(ore)];
        let claimed = r.match_inputs(&contents, &catalog).unwrap();
        assert_eq!(claimed, vec![1, 0]);
    }

    #[test]
    fn matching_fails_when_a_unit_is_needed_twice() {
        let (catalog, ore, _, _) = small_catalog();
        let r = Recipe::new("double", timed(1.0, 2.0))
            .with_inputs([MaterialMatcher::id(ore), MaterialMatcher::id(ore)]);

        let one = [MaterialUnit::new(ore)];
        assert!(!r.can_start(&one, &catalog));

        let two = [MaterialUnit::new(ore), MaterialUnit::new(ore)];
        assert!(r.can_start(&two, &catalog));
    }

    #[test]
    fn ordered_matching_requires_increasing_positions() {
        let (catalog, ore, coal, _) = small_catalog();
        let r = Recipe::new("layered", timed(1.0, 2.0))
            .with_ordered(true)
            .with_inputs([MaterialMatcher::id(ore), MaterialMatcher::id(coal)]);

        // ore before coal: ok.
        assert!(r.can_start(&[MaterialUnit::new(ore), MaterialUnit::new(coal)], &catalog));
        // coal before ore: the ordered scan cannot go back for the coal.
        assert!(!r.can_start(&[MaterialUnit::new(coal), MaterialUnit::new(ore)], &catalog));
    }

    #[test]
    fn category_matcher_matches_contents() {
        let (catalog, _, _, _) = small_catalog();
        let metal = catalog.category_id("metal").unwrap();
        let r = Recipe::new("press", timed(1.0, 2.0))
            .with_inputs([MaterialMatcher::any_of([metal]).unwrap()]);

        assert!(r.can_start(&[unit(0)], &catalog)); // ore is metal
        assert!(!r.can_start(&[unit(1)], &catalog)); // coal is fuel
    }

    #[test]
    fn manual_recipe_has_no_window() {
        let r = Recipe::new(
            "carve",
            ProcessKind::Manual {
                action: "chisel".into(),
                required: secs(3.0),
            },
        );
        assert!(r.time_window().is_none());
    }
}
