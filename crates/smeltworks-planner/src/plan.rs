//! Production plans.
//!
//! The canonical internal representation is a tree rooted at the requested
//! target: each node is either a leaf ("already available") or an internal
//! node with a chosen recipe and one child per input. The flat ordered
//! step list is derived on demand, so there is only one search algorithm
//! to maintain.

use serde::{Deserialize, Serialize};
use smeltworks_core::id::RecipeId;
use smeltworks_core::matcher::MaterialMatcher;

/// Aggregate plan cost. The impossible sentinel carries [`IMPOSSIBLE_COST`].
pub type Cost = u64;

/// Cost of the impossible sentinel plan. Never produced by summation:
/// real plan costs are sums of `u32` recipe costs.
pub const IMPOSSIBLE_COST: Cost = Cost::MAX;

// ---------------------------------------------------------------------------
// Plan tree
// ---------------------------------------------------------------------------

/// One node of a plan tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanNode {
    /// The target is already covered by the available set.
    Available { target: MaterialMatcher },

    /// The target is produced by applying `recipe` to its resolved inputs.
    Craft {
        target: MaterialMatcher,
        recipe: RecipeId,
        children: Vec<PlanNode>,
    },
}

impl PlanNode {
    pub fn target(&self) -> &MaterialMatcher {
        match self {
            PlanNode::Available { target } => target,
            PlanNode::Craft { target, .. } => target,
        }
    }
}

/// One recipe application in a flattened plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub recipe: RecipeId,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// A costed chain of recipe applications producing `target`.
///
/// Immutable once built. Unreachable targets are represented by the
/// impossible sentinel (`feasible == false`, infinite cost, leaf-only
/// tree), never by an error or an absent value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub target: MaterialMatcher,
    pub root: PlanNode,
    pub total_cost: Cost,
    pub feasible: bool,
}

impl Plan {
    /// Zero-cost plan for a target already present in the available set.
    pub fn available(target: MaterialMatcher) -> Self {
        Self {
            root: PlanNode::Available {
                target: target.clone(),
            },
            target,
            total_cost: 0,
            feasible: true,
        }
    }

    /// The impossible sentinel.
    pub fn impossible(target: MaterialMatcher) -> Self {
        Self {
            root: PlanNode::Available {
                target: target.clone(),
            },
            target,
            total_cost: IMPOSSIBLE_COST,
            feasible: false,
        }
    }

    /// Plan produced by applying `recipe` on top of resolved input plans.
    pub fn crafted(
        target: MaterialMatcher,
        recipe: RecipeId,
        children: Vec<PlanNode>,
        total_cost: Cost,
    ) -> Self {
        Self {
            root: PlanNode::Craft {
                target: target.clone(),
                recipe,
                children,
            },
            target,
            total_cost,
            feasible: true,
        }
    }

    /// Flat ordered list of recipe applications: dependencies first, the
    /// step producing the plan's own target last (post-order traversal).
    pub fn steps(&self) -> Vec<PlanStep> {
        fn walk(node: &PlanNode, out: &mut Vec<PlanStep>) {
            if let PlanNode::Craft {
                recipe, children, ..
            } = node
            {
                for child in children {
                    walk(child, out);
                }
                out.push(PlanStep { recipe: *recipe });
            }
        }

        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }

    /// Structural signature for deduplication: a preorder rendering of
    /// each node's target and chosen recipe (or availability marker).
    pub fn signature(&self) -> String {
        fn walk(node: &PlanNode, out: &mut String) {
            match node {
                PlanNode::Available { target } => {
                    out.push_str(&target.key());
                    out.push_str("<-AVAILABLE|");
                }
                PlanNode::Craft {
                    target,
                    recipe,
                    children,
                } => {
                    out.push_str(&target.key());
                    out.push_str("<-R");
                    out.push_str(&recipe.0.to_string());
                    out.push('|');
                    for child in children {
                        walk(child, out);
                    }
                }
            }
        }

        let mut out = String::new();
        walk(&self.root, &mut out);
        out
    }

    /// Recipe ids used anywhere in the plan, for cycle assertions.
    pub fn recipes_used(&self) -> Vec<RecipeId> {
        self.steps().iter().map(|s| s.recipe).collect()
    }
}
