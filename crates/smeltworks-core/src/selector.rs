//! Recipe selectors: which factory instances a recipe may run on.

use crate::id::{FactoryTypeId, GroupId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A pure predicate over (factory template, group set, level).
///
/// Empty id/group sets are wildcards. The level bound is inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSelector {
    factory_types: BTreeSet<FactoryTypeId>,
    groups: BTreeSet<GroupId>,
    min_level: u32,
}

impl RecipeSelector {
    /// Selector that matches every factory of at least `min_level`. A
    /// default selector (level 0) matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_factory_types(mut self, types: impl IntoIterator<Item = FactoryTypeId>) -> Self {
        self.factory_types.extend(types);
        self
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
        self.groups.extend(groups);
        self
    }

    pub fn with_min_level(mut self, level: u32) -> Self {
        self.min_level = level;
        self
    }

    pub fn min_level(&self) -> u32 {
        self.min_level
    }

    pub fn factory_types(&self) -> &BTreeSet<FactoryTypeId> {
        &self.factory_types
    }

    /// True if a factory instance with this identity may run the recipe.
    pub fn matches(
        &self,
        factory_type: FactoryTypeId,
        groups: &BTreeSet<GroupId>,
        level: u32,
    ) -> bool {
        if level < self.min_level {
            return false;
        }

        let type_ok = self.factory_types.is_empty() || self.factory_types.contains(&factory_type);
        let group_ok = self.groups.is_empty() || self.groups.iter().any(|g| groups.contains(g));

        type_ok && group_ok
    }
}
