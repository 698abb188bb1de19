//! The recipe/material/factory catalog.
//!
//! Explicit, compile-time-visible registration: the embedding application
//! assembles a [`CatalogBuilder`] before any factory or planner use, then
//! freezes it into an immutable [`Catalog`] shared by reference. There is
//! no global state and no runtime scanning.
//!
//! Two-phase lifecycle (builder -> frozen catalog): duplicate names fail
//! at registration, dangling id references fail at `build()`.

use crate::id::{CategoryId, FactoryTypeId, GroupId, MaterialId, RecipeId};
use crate::material::MaterialDef;
use crate::matcher::MaterialMatcher;
use crate::recipe::Recipe;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A factory template: the immutable identity every spawned instance of
/// this factory type carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryTemplate {
    pub name: String,
    pub groups: BTreeSet<GroupId>,
    pub level: u32,
}

/// Errors raised during catalog registration or finalization.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("material already registered: {0}")]
    DuplicateMaterial(String),

    #[error("factory template already registered: {0}")]
    DuplicateFactory(String),

    #[error("recipe already registered: {0}")]
    DuplicateRecipe(String),

    #[error("recipe has no outputs: {0}")]
    RecipeWithoutOutputs(String),

    #[error("material {material} references unknown category {category:?}")]
    UnknownCategory {
        material: String,
        category: CategoryId,
    },

    #[error("recipe {recipe} references unknown material {material:?}")]
    UnknownMaterialRef {
        recipe: String,
        material: MaterialId,
    },

    #[error("recipe {recipe} selector references unknown factory type {factory:?}")]
    UnknownFactoryRef {
        recipe: String,
        factory: FactoryTypeId,
    },
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for an immutable [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    categories: Vec<String>,
    category_by_name: HashMap<String, CategoryId>,
    groups: Vec<String>,
    group_by_name: HashMap<String, GroupId>,
    materials: Vec<MaterialDef>,
    material_by_name: HashMap<String, MaterialId>,
    factories: Vec<FactoryTemplate>,
    factory_by_name: HashMap<String, FactoryTypeId>,
    recipes: Vec<Recipe>,
    recipe_by_name: HashMap<String, RecipeId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a category name. Idempotent.
    pub fn category(&mut self, name: &str) -> CategoryId {
        if let Some(id) = self.category_by_name.get(name) {
            return *id;
        }
        let id = CategoryId(self.categories.len() as u16);
        self.categories.push(name.to_string());
        self.category_by_name.insert(name.to_string(), id);
        id
    }

    /// Intern a factory group name. Idempotent.
    pub fn group(&mut self, name: &str) -> GroupId {
        if let Some(id) = self.group_by_name.get(name) {
            return *id;
        }
        let id = GroupId(self.groups.len() as u16);
        self.groups.push(name.to_string());
        self.group_by_name.insert(name.to_string(), id);
        id
    }

    /// Register a material with its category set. Returns its id.
    pub fn register_material(
        &mut self,
        name: &str,
        categories: impl IntoIterator<Item = CategoryId>,
    ) -> Result<MaterialId, CatalogError> {
        if self.material_by_name.contains_key(name) {
            return Err(CatalogError::DuplicateMaterial(name.to_string()));
        }
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(MaterialDef {
            name: name.to_string(),
            categories: categories.into_iter().collect(),
        });
        self.material_by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Register a factory template. Returns its id.
    pub fn register_factory(
        &mut self,
        name: &str,
        groups: impl IntoIterator<Item = GroupId>,
        level: u32,
    ) -> Result<FactoryTypeId, CatalogError> {
        if self.factory_by_name.contains_key(name) {
            return Err(CatalogError::DuplicateFactory(name.to_string()));
        }
        let id = FactoryTypeId(self.factories.len() as u32);
        self.factories.push(FactoryTemplate {
            name: name.to_string(),
            groups: groups.into_iter().collect(),
            level,
        });
        self.factory_by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Register a recipe. The name must be unique and the output list
    /// non-empty; both are fatal configuration errors here, not at use
    /// time.
    pub fn register_recipe(&mut self, recipe: Recipe) -> Result<RecipeId, CatalogError> {
        if self.recipe_by_name.contains_key(&recipe.name) {
            return Err(CatalogError::DuplicateRecipe(recipe.name.clone()));
        }
        if recipe.outputs.is_empty() {
            return Err(CatalogError::RecipeWithoutOutputs(recipe.name.clone()));
        }
        let id = RecipeId(self.recipes.len() as u32);
        self.recipe_by_name.insert(recipe.name.clone(), id);
        self.recipes.push(recipe);
        Ok(id)
    }

    /// Lookup a registered material id by name.
    pub fn material_id(&self, name: &str) -> Option<MaterialId> {
        self.material_by_name.get(name).copied()
    }

    /// Finalize. Validates every id reference before freezing.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        for m in &self.materials {
            for c in &m.categories {
                if c.0 as usize >= self.categories.len() {
                    return Err(CatalogError::UnknownCategory {
                        material: m.name.clone(),
                        category: *c,
                    });
                }
            }
        }

        for r in &self.recipes {
            for f in r.selector.factory_types() {
                if f.0 as usize >= self.factories.len() {
                    return Err(CatalogError::UnknownFactoryRef {
                        recipe: r.name.clone(),
                        factory: *f,
                    });
                }
            }
            for matcher in r.inputs.iter().chain(r.outputs.iter()) {
                if let MaterialMatcher::Id(m) = matcher
                    && m.0 as usize >= self.materials.len()
                {
                    return Err(CatalogError::UnknownMaterialRef {
                        recipe: r.name.clone(),
                        material: *m,
                    });
                }
            }
        }

        Ok(Catalog {
            categories: self.categories,
            category_by_name: self.category_by_name,
            groups: self.groups,
            group_by_name: self.group_by_name,
            materials: self.materials,
            material_by_name: self.material_by_name,
            factories: self.factories,
            factory_by_name: self.factory_by_name,
            recipes: self.recipes,
            recipe_by_name: self.recipe_by_name,
        })
    }
}

// ---------------------------------------------------------------------------
// Frozen catalog
// ---------------------------------------------------------------------------

/// Immutable catalog. Frozen after `build()`; thread-safe to share.
#[derive(Debug)]
pub struct Catalog {
    categories: Vec<String>,
    category_by_name: HashMap<String, CategoryId>,
    groups: Vec<String>,
    group_by_name: HashMap<String, GroupId>,
    materials: Vec<MaterialDef>,
    material_by_name: HashMap<String, MaterialId>,
    factories: Vec<FactoryTemplate>,
    factory_by_name: HashMap<String, FactoryTypeId>,
    recipes: Vec<Recipe>,
    recipe_by_name: HashMap<String, RecipeId>,
}

impl Catalog {
    // -- name lookups --

    pub fn category_id(&self, name: &str) -> Option<CategoryId> {
        self.category_by_name.get(name).copied()
    }

    pub fn group_id(&self, name: &str) -> Option<GroupId> {
        self.group_by_name.get(name).copied()
    }

    pub fn material_id(&self, name: &str) -> Option<MaterialId> {
        self.material_by_name.get(name).copied()
    }

    pub fn factory_type_id(&self, name: &str) -> Option<FactoryTypeId> {
        self.factory_by_name.get(name).copied()
    }

    pub fn recipe_id(&self, name: &str) -> Option<RecipeId> {
        self.recipe_by_name.get(name).copied()
    }

    // -- definitions --

    pub fn material(&self, id: MaterialId) -> Option<&MaterialDef> {
        self.materials.get(id.0 as usize)
    }

    pub fn category_name(&self, id: CategoryId) -> Option<&str> {
        self.categories.get(id.0 as usize).map(String::as_str)
    }

    pub fn group_name(&self, id: GroupId) -> Option<&str> {
        self.groups.get(id.0 as usize).map(String::as_str)
    }

    pub fn factory(&self, id: FactoryTypeId) -> Option<&FactoryTemplate> {
        self.factories.get(id.0 as usize)
    }

    pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(id.0 as usize)
    }

    /// Categories of a material, or `None` for an unregistered id.
    pub fn categories_of(&self, id: MaterialId) -> Option<&BTreeSet<CategoryId>> {
        self.materials.get(id.0 as usize).map(|m| &m.categories)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    pub fn factory_count(&self) -> usize {
        self.factories.len()
    }

    // -- iteration (registration order) --

    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &MaterialDef)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialId(i as u32), m))
    }

    pub fn recipes(&self) -> impl Iterator<Item = (RecipeId, &Recipe)> {
        self.recipes
            .iter()
            .enumerate()
            .map(|(i, r)| (RecipeId(i as u32), r))
    }

    // -- queries --

    /// Materials matching a matcher, in registration order. This is the
    /// documented default order for concrete-output selection and target
    /// expansion.
    pub fn materials_matching(&self, matcher: &MaterialMatcher) -> Vec<MaterialId> {
        self.materials()
            .filter(|(id, def)| matcher.matches(*id, &def.categories))
            .map(|(id, _)| id)
            .collect()
    }

    /// First material matching `matcher` in registration order.
    pub fn first_material_matching(&self, matcher: &MaterialMatcher) -> Option<MaterialId> {
        self.materials()
            .find(|(id, def)| matcher.matches(*id, &def.categories))
            .map(|(id, _)| id)
    }

    /// Recipes whose selector admits the given factory template. Resolved
    /// once per instance at spawn time.
    pub fn eligible_recipes(&self, factory_type: FactoryTypeId) -> Vec<RecipeId> {
        let Some(template) = self.factory(factory_type) else {
            return Vec::new();
        };
        self.recipes()
            .filter(|(_, r)| {
                r.selector
                    .matches(factory_type, &template.groups, template.level)
            })
            .map(|(id, _)| id)
            .collect()
    }
}
