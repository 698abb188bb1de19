//! The production world: a catalog plus the running factory instances.
//!
//! This is the reference single-threaded usage pattern: one `tick` call per
//! frame/interval updates every instance in turn, then materializes the
//! outputs of completed recipes into each factory's pending queue. Output
//! materialization lives here, not in the state machine: a completed
//! recipe's output matchers are resolved to concrete materials using the
//! documented default of first match in catalog registration order.

use crate::catalog::Catalog;
use crate::event::{FactoryEvent, SessionEvent};
use crate::factory::Factory;
use crate::id::{FactoryKey, MaterialId, RecipeId};
use crate::material::MaterialUnit;
use crate::matcher::MaterialMatcher;
use crate::time::Seconds;
use slotmap::SlotMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Errors raised by world operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("unknown factory template: {0}")]
    UnknownTemplate(String),

    #[error("factory instance no longer exists")]
    StaleFactoryKey,
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// Counter store that receives extracted outputs. The core treats this
/// purely as counters and never inspects the implementation.
pub trait Inventory {
    fn amount_of(&self, material: MaterialId) -> u64;

    fn add(&mut self, material: MaterialId, delta: u64);

    /// Remove `delta` units. Returns false (and removes nothing) if the
    /// stored amount is insufficient.
    fn remove(&mut self, material: MaterialId, delta: u64) -> bool;

    fn has_at_least(&self, material: MaterialId, n: u64) -> bool {
        self.amount_of(material) >= n
    }
}

/// Reference in-memory inventory.
#[derive(Debug, Clone, Default)]
pub struct CounterInventory {
    counts: HashMap<MaterialId, u64>,
}

impl CounterInventory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inventory for CounterInventory {
    fn amount_of(&self, material: MaterialId) -> u64 {
        self.counts.get(&material).copied().unwrap_or(0)
    }

    fn add(&mut self, material: MaterialId, delta: u64) {
        *self.counts.entry(material).or_insert(0) += delta;
    }

    fn remove(&mut self, material: MaterialId, delta: u64) -> bool {
        match self.counts.get_mut(&material) {
            Some(n) if *n >= delta => {
                *n -= delta;
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tick report
// ---------------------------------------------------------------------------

/// Everything that happened across one world tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Recipes completed this tick, in instance iteration order.
    pub completions: Vec<(FactoryKey, RecipeId)>,
    /// Session events drained from every instance, tagged with its key.
    pub events: Vec<(FactoryKey, SessionEvent)>,
    /// Output matchers no registered material satisfies. Configuration
    /// smell, surfaced rather than dropped.
    pub unresolved_outputs: Vec<(FactoryKey, MaterialMatcher)>,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Owns the immutable catalog and every running factory instance.
#[derive(Debug)]
pub struct ProductionWorld {
    catalog: Arc<Catalog>,
    factories: SlotMap<FactoryKey, Factory>,
}

impl ProductionWorld {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            factories: SlotMap::with_key(),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn factory_count(&self) -> usize {
        self.factories.len()
    }

    /// Spawn an instance of a registered template. The eligible recipe
    /// subset is resolved here, once, via selector match.
    pub fn spawn(&mut self, template_name: &str) -> Result<FactoryKey, WorldError> {
        let type_id = self
            .catalog
            .factory_type_id(template_name)
            .ok_or_else(|| WorldError::UnknownTemplate(template_name.to_string()))?;
        // Template existence is implied by the id lookup.
        let template = self
            .catalog
            .factory(type_id)
            .ok_or_else(|| WorldError::UnknownTemplate(template_name.to_string()))?;

        let recipes = self.catalog.eligible_recipes(type_id);
        let mut factory = Factory::new(type_id, template.groups.clone(), template.level, recipes);
        factory.start();
        Ok(self.factories.insert(factory))
    }

    pub fn despawn(&mut self, key: FactoryKey) -> Option<Factory> {
        self.factories.remove(key)
    }

    pub fn factory(&self, key: FactoryKey) -> Option<&Factory> {
        self.factories.get(key)
    }

    pub fn factory_mut(&mut self, key: FactoryKey) -> Option<&mut Factory> {
        self.factories.get_mut(key)
    }

    pub fn insert(&mut self, key: FactoryKey, unit: MaterialUnit) -> Result<(), WorldError> {
        self.factories
            .get_mut(key)
            .ok_or(WorldError::StaleFactoryKey)?
            .insert(unit);
        Ok(())
    }

    /// Forward an interaction to one instance, materializing any resulting
    /// completion immediately.
    pub fn push_event(
        &mut self,
        key: FactoryKey,
        event: &FactoryEvent,
    ) -> Result<TickReport, WorldError> {
        let catalog = Arc::clone(&self.catalog);
        let factory = self
            .factories
            .get_mut(key)
            .ok_or(WorldError::StaleFactoryKey)?;

        let mut report = TickReport::default();
        let result = factory.push_event(event, &catalog);
        if let Some(recipe) = result.completed {
            report.completions.push((key, recipe));
            materialize_outputs(&catalog, key, recipe, factory, &mut report);
        }
        for e in factory.drain_events() {
            report.events.push((key, e));
        }
        Ok(report)
    }

    /// Advance every instance by `dt`. Instances are independent; the
    /// shared inventory is only touched later via `collect_outputs_into`.
    pub fn tick(&mut self, dt: Seconds) -> TickReport {
        let catalog = Arc::clone(&self.catalog);
        let mut report = TickReport::default();

        for (key, factory) in self.factories.iter_mut() {
            let result = factory.update(dt, &catalog);
            if let Some(recipe) = result.completed {
                report.completions.push((key, recipe));
                materialize_outputs(&catalog, key, recipe, factory, &mut report);
            }
            for e in factory.drain_events() {
                report.events.push((key, e));
            }
        }

        report
    }

    /// Drain every factory's pending outputs into the inventory counters.
    pub fn collect_outputs_into(&mut self, inventory: &mut impl Inventory) {
        for (_, factory) in self.factories.iter_mut() {
            for unit in factory.extract_all_outputs() {
                inventory.add(unit.material, 1);
            }
        }
    }
}

/// Resolve each output matcher of a completed recipe to a concrete
/// material and deposit it. First match in catalog registration order is
/// the documented, non-authoritative default.
fn materialize_outputs(
    catalog: &Catalog,
    key: FactoryKey,
    recipe: RecipeId,
    factory: &mut Factory,
    report: &mut TickReport,
) {
    let Some(def) = catalog.recipe(recipe) else {
        return;
    };
    for out in &def.outputs {
        match catalog.first_material_matching(out) {
            Some(material) => factory.deposit_output(MaterialUnit::new(material)),
            None => report.unresolved_outputs.push((key, out.clone())),
        }
    }
}
