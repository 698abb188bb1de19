//! The factory process state machine.
//!
//! A factory instance is Idle (no session) or Active (exactly one
//! [`Session`]). Each tick the owning loop calls [`Factory::update`]; if
//! idle, the factory scans its eligible recipes for one whose inputs can
//! be claimed from the current contents and starts a session for the most
//! specific candidate. Completion consumes the claimed inputs and reports
//! the finished recipe in the [`TickResult`]; materializing concrete
//! outputs from the recipe's output matchers is the caller's job (see
//! [`crate::world::ProductionWorld`]), the state machine never picks
//! winning materials itself.
//!
//! Instances are single-threaded by design: the owning game loop must
//! serialize `update`/`push_event`/`insert` per instance. Distinct
//! instances are independent.

use crate::catalog::Catalog;
use crate::event::{FactoryEvent, SessionEvent};
use crate::id::{FactoryTypeId, GroupId, RecipeId};
use crate::material::MaterialUnit;
use crate::recipe::{ProcessKind, Recipe};
use crate::time::{Fixed64, Phase, Seconds};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Runtime record of the currently executing recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub recipe: RecipeId,
    /// Monotonically non-decreasing while the session is active.
    pub elapsed: Seconds,
    /// Accumulated progress for manual recipes; unused for timed ones.
    pub progress: Fixed64,
    /// Content indices claimed at session start, in input order. Valid for
    /// the session's lifetime: `insert` only appends and claims are only
    /// removed at completion.
    claimed: Vec<usize>,
}

impl Session {
    fn new(recipe: RecipeId, claimed: Vec<usize>) -> Self {
        Self {
            recipe,
            elapsed: Seconds::ZERO,
            progress: Fixed64::ZERO,
            claimed,
        }
    }

    /// Phase of this session under the given recipe.
    fn phase(&self, recipe: &Recipe) -> Phase {
        match recipe.time_window() {
            Some(w) => w.phase(self.elapsed),
            None => Phase::InWindow,
        }
    }
}

// ---------------------------------------------------------------------------
// Tick result
// ---------------------------------------------------------------------------

/// Outcome of a single `update` or `push_event` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    /// Recipe a session was started for during this call.
    pub started: Option<RecipeId>,
    /// Recipe whose session completed during this call.
    pub completed: Option<RecipeId>,
    /// Input units consumed by the completed session.
    pub consumed: Vec<MaterialUnit>,
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// A running production facility instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Factory {
    factory_type: FactoryTypeId,
    groups: BTreeSet<GroupId>,
    level: u32,
    contents: Vec<MaterialUnit>,
    pending_outputs: Vec<MaterialUnit>,
    /// Eligible recipe subset, resolved once at creation.
    recipes: Vec<RecipeId>,
    operating: bool,
    session: Option<Session>,
    events: Vec<SessionEvent>,
}

impl Factory {
    /// Create an instance with an already-resolved eligible recipe subset.
    /// Usually called through [`crate::world::ProductionWorld::spawn`].
    pub fn new(
        factory_type: FactoryTypeId,
        groups: BTreeSet<GroupId>,
        level: u32,
        recipes: Vec<RecipeId>,
    ) -> Self {
        Self {
            factory_type,
            groups,
            level,
            contents: Vec::new(),
            pending_outputs: Vec::new(),
            recipes,
            operating: false,
            session: None,
            events: Vec::new(),
        }
    }

    // -- identity --

    pub fn factory_type(&self) -> FactoryTypeId {
        self.factory_type
    }

    pub fn groups(&self) -> &BTreeSet<GroupId> {
        &self.groups
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn eligible_recipes(&self) -> &[RecipeId] {
        &self.recipes
    }

    // -- state accessors --

    pub fn is_operating(&self) -> bool {
        self.operating
    }

    pub fn contents(&self) -> &[MaterialUnit] {
        &self.contents
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn pending_output_count(&self) -> usize {
        self.pending_outputs.len()
    }

    // -- operations --

    pub fn start(&mut self) {
        self.operating = true;
    }

    /// Stop operating. Any active session is abandoned, not refunded: the
    /// claimed inputs stay in `contents`.
    pub fn stop(&mut self) {
        self.operating = false;
        if let Some(session) = self.session.take() {
            self.events.push(SessionEvent::Aborted {
                recipe: session.recipe,
                elapsed: session.elapsed,
            });
        }
    }

    /// Append a unit to the contents. Always succeeds; no capacity is
    /// enforced at this layer.
    pub fn insert(&mut self, unit: MaterialUnit) {
        self.contents.push(unit);
    }

    /// Game-layer entry point for materialized outputs.
    pub fn deposit_output(&mut self, unit: MaterialUnit) {
        self.pending_outputs.push(unit);
    }

    /// Atomically drain the pending outputs. Idempotent: a second call
    /// with nothing produced since returns empty.
    pub fn extract_all_outputs(&mut self) -> Vec<MaterialUnit> {
        std::mem::take(&mut self.pending_outputs)
    }

    /// Drain buffered session events.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the active session by `dt` seconds. Negative `dt` is a
    /// caller bug; clamping frame-time spikes also belongs to the caller.
    pub fn update(&mut self, dt: Seconds, catalog: &Catalog) -> TickResult {
        debug_assert!(dt >= Seconds::ZERO, "negative dt passed to Factory::update");

        let mut result = TickResult::default();
        if !self.operating {
            return result;
        }

        self.ensure_session(catalog, &mut result);
        let Some(session) = self.session.as_mut() else {
            return result;
        };

        session.elapsed += dt;

        let Some(recipe) = catalog.recipe(session.recipe) else {
            return result;
        };

        let phase = session.phase(recipe);
        if phase == Phase::AfterMax {
            self.events.push(SessionEvent::OverProcessed {
                recipe: session.recipe,
                elapsed: session.elapsed,
            });
        }

        if try_complete(session, recipe) {
            self.complete_session(&mut result);
        }

        result
    }

    /// Forward a discrete interaction to the active session, then
    /// re-evaluate completion. No-op while not operating; this keeps the
    /// tick loop exception-free.
    pub fn push_event(&mut self, event: &FactoryEvent, catalog: &Catalog) -> TickResult {
        let mut result = TickResult::default();
        if !self.operating {
            return result;
        }

        self.ensure_session(catalog, &mut result);
        let Some(session) = self.session.as_mut() else {
            return result;
        };
        let Some(recipe) = catalog.recipe(session.recipe) else {
            return result;
        };

        if let ProcessKind::Manual { action, .. } = &recipe.process {
            match event {
                FactoryEvent::Action { action_id, amount } if action_id == action => {
                    session.progress += *amount;
                }
                // Raw presses drive any manual session.
                FactoryEvent::Press { strength, .. } => {
                    session.progress += *strength;
                }
                FactoryEvent::Action { .. } => {}
            }
        }

        if try_complete(session, recipe) {
            self.complete_session(&mut result);
        }

        result
    }

    // -- internals --

    /// Scan the eligible subset and start a session for the best startable
    /// recipe. Selection is the lexicographic maximum of (priority,
    /// specificity, input count); remaining ties go to the smallest recipe
    /// id so catalog iteration order never changes the outcome.
    fn ensure_session(&mut self, catalog: &Catalog, result: &mut TickResult) {
        if self.session.is_some() {
            return;
        }

        let best = self
            .recipes
            .iter()
            .filter_map(|&id| {
                let recipe = catalog.recipe(id)?;
                let claimed = recipe.match_inputs(&self.contents, catalog)?;
                Some((id, recipe, claimed))
            })
            .max_by(|(a_id, a, _), (b_id, b, _)| {
                (a.priority, a.specificity_score(), a.input_count())
                    .cmp(&(b.priority, b.specificity_score(), b.input_count()))
                    .then_with(|| b_id.cmp(a_id))
            });

        if let Some((id, _, claimed)) = best {
            self.session = Some(Session::new(id, claimed));
            self.events.push(SessionEvent::Started { recipe: id });
            result.started = Some(id);
        }
    }

    /// Clear the session, consume its claimed inputs and record the
    /// completion. Claimed indices are removed highest-first so earlier
    /// removals do not shift later ones.
    fn complete_session(&mut self, result: &mut TickResult) {
        let Some(session) = self.session.take() else {
            return;
        };

        let mut indices = session.claimed;
        indices.sort_unstable_by(|a, b| b.cmp(a));
        for idx in indices {
            if idx < self.contents.len() {
                result.consumed.push(self.contents.remove(idx));
            }
        }
        result.consumed.reverse();

        self.events.push(SessionEvent::Completed {
            recipe: session.recipe,
            elapsed: session.elapsed,
        });
        result.completed = Some(session.recipe);
    }
}

/// Completion check. Timed recipes complete once elapsed reaches the
/// window minimum; manual recipes once accumulated progress reaches the
/// required amount.
fn try_complete(session: &Session, recipe: &Recipe) -> bool {
    match &recipe.process {
        ProcessKind::Timed(window) => !window.before_min(session.elapsed),
        ProcessKind::Manual { required, .. } => session.progress >= *required,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;
    use crate::id::MaterialId;
    use crate::matcher::MaterialMatcher;
    use crate::time::{TimeWindow, secs};

    // Helpers ---------------------------------------------------------------

    struct Fixture {
        catalog: Catalog,
        ore: MaterialId,
        coal: MaterialId,
    }

    /// Furnace catalog: smelt(ore -> ingot, 2..4s), roast(any metal ->
    /// ingot, 1..8s), carve(ingot -> blade, manual "chisel" x3).
    fn fixture() -> Fixture {
        let mut b = CatalogBuilder::new();
        let metal = b.category("metal");
        let ore = b.register_material("ore", [metal]).unwrap();
        let coal = b.register_material("coal", []).unwrap();
        let ingot = b.register_material("ingot", [metal]).unwrap();
        let blade = b.register_material("blade", []).unwrap();

        b.register_recipe(
            Recipe::new(
                "smelt",
                ProcessKind::Timed(TimeWindow::new(secs(2.0), secs(4.0)).unwrap()),
            )
            .with_inputs([MaterialMatcher::id(ore)])
            .with_outputs([MaterialMatcher::id(ingot)])
            .with_cost(1),
        )
        .unwrap();

        b.register_recipe(
            Recipe::new(
                "roast",
                ProcessKind::Timed(TimeWindow::new(secs(1.0), secs(8.0)).unwrap()),
            )
            .with_inputs([MaterialMatcher::any_of([metal]).unwrap()])
            .with_outputs([MaterialMatcher::id(ingot)])
            .with_cost(1),
        )
        .unwrap();

        b.register_recipe(
            Recipe::new(
                "carve",
                ProcessKind::Manual {
                    action: "chisel".into(),
                    required: secs(3.0),
                },
            )
            .with_inputs([MaterialMatcher::id(ingot)])
            .with_outputs([MaterialMatcher::id(blade)])
            .with_cost(2),
        )
        .unwrap();

        Fixture {
            catalog: b.build().unwrap(),
            ore,
            coal,
        }
    }

    fn factory(recipes: Vec<RecipeId>) -> Factory {
        let mut f = Factory::new(FactoryTypeId(0), BTreeSet::new(), 1, recipes);
        f.start();
        f
    }

    fn all_recipes() -> Vec<RecipeId> {
        vec![RecipeId(0), RecipeId(1), RecipeId(2)]
    }

    // -----------------------------------------------------------------------
    // Idle behaviour
    // -----------------------------------------------------------------------

    #[test]
    fn idle_factory_produces_nothing() {
        let fx = fixture();
        let mut f = factory(all_recipes());
        for _ in 0..10 {
            let r = f.update(secs(1.0), &fx.catalog);
            assert!(r.completed.is_none());
        }
        assert!(f.extract_all_outputs().is_empty());
    }

    #[test]
    fn not_operating_factory_ignores_everything() {
        let fx = fixture();
        let mut f = Factory::new(FactoryTypeId(0), BTreeSet::new(), 1, all_recipes());
        f.insert(MaterialUnit::new(fx.ore));

        let r = f.update(secs(10.0), &fx.catalog);
        assert_eq!(r, TickResult::default());
        assert!(f.session().is_none());

        let r = f.push_event(
            &FactoryEvent::Action {
                action_id: "chisel".into(),
                amount: secs(5.0),
            },
            &fx.catalog,
        );
        assert_eq!(r, TickResult::default());
    }

    // -----------------------------------------------------------------------
    // Timed sessions
    // -----------------------------------------------------------------------

    #[test]
    fn timed_recipe_completes_at_window_min() {
        let fx = fixture();
        let mut f = factory(vec![RecipeId(0)]);
        f.insert(MaterialUnit::new(fx.ore));

        // First tick starts the session; 0.5s elapsed, before min.
        let r = f.update(secs(0.5), &fx.catalog);
        assert_eq!(r.started, Some(RecipeId(0)));
        assert!(r.completed.is_none());

        let r = f.update(secs(1.0), &fx.catalog);
        assert!(r.completed.is_none());

        // 2.0s total: window min reached.
        let r = f.update(secs(0.5), &fx.catalog);
        assert_eq!(r.completed, Some(RecipeId(0)));
        assert_eq!(r.consumed, vec![MaterialUnit::new(fx.ore)]);
        assert!(f.contents().is_empty());
        assert!(f.session().is_none());
    }

    #[test]
    fn over_processed_event_past_window_max() {
        let fx = fixture();
        let mut f = factory(vec![RecipeId(0)]);
        f.insert(MaterialUnit::new(fx.ore));

        // One huge tick shoots past max; completion still happens, and the
        // over-processed notice is emitted first.
        let r = f.update(secs(100.0), &fx.catalog);
        assert_eq!(r.completed, Some(RecipeId(0)));

        let events = f.drain_events();
        assert!(matches!(events[0], SessionEvent::Started { .. }));
        assert!(matches!(events[1], SessionEvent::OverProcessed { .. }));
        assert!(matches!(events[2], SessionEvent::Completed { .. }));
    }

    #[test]
    fn zero_dt_is_valid() {
        let fx = fixture();
        let mut f = factory(vec![RecipeId(0)]);
        f.insert(MaterialUnit::new(fx.ore));

        let r = f.update(secs(0.0), &fx.catalog);
        assert_eq!(r.started, Some(RecipeId(0)));
        assert!(r.completed.is_none());
    }

    // -----------------------------------------------------------------------
    // Selection determinism
    // -----------------------------------------------------------------------

    #[test]
    fn higher_specificity_recipe_wins() {
        let fx = fixture();
        // Ore matches both smelt (ID matcher, specificity 1000) and roast
        // (category matcher, 100). Smelt must win regardless of the order
        // the eligible subset is scanned in.
        for recipes in [vec![RecipeId(0), RecipeId(1)], vec![RecipeId(1), RecipeId(0)]] {
            let mut f = factory(recipes);
            f.insert(MaterialUnit::new(fx.ore));
            let r = f.update(secs(0.0), &fx.catalog);
            assert_eq!(r.started, Some(RecipeId(0)));
        }
    }

    #[test]
    fn equal_candidates_tie_break_on_smallest_id() {
        let mut b = CatalogBuilder::new();
        let ore = b.register_material("ore", []).unwrap();
        let ingot = b.register_material("ingot", []).unwrap();
        for name in ["a", "b"] {
            b.register_recipe(
                Recipe::new(
                    name,
                    ProcessKind::Timed(TimeWindow::new(secs(1.0), secs(2.0)).unwrap()),
                )
                .with_inputs([MaterialMatcher::id(ore)])
                .with_outputs([MaterialMatcher::id(ingot)]),
            )
            .unwrap();
        }
        let catalog = b.build().unwrap();

        for recipes in [vec![RecipeId(0), RecipeId(1)], vec![RecipeId(1), RecipeId(0)]] {
            let mut f = factory(recipes);
            f.insert(MaterialUnit::new(ore));
            let r = f.update(secs(0.0), &catalog);
            assert_eq!(r.started, Some(RecipeId(0)));
        }
    }

    #[test]
    fn no_session_when_inputs_missing() {
        let fx = fixture();
        let mut f = factory(vec![RecipeId(0)]);
        f.insert(MaterialUnit::new(fx.coal)); // smelt wants ore

        let r = f.update(secs(1.0), &fx.catalog);
        assert!(r.started.is_none());
        assert!(f.session().is_none());
    }

    // -----------------------------------------------------------------------
    // Manual sessions
    // -----------------------------------------------------------------------

    #[test]
    fn manual_recipe_needs_accumulated_actions() {
        let fx = fixture();
        let ingot = fx.catalog.material_id("ingot").unwrap();
        let mut f = factory(vec![RecipeId(2)]);
        f.insert(MaterialUnit::new(ingot));

        // Time alone never completes a manual session.
        for _ in 0..50 {
            let r = f.update(secs(1.0), &fx.catalog);
            assert!(r.completed.is_none());
        }

        let chisel = |amount: f64| FactoryEvent::Action {
            action_id: "chisel".into(),
            amount: secs(amount),
        };

        assert!(f.push_event(&chisel(1.0), &fx.catalog).completed.is_none());
        assert!(f.push_event(&chisel(1.0), &fx.catalog).completed.is_none());
        let r = f.push_event(&chisel(1.0), &fx.catalog);
        assert_eq!(r.completed, Some(RecipeId(2)));
        assert_eq!(r.consumed, vec![MaterialUnit::new(ingot)]);
    }

    #[test]
    fn mismatched_action_contributes_nothing() {
        let fx = fixture();
        let ingot = fx.catalog.material_id("ingot").unwrap();
        let mut f = factory(vec![RecipeId(2)]);
        f.insert(MaterialUnit::new(ingot));

        let r = f.push_event(
            &FactoryEvent::Action {
                action_id: "hammer".into(),
                amount: secs(99.0),
            },
            &fx.catalog,
        );
        assert!(r.completed.is_none());
        assert_eq!(f.session().unwrap().progress, secs(0.0));
    }

    #[test]
    fn press_drives_manual_session() {
        let fx = fixture();
        let ingot = fx.catalog.material_id("ingot").unwrap();
        let mut f = factory(vec![RecipeId(2)]);
        f.insert(MaterialUnit::new(ingot));

        let press = FactoryEvent::Press {
            button: 0,
            strength: secs(1.5),
        };
        assert!(f.push_event(&press, &fx.catalog).completed.is_none());
        let r = f.push_event(&press, &fx.catalog);
        assert_eq!(r.completed, Some(RecipeId(2)));
    }

    // -----------------------------------------------------------------------
    // Stop / extract
    // -----------------------------------------------------------------------

    #[test]
    fn stop_abandons_session_without_refund() {
        let fx = fixture();
        let mut f = factory(vec![RecipeId(0)]);
        f.insert(MaterialUnit::new(fx.ore));
        f.update(secs(1.0), &fx.catalog);
        assert!(f.session().is_some());

        f.stop();
        assert!(f.session().is_none());
        // Claimed input stays put.
        assert_eq!(f.contents().len(), 1);
        assert!(
            f.drain_events()
                .iter()
                .any(|e| matches!(e, SessionEvent::Aborted { .. }))
        );
    }

    #[test]
    fn extract_is_idempotent() {
        let fx = fixture();
        let mut f = factory(vec![]);
        f.deposit_output(MaterialUnit::new(fx.ore));
        assert_eq!(f.extract_all_outputs().len(), 1);
        assert!(f.extract_all_outputs().is_empty());
    }

    #[test]
    fn insert_during_session_does_not_shift_claims() {
        let fx = fixture();
        let mut f = factory(vec![RecipeId(0)]);
        f.insert(MaterialUnit::new(fx.ore));
        f.update(secs(1.0), &fx.catalog);

        // More material arrives mid-session.
        f.insert(MaterialUnit::new(fx.coal));
        f.insert(MaterialUnit::new(fx.ore));

        let r = f.update(secs(1.0), &fx.catalog);
        assert_eq!(r.completed, Some(RecipeId(0)));
        // Only the originally claimed ore was consumed.
        assert_eq!(r.consumed, vec![MaterialUnit::new(fx.ore)]);
        assert_eq!(f.contents().len(), 2);
    }
}
