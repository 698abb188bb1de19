//! Factory events.
//!
//! Two closed sum types: [`FactoryEvent`] is what the game pushes *into* a
//! factory (interactive recipes driven by discrete actions), and
//! [`SessionEvent`] is what the factory emits for the game to drain in
//! batch after a tick.

use crate::id::RecipeId;
use crate::time::Seconds;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input events
// ---------------------------------------------------------------------------

/// A discrete interaction forwarded to the active session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FactoryEvent {
    /// A named action contributing `amount` progress to a manual recipe
    /// waiting on that action id.
    Action { action_id: String, amount: Seconds },

    /// A raw press interaction. Contributes `strength` progress to any
    /// manual session regardless of its action id.
    Press { button: u8, strength: Seconds },
}

// ---------------------------------------------------------------------------
// Emitted events
// ---------------------------------------------------------------------------

/// Session lifecycle notifications, buffered per factory and drained by
/// the owning game loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A session was created for `recipe`.
    Started { recipe: RecipeId },

    /// The session completed normally.
    Completed { recipe: RecipeId, elapsed: Seconds },

    /// The session has run past its window maximum. Emitted on every
    /// update spent in the after-max phase.
    OverProcessed { recipe: RecipeId, elapsed: Seconds },

    /// The session was discarded without completing (factory stopped).
    Aborted { recipe: RecipeId, elapsed: Seconds },
}
