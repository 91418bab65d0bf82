//! Runtime for executing conversational turns
//!
//! A turn opens one catalog connection, rebuilds the region alias table from
//! it, validates the incoming state snapshot, runs the transition and hands
//! back the reply with the next snapshot. The connection is released on every
//! exit path when it goes out of scope.

pub mod traits;

#[cfg(test)]
pub mod testing;

pub use traits::*;

use crate::catalog::Catalog;
use crate::dialogue::{
    reply, transition, ConversationState, RegionTable, Stage, StateSnapshot, TransitionError,
    TurnContext, Utterance,
};

/// Reply and next state of one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply: String,
    pub state: StateSnapshot,
    /// The user closed the conversation
    pub ended: bool,
}

/// Run one turn against the catalog database
pub fn handle_turn(
    catalog: &Catalog,
    utterance: &str,
    snapshot: StateSnapshot,
) -> Result<TurnOutcome, TransitionError> {
    let conn = catalog.connect()?;
    run_turn(&conn, utterance, snapshot)
}

/// Run one turn against any catalog store
pub fn run_turn<S: CatalogStore + ?Sized>(
    store: &S,
    utterance: &str,
    snapshot: StateSnapshot,
) -> Result<TurnOutcome, TransitionError> {
    let greeting_sent = snapshot.initial_greeting_sent;
    let state = match ConversationState::try_from(snapshot) {
        Ok(state) => state,
        Err(corrupt) => {
            tracing::warn!(error = %corrupt, "Resetting corrupt conversation state");
            let reset = ConversationState::new(Stage::AwaitingCategory, greeting_sent);
            return Ok(TurnOutcome {
                reply: reply::STATE_ERROR.to_string(),
                state: reset.to_snapshot(),
                ended: false,
            });
        }
    };

    let regions = RegionTable::from_store(store)?;
    let ctx = TurnContext::new(store, &regions);
    let result = transition(&state, &ctx, &Utterance::new(utterance))?;

    tracing::info!(
        from = %state.stage_name(),
        to = %result.new_state.stage_name(),
        "Turn processed"
    );

    Ok(TurnOutcome {
        reply: result.reply,
        state: result.new_state.to_snapshot(),
        ended: result.new_state.is_ended(),
    })
}
