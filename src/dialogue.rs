//! Guided dialogue engine
//!
//! Pure stage transitions over a typed conversation state, in the Elm
//! Architecture style: `(state, input) -> (state', reply)`.

mod region;
pub mod reply;
pub mod state;
mod transition;
mod utterance;

#[cfg(test)]
mod proptests;

pub use region::RegionTable;
pub use state::{ConversationState, Stage, StageName, StateSnapshot};
pub use transition::{transition, TransitionError, TurnContext};
pub use utterance::Utterance;
