//! Per-user conversation state.

mod state;
mod store;

pub use state::{ConversationState, ManualStep, Mode, RangeStep};
pub use store::SessionStore;
