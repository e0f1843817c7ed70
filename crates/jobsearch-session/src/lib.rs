//! # jobsearch-session
//!
//! Conversational state on top of the ranking engine.
//!
//! - `SessionState`: merges structured intents across turns
//! - `SessionManager`: concurrent session map with idle expiry
//! - `ConversationalSearch`: one turn end to end against the collaborator traits

pub mod conversation;
pub mod manager;
pub mod state;

pub use conversation::ConversationalSearch;
pub use manager::{SessionHandle, SessionManager};
pub use state::{SessionPhase, SessionState, Turn};
