//! Store — dashboard state containers
//!
//! Each store owns one slice of dashboard state behind an async `RwLock`
//! and exposes the operations the UI calls. Reads take a cheap cloned
//! snapshot; writes go through the gateway (or disk) first and only then
//! commit to memory, so a failed call never leaves half-applied state.

pub mod conversation;
pub mod roster;

pub use conversation::{ChatMessage, ConversationState, ConversationStore};
pub use roster::{
    CourseDraft, FilterUpdate, Filters, RosterState, RosterStore, StudentDraft, StudentUpdate,
};
