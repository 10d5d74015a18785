//! Business logic services.
//!
//! Services combine the vault, the stack source and the generator into the
//! operations the CLI exposes.

mod generation;
mod orchestrator;
mod sync;

pub use generation::{DESCRIPTION_SYSTEM_PROMPT, StackGenerator, TAGS_SYSTEM_PROMPT};
pub use orchestrator::{
    ALL_STACKS_HAVE_NOTES, CREATE_FAILED, FETCH_FAILED, NO_MATCHING_NOTES, NO_STACKS,
    NOTHING_SELECTED, Notifier, Orchestrator, Outcome, SCAN_FAILED, SelectAll, StackSelector,
};
pub use sync::{CreateCapabilities, NoteSynchronizer, NoteTemplate, TAGS_KEY};
