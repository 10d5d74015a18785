//! Data models for stacknotes.
//!
//! Values that flow between the fetcher, the renderer and the synchronizer.

mod stack;

pub use stack::{StackFile, UNKNOWN_STACK_NAME, stack_name_from_path};
