//! Terminal-facing pieces shared by the binary.
//!
//! | Item | Role |
//! |------|------|
//! | [`TerminalSelector`] | multi-select prompt for stacks without notes |
//! | [`ConsoleNotifier`] | prints notifications and progress lines |
//! | [`build_github_client`] / [`build_generator`] | clients built from [`Settings`](crate::config::Settings) |

mod factory;
mod notifier;
mod selection;

pub use factory::{build_generator, build_github_client, build_openai_client};
pub use notifier::ConsoleNotifier;
pub use selection::{TerminalSelector, pick_selected};
