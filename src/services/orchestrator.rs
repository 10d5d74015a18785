//! The two user-triggered flows: sync existing notes and create missing ones.
//!
//! Every outcome ends in exactly one notification. Details go to the log;
//! notifications stay short.

use tracing::instrument;

use super::{CreateCapabilities, NoteSynchronizer};
use crate::github::StackSource;
use crate::models::StackFile;
use crate::{Error, Result};

/// Notification shown when fetching stacks fails.
pub const FETCH_FAILED: &str = "Failed to fetch stacks from GitHub. See the log for details.";

/// Notification shown when the repository has no stacks.
pub const NO_STACKS: &str = "No stacks found in the repository.";

/// Notification shown when no note matched any stack.
pub const NO_MATCHING_NOTES: &str = "No matching notes found to update.";

/// Notification shown when every stack already has a note.
pub const ALL_STACKS_HAVE_NOTES: &str = "All stacks already have notes.";

/// Notification shown when the selection is empty.
pub const NOTHING_SELECTED: &str = "No stacks selected. Nothing to create.";

/// Notification shown when the vault cannot be scanned.
pub const SCAN_FAILED: &str = "Failed to scan notes. See the log for details.";

/// Notification shown when note creation failed unexpectedly.
pub const CREATE_FAILED: &str = "Failed to create notes. See the log for details.";

/// Receives user-facing status messages.
pub trait Notifier {
    /// Shows a terminal notification.
    fn notify(&self, message: &str);

    /// Shows transient progress text.
    fn status(&self, message: &str) {
        let _ = message;
    }
}

/// Lets the user choose which missing stacks get notes.
pub trait StackSelector {
    /// Returns the chosen subset of `missing`, possibly empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection could not be obtained.
    fn select(&self, missing: &[StackFile]) -> Result<Vec<StackFile>>;
}

/// Selector that accepts every stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectAll;

impl StackSelector for SelectAll {
    fn select(&self, missing: &[StackFile]) -> Result<Vec<StackFile>> {
        Ok(missing.to_vec())
    }
}

/// Result of one triggered flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Notes updated by a sync.
    Updated(usize),
    /// Notes created.
    Created(usize),
    /// Stopped early without an error (nothing to do).
    NothingToDo,
    /// Stopped because of an error, already reported.
    Failed,
}

/// Wires fetching, synchronization and selection together.
pub struct Orchestrator<'a> {
    source: &'a dyn StackSource,
    synchronizer: &'a NoteSynchronizer<'a>,
    notifier: &'a dyn Notifier,
    capabilities: CreateCapabilities,
}

impl<'a> Orchestrator<'a> {
    /// Creates an orchestrator.
    #[must_use]
    pub fn new(
        source: &'a dyn StackSource,
        synchronizer: &'a NoteSynchronizer<'a>,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            source,
            synchronizer,
            notifier,
            capabilities: CreateCapabilities::default(),
        }
    }

    /// Sets the capabilities passed to note creation.
    #[must_use]
    pub const fn with_capabilities(mut self, capabilities: CreateCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Fetches stacks, reporting failures and empty results.
    fn fetch(&self) -> std::result::Result<Vec<StackFile>, Outcome> {
        self.notifier.status("Fetching stacks from GitHub...");
        match self.source.fetch_all_stacks() {
            Ok(stacks) if stacks.is_empty() => {
                self.notifier.notify(NO_STACKS);
                Err(Outcome::NothingToDo)
            },
            Ok(stacks) => Ok(stacks),
            Err(e) => {
                tracing::error!("Fetching stacks failed: {e}");
                self.notifier.notify(FETCH_FAILED);
                Err(Outcome::Failed)
            },
        }
    }

    /// Updates the compose blocks of notes that name a fetched stack.
    #[instrument(skip(self), fields(operation = "sync"))]
    pub fn sync(&self) -> Outcome {
        let stacks = match self.fetch() {
            Ok(stacks) => stacks,
            Err(outcome) => return outcome,
        };

        self.notifier
            .status(&format!("Syncing {} stacks...", stacks.len()));
        match self.synchronizer.sync_matching(&stacks) {
            Ok(0) => {
                self.notifier.notify(NO_MATCHING_NOTES);
                Outcome::Updated(0)
            },
            Ok(updated) => {
                self.notifier.notify(&format!(
                    "{updated} {} updated.",
                    plural(updated, "note", "notes")
                ));
                Outcome::Updated(updated)
            },
            Err(e) => {
                tracing::error!("Sync failed: {e}");
                self.notifier.notify(SCAN_FAILED);
                Outcome::Failed
            },
        }
    }

    /// Creates notes for stacks without one, after asking `selector` which.
    #[instrument(skip(self, selector), fields(operation = "create_missing"))]
    pub fn create_missing(&self, selector: &dyn StackSelector) -> Outcome {
        let stacks = match self.fetch() {
            Ok(stacks) => stacks,
            Err(outcome) => return outcome,
        };

        let missing = match self.synchronizer.find_missing(&stacks) {
            Ok(missing) => missing,
            Err(e) => {
                tracing::error!("Finding missing stacks failed: {e}");
                self.notifier.notify(SCAN_FAILED);
                return Outcome::Failed;
            },
        };
        if missing.is_empty() {
            self.notifier.notify(ALL_STACKS_HAVE_NOTES);
            return Outcome::NothingToDo;
        }

        let selected = match selector.select(&missing) {
            Ok(selected) => selected,
            Err(e) => {
                tracing::error!("Selection failed: {e}");
                self.notifier.notify(CREATE_FAILED);
                return Outcome::Failed;
            },
        };
        if selected.is_empty() {
            self.notifier.notify(NOTHING_SELECTED);
            return Outcome::NothingToDo;
        }

        self.notifier
            .status(&format!("Creating {} notes...", selected.len()));
        match self
            .synchronizer
            .create_from_template(&selected, self.capabilities)
        {
            Ok(created) => {
                self.notifier.notify(&format!(
                    "Created {created} new {}.",
                    plural(created, "note", "notes")
                ));
                Outcome::Created(created)
            },
            Err(Error::Configuration(reason)) => {
                tracing::error!("Note creation not configured: {reason}");
                self.notifier
                    .notify(&format!("Cannot create notes: {reason}."));
                Outcome::Created(0)
            },
            Err(e) => {
                tracing::error!("Creating notes failed: {e}");
                self.notifier.notify(CREATE_FAILED);
                Outcome::Failed
            },
        }
    }
}

const fn plural<'s>(count: usize, one: &'s str, many: &'s str) -> &'s str {
    if count == 1 { one } else { many }
}
