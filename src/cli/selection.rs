//! Interactive stack selection.

use dialoguer::MultiSelect;
use dialoguer::theme::ColorfulTheme;

use crate::models::StackFile;
use crate::services::StackSelector;
use crate::{Error, Result};

const PROMPT: &str = "Select stacks to create notes for";

/// Asks which missing stacks should get a note.
///
/// Every stack starts checked; space toggles, enter confirms and escape
/// cancels with an empty selection.
pub struct TerminalSelector {
    theme: ColorfulTheme,
}

impl Default for TerminalSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalSelector {
    /// Creates a selector using the colorful terminal theme.
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl StackSelector for TerminalSelector {
    fn select(&self, missing: &[StackFile]) -> Result<Vec<StackFile>> {
        let names: Vec<&str> = missing.iter().map(|stack| stack.name.as_str()).collect();
        let defaults = vec![true; names.len()];

        let chosen = MultiSelect::with_theme(&self.theme)
            .with_prompt(PROMPT)
            .items(&names)
            .defaults(&defaults)
            .interact_opt()
            .map_err(|e| Error::OperationFailed {
                operation: "select_stacks".to_string(),
                cause: e.to_string(),
            })?;

        match chosen {
            Some(indices) => Ok(pick_selected(missing, &indices)),
            None => {
                tracing::debug!("Stack selection cancelled");
                Ok(Vec::new())
            },
        }
    }
}

/// Returns the stacks at `indices`, in list order, ignoring out-of-range
/// and repeated indices.
#[must_use]
pub fn pick_selected(stacks: &[StackFile], indices: &[usize]) -> Vec<StackFile> {
    stacks
        .iter()
        .enumerate()
        .filter(|(i, _)| indices.contains(i))
        .map(|(_, stack)| stack.clone())
        .collect()
}
