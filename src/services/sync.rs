//! Note synchronization.
//!
//! Matches vault notes to stacks through one frontmatter key, rewrites the
//! compose blocks of matching notes and creates notes for stacks that have
//! none.
//!
//! # Per-note outcomes
//!
//! | Situation | `sync_matching` | Logged at |
//! |-----------|-----------------|-----------|
//! | Key names a fetched stack, note has a compose block | rewritten, counted | DEBUG |
//! | Key missing or not a string | skipped | DEBUG |
//! | Key names no fetched stack | skipped | DEBUG |
//! | No compose block in the note | skipped | INFO |
//! | Read, parse or write failure | skipped | WARN |

use std::collections::{HashMap, HashSet};

use serde_yaml_ng::Value;
use tracing::instrument;

use super::StackGenerator;
use crate::config::Settings;
use crate::models::StackFile;
use crate::parallel::fan_out;
use crate::rendering::{TemplateRenderer, fenced_block, generate_file_name};
use crate::vault::{FrontmatterParser, Vault, join_path};
use crate::{Error, Result};

/// Frontmatter key a template uses to ask for generated tags.
pub const TAGS_KEY: &str = "tags";

/// What note creation is allowed to do beyond rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateCapabilities {
    /// Fill the `tags` key with generated tags when the template declares it.
    pub generate_tags: bool,
}

impl CreateCapabilities {
    /// Capabilities when AI generation is enabled or not.
    #[must_use]
    pub const fn with_ai(enabled: bool) -> Self {
        Self {
            generate_tags: enabled,
        }
    }
}

/// A loaded note template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTemplate {
    /// Raw template text.
    pub text: String,
    /// Whether the template's frontmatter declares `tags`.
    pub declares_tags: bool,
}

impl NoteTemplate {
    /// Wraps template text, inspecting its frontmatter once.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let declares_tags = match FrontmatterParser::parse(&text) {
            Ok((frontmatter, _)) => frontmatter.has_key(TAGS_KEY),
            Err(e) => {
                tracing::warn!("Template frontmatter unreadable, tags disabled: {e}");
                false
            },
        };
        Self {
            text,
            declares_tags,
        }
    }
}

/// Outcome for one note during sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoteOutcome {
    Updated,
    NoKey,
    UnknownStack,
    NoBlock,
}

/// Keeps vault notes in step with fetched stacks.
pub struct NoteSynchronizer<'a> {
    vault: &'a dyn Vault,
    settings: &'a Settings,
    generator: Option<&'a StackGenerator>,
}

impl std::fmt::Debug for NoteSynchronizer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteSynchronizer")
            .field("folder", &self.settings.folder_path)
            .field("key", &self.settings.frontmatter_property)
            .field("generator", &self.generator)
            .finish_non_exhaustive()
    }
}

impl<'a> NoteSynchronizer<'a> {
    /// Creates a synchronizer over `vault`.
    #[must_use]
    pub const fn new(vault: &'a dyn Vault, settings: &'a Settings) -> Self {
        Self {
            vault,
            settings,
            generator: None,
        }
    }

    /// Uses `generator` for `{{about}}` and tags when creating notes.
    #[must_use]
    pub const fn with_generator(mut self, generator: &'a StackGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    fn key(&self) -> &str {
        &self.settings.frontmatter_property
    }

    /// Rewrites the compose blocks of every note whose key names a stack.
    ///
    /// Notes are processed concurrently. Returns the number of notes
    /// rewritten; per-note problems are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error only if the vault cannot be listed.
    #[instrument(skip(self, stacks), fields(operation = "sync_matching", stacks = stacks.len()))]
    pub fn sync_matching(&self, stacks: &[StackFile]) -> Result<usize> {
        let by_name = index_by_name(stacks);
        let notes = self.vault.list(&self.settings.folder_path)?;
        tracing::debug!(notes = notes.len(), "Scanning notes");

        let outcomes = fan_out(&notes, |path| {
            let outcome = self.sync_note(path, &by_name);
            match &outcome {
                Ok(NoteOutcome::Updated) => tracing::debug!(path = %path, "Note updated"),
                Ok(NoteOutcome::NoBlock) => {
                    tracing::info!(path = %path, "Matching note has no compose block, skipped");
                },
                Ok(skipped) => tracing::debug!(path = %path, reason = ?skipped, "Note skipped"),
                Err(e) => tracing::warn!(path = %path, "Failed to sync note: {e}"),
            }
            outcome
        });

        let updated = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, Ok(NoteOutcome::Updated)))
            .count();
        metrics::counter!("stacknotes_notes_updated_total").increment(updated as u64);
        metrics::counter!("stacknotes_notes_skipped_total", "operation" => "sync")
            .increment((notes.len() - updated) as u64);

        tracing::info!(updated, scanned = notes.len(), "Sync finished");
        Ok(updated)
    }

    fn sync_note(&self, path: &str, by_name: &HashMap<&str, &StackFile>) -> Result<NoteOutcome> {
        let content = self.vault.read(path)?;
        let (frontmatter, _) = FrontmatterParser::parse(&content)?;

        let Some(name) = frontmatter.get_str(self.key()) else {
            return Ok(NoteOutcome::NoKey);
        };
        let Some(stack) = by_name.get(name) else {
            return Ok(NoteOutcome::UnknownStack);
        };
        let Some(updated) = fenced_block::replace_all(&content, &stack.content) else {
            return Ok(NoteOutcome::NoBlock);
        };

        if updated != content {
            self.vault.write(path, &updated)?;
        }
        Ok(NoteOutcome::Updated)
    }

    /// Returns the stacks no note names, in fetch order.
    ///
    /// Frontmatter is read concurrently; unreadable notes count as having
    /// no key.
    ///
    /// # Errors
    ///
    /// Returns an error only if the vault cannot be listed.
    #[instrument(skip(self, stacks), fields(operation = "find_missing", stacks = stacks.len()))]
    pub fn find_missing(&self, stacks: &[StackFile]) -> Result<Vec<StackFile>> {
        let notes = self.vault.list(&self.settings.folder_path)?;

        let names: HashSet<String> = fan_out(&notes, |path| match self.vault.frontmatter(path) {
            Ok(frontmatter) => frontmatter.get_str(self.key()).map(str::to_string),
            Err(e) => {
                tracing::warn!(path = %path, "Failed to read frontmatter: {e}");
                None
            },
        })
        .into_iter()
        .flatten()
        .collect();

        let missing: Vec<StackFile> = stacks
            .iter()
            .filter(|stack| !names.contains(&stack.name))
            .cloned()
            .collect();
        tracing::info!(missing = missing.len(), "Computed missing stacks");
        Ok(missing)
    }

    /// Loads the configured note template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no template is configured or it
    /// does not exist, or a read error.
    pub fn load_template(&self) -> Result<NoteTemplate> {
        let path = self
            .settings
            .template_path()
            .ok_or_else(|| Error::Configuration("template file path is not set".to_string()))?;
        if !self.vault.exists(path) {
            return Err(Error::Configuration(format!(
                "template file not found: {path}"
            )));
        }
        self.vault.read(path).map(NoteTemplate::new)
    }

    /// Creates a note for each selected stack from the configured template.
    ///
    /// Stacks are processed one at a time. Existing files are skipped and
    /// per-stack failures are logged without stopping the batch. Tags are
    /// generated only when `capabilities` allow it and the template declares
    /// a `tags` key. Returns the number of notes created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] before touching any stack if the
    /// template is not configured or missing.
    #[instrument(skip(self, selected), fields(operation = "create_from_template", selected = selected.len()))]
    pub fn create_from_template(
        &self,
        selected: &[StackFile],
        capabilities: CreateCapabilities,
    ) -> Result<usize> {
        let template = self.load_template()?;
        let tag_generator = self
            .generator
            .filter(|_| capabilities.generate_tags && template.declares_tags);

        let renderer = self
            .generator
            .map_or_else(TemplateRenderer::new, |generator| {
                TemplateRenderer::new().with_descriptions(generator)
            });

        let mut created = 0;
        for stack in selected {
            match self.create_note(stack, &template, &renderer, tag_generator) {
                Ok(Some(path)) => {
                    tracing::info!(stack = %stack.name, path = %path, "Created note");
                    created += 1;
                },
                Ok(None) => {
                    metrics::counter!("stacknotes_notes_skipped_total", "operation" => "create")
                        .increment(1);
                },
                Err(e) => {
                    tracing::warn!(stack = %stack.name, "Failed to create note: {e}");
                    metrics::counter!("stacknotes_notes_skipped_total", "operation" => "create")
                        .increment(1);
                },
            }
        }

        metrics::counter!("stacknotes_notes_created_total").increment(created as u64);
        Ok(created)
    }

    /// Creates one note; `Ok(None)` when the destination already exists.
    fn create_note(
        &self,
        stack: &StackFile,
        template: &NoteTemplate,
        renderer: &TemplateRenderer<'_>,
        tag_generator: Option<&StackGenerator>,
    ) -> Result<Option<String>> {
        let rendered = renderer.render(&template.text, stack);
        let file_name = generate_file_name(&stack.name, self.settings);
        let path = join_path(&self.settings.folder_path, &file_name);

        if self.vault.exists(&path) {
            tracing::warn!(stack = %stack.name, path = %path, "Note already exists, skipped");
            return Ok(None);
        }

        self.vault.create(&path, &rendered)?;
        self.vault
            .set_frontmatter(&path, self.key(), Value::from(stack.name.as_str()))?;

        if let Some(generator) = tag_generator {
            let tags = generator.tags(stack);
            if !tags.is_empty() {
                self.vault.set_frontmatter(&path, TAGS_KEY, Value::from(tags))?;
            }
        }

        Ok(Some(path))
    }
}

/// Indexes stacks by name; the first stack with a given name wins.
fn index_by_name(stacks: &[StackFile]) -> HashMap<&str, &StackFile> {
    let mut by_name = HashMap::with_capacity(stacks.len());
    for stack in stacks {
        by_name.entry(stack.name.as_str()).or_insert(stack);
    }
    by_name
}
