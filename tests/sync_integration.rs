//! End-to-end sync and create flows over a vault directory on disk.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use stacknotes::config::Settings;
use stacknotes::github::StackSource;
use stacknotes::services::{
    ALL_STACKS_HAVE_NOTES, NoteSynchronizer, Notifier, Orchestrator, Outcome, SelectAll,
};
use stacknotes::vault::{FilesystemVault, Vault};
use stacknotes::{Result, StackFile};
use tempfile::TempDir;

struct FixedSource(Vec<StackFile>);

impl StackSource for FixedSource {
    fn fetch_all_stacks(&self) -> Result<Vec<StackFile>> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct Recorder(RefCell<Vec<String>>);

impl Notifier for Recorder {
    fn notify(&self, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }
}

fn stack(name: &str) -> StackFile {
    StackFile::new(name, format!("services:\n  {name}:\n    image: {name}:latest\n"))
}

fn note(key: Option<&str>, block: &str) -> String {
    let frontmatter = key.map_or_else(String::new, |name| {
        format!("---\nstackName: {name}\n---\n")
    });
    format!("{frontmatter}# Notes\n\n```yml title=docker-compose.yml\n{block}\n```\n\nKeep me.\n")
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn settings(root: &Path) -> Settings {
    Settings {
        vault_path: root.to_path_buf(),
        folder_path: "Homelab".to_string(),
        template_file_path: "Templates/Stack.md".to_string(),
        ..Settings::default()
    }
}

#[test]
fn test_sync_updates_only_matching_notes() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "Homelab/Gitea.md", &note(Some("gitea"), "old: gitea"));
    write(root, "Homelab/Media/Jellyfin.md", &note(Some("jellyfin"), "old: jellyfin"));
    write(root, "Homelab/Traefik.md", &note(Some("traefik"), "old: traefik"));
    write(root, "Homelab/Retired.md", &note(Some("retired"), "old: retired"));
    write(root, "Homelab/Scratch.md", &note(None, "old: scratch"));
    write(root, "Elsewhere/Gitea.md", &note(Some("gitea"), "old: elsewhere"));

    let settings = settings(root);
    let vault = FilesystemVault::new(root);
    let synchronizer = NoteSynchronizer::new(&vault, &settings);
    let source = FixedSource(vec![stack("gitea"), stack("jellyfin"), stack("traefik")]);
    let notifier = Recorder::default();

    let outcome = Orchestrator::new(&source, &synchronizer, &notifier).sync();

    assert_eq!(outcome, Outcome::Updated(3));
    assert_eq!(notifier.0.borrow().as_slice(), ["3 notes updated."]);

    let gitea = fs::read_to_string(root.join("Homelab/Gitea.md")).unwrap();
    assert!(gitea.contains("```yaml title=compose.yaml\nservices:\n  gitea:"));
    assert!(gitea.ends_with("```\n\nKeep me.\n"));
    assert!(!gitea.contains("old: gitea"));

    for untouched in ["Homelab/Retired.md", "Homelab/Scratch.md", "Elsewhere/Gitea.md"] {
        let text = fs::read_to_string(root.join(untouched)).unwrap();
        assert!(text.contains("```yml title=docker-compose.yml"), "{untouched} changed");
    }
}

#[test]
fn test_sync_five_notes_three_matching() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    for name in ["gitea", "jellyfin", "traefik"] {
        write(root, &format!("Homelab/{name}.md"), &note(Some(name), "old: block"));
    }
    let unkeyed = note(None, "old: scratch");
    let blockless = "---\nstackName: gitea\n---\n# Gitea backups\n\nNo compose file here.\n";
    write(root, "Homelab/Scratch.md", &unkeyed);
    write(root, "Homelab/Gitea Backups.md", blockless);

    let settings = settings(root);
    let vault = FilesystemVault::new(root);
    let synchronizer = NoteSynchronizer::new(&vault, &settings);
    let stacks = [stack("gitea"), stack("jellyfin"), stack("traefik")];

    assert_eq!(synchronizer.sync_matching(&stacks).unwrap(), 3);

    for stack in &stacks {
        let text = fs::read_to_string(root.join(format!("Homelab/{}.md", stack.name))).unwrap();
        let block = format!("```yaml title=compose.yaml\n{}```\n", stack.content);
        assert!(text.contains(&block), "{} not rewritten", stack.name);
    }
    assert_eq!(fs::read_to_string(root.join("Homelab/Scratch.md")).unwrap(), unkeyed);
    assert_eq!(
        fs::read_to_string(root.join("Homelab/Gitea Backups.md")).unwrap(),
        blockless
    );
}

#[test]
fn test_create_missing_from_template() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "Templates/Stack.md",
        "---\ntype: stack\n---\n# {{stackName}}\n\n{{about}}\n\n```yaml title=compose.yaml\n```\n",
    );
    write(root, "Homelab/A.md", &note(Some("a"), "x: 1"));
    write(root, "Homelab/C.md", &note(Some("c"), "x: 1"));

    let settings = settings(root);
    let vault = FilesystemVault::new(root);
    let synchronizer = NoteSynchronizer::new(&vault, &settings);
    let source = FixedSource(vec![stack("a"), stack("b"), stack("c")]);
    let notifier = Recorder::default();
    let orchestrator = Orchestrator::new(&source, &synchronizer, &notifier);

    assert_eq!(orchestrator.create_missing(&SelectAll), Outcome::Created(1));

    let created = vault.read("Homelab/B.md").unwrap();
    assert!(created.starts_with("---\ntype: stack\nstackName: b\n---\n# b\n"));
    assert!(created.contains("Write description here"));
    assert!(created.contains("```yaml title=compose.yaml\nservices:\n  b:\n    image: b:latest\n```"));

    assert_eq!(orchestrator.create_missing(&SelectAll), Outcome::NothingToDo);
    assert_eq!(
        notifier.0.borrow().as_slice(),
        ["Created 1 new note.", ALL_STACKS_HAVE_NOTES]
    );
}

#[test]
fn test_create_without_template_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("Homelab")).unwrap();

    let settings = settings(root);
    let vault = FilesystemVault::new(root);
    let synchronizer = NoteSynchronizer::new(&vault, &settings);
    let source = FixedSource(vec![stack("gitea")]);
    let notifier = Recorder::default();

    let outcome = Orchestrator::new(&source, &synchronizer, &notifier).create_missing(&SelectAll);

    assert_eq!(outcome, Outcome::Created(0));
    assert!(notifier.0.borrow()[0].starts_with("Cannot create notes:"));
    assert!(!vault.exists("Homelab/Gitea.md"));
}
