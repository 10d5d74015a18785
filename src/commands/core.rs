//! Core command handlers.

use std::process::ExitCode;

use stacknotes::cli::{
    ConsoleNotifier, TerminalSelector, build_generator, build_github_client,
};
use stacknotes::config::Settings;
use stacknotes::github::{StackFetcher, StackSource};
use stacknotes::rendering::generate_file_name;
use stacknotes::services::{
    ALL_STACKS_HAVE_NOTES, CreateCapabilities, NoteSynchronizer, Orchestrator, Outcome,
    SelectAll, StackSelector,
};
use stacknotes::vault::FilesystemVault;

/// Maps a flow outcome to the process exit code.
const fn exit_code(outcome: Outcome) -> ExitCode {
    match outcome {
        Outcome::Failed => ExitCode::FAILURE,
        Outcome::Updated(_) | Outcome::Created(_) | Outcome::NothingToDo => ExitCode::SUCCESS,
    }
}

/// Sync command.
pub fn cmd_sync(settings: &Settings, verbose: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let client = build_github_client(settings)?;
    let fetcher = StackFetcher::new(&client).with_root(&settings.gh_root);
    let vault = FilesystemVault::new(&settings.vault_path);
    let synchronizer = NoteSynchronizer::new(&vault, settings);
    let notifier = ConsoleNotifier::stdout().with_status(verbose);

    let outcome = Orchestrator::new(&fetcher, &synchronizer, &notifier).sync();
    Ok(exit_code(outcome))
}

/// Create command.
pub fn cmd_create(
    settings: &Settings,
    all: bool,
    verbose: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let client = build_github_client(settings)?;
    let fetcher = StackFetcher::new(&client).with_root(&settings.gh_root);
    let vault = FilesystemVault::new(&settings.vault_path);
    let generator = build_generator(settings);
    let mut synchronizer = NoteSynchronizer::new(&vault, settings);
    if generator.is_enabled() {
        synchronizer = synchronizer.with_generator(&generator);
    }
    let notifier = ConsoleNotifier::stdout().with_status(verbose);

    let terminal = TerminalSelector::new();
    let selector: &dyn StackSelector = if all { &SelectAll } else { &terminal };

    let outcome = Orchestrator::new(&fetcher, &synchronizer, &notifier)
        .with_capabilities(CreateCapabilities::with_ai(generator.is_enabled()))
        .create_missing(selector);
    Ok(exit_code(outcome))
}

/// Missing command.
pub fn cmd_missing(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_github_client(settings)?;
    let stacks = StackFetcher::new(&client)
        .with_root(&settings.gh_root)
        .fetch_all_stacks()?;
    let vault = FilesystemVault::new(&settings.vault_path);
    let missing = NoteSynchronizer::new(&vault, settings).find_missing(&stacks)?;

    if missing.is_empty() {
        println!("{ALL_STACKS_HAVE_NOTES}");
        return Ok(());
    }

    println!("{} of {} stacks have no note:", missing.len(), stacks.len());
    for stack in &missing {
        println!("  {:<24} {}", stack.name, generate_file_name(&stack.name, settings));
    }
    Ok(())
}

/// Filename command.
pub fn cmd_filename(settings: &Settings, stack: &str) {
    println!("{}", generate_file_name(stack, settings));
}
