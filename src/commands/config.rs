//! Config command handler.

use std::path::PathBuf;

use stacknotes::config::Settings;

use super::ConfigAction;

/// Config command.
pub fn cmd_config(
    mut settings: Settings,
    path: Option<PathBuf>,
    action: ConfigAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            match &path {
                Some(path) if path.exists() => println!("# {}", path.display()),
                Some(path) => println!("# {} (not found, using defaults)", path.display()),
                None => println!("# (no config location, using defaults)"),
            }
            print!("{}", settings.redacted().to_toml()?);
        },
        ConfigAction::Set { assignment } => {
            let (key, value) = assignment
                .split_once('=')
                .ok_or_else(|| format!("expected KEY=VALUE, got '{assignment}'"))?;
            let path = path.ok_or("no configuration path available; pass --config")?;

            settings.set(key.trim(), value)?;
            settings.save(&path)?;
            println!("Set {} in {}", key.trim(), path.display());
        },
        ConfigAction::Path => match path {
            Some(path) => println!("{}", path.display()),
            None => return Err("no configuration path available".into()),
        },
    }

    Ok(())
}
