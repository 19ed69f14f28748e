use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;

use super::Workspace;

const STDIO: &str = "-";

pub fn export(workspace: &Workspace, output: Option<PathBuf>) -> Result<()> {
    let json = workspace.manager.export_json()?;

    let path = match output {
        Some(path) if path.as_os_str() == STDIO => {
            println!("{}", json);
            return Ok(());
        }
        Some(path) => path,
        None => {
            let dir = workspace.paths.exports_dir()?;
            dir.join(format!("hearth-{}.json", Utc::now().format("%Y%m%d-%H%M%S")))
        }
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;

    tracing::info!("[Export] Snapshot written to {:?}", path);
    println!("{}", path.display());
    Ok(())
}

pub fn import(workspace: &Workspace, input: &Path) -> Result<()> {
    let json = if input.as_os_str() == STDIO {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read snapshot from stdin")?;
        buffer
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))?
    };

    workspace.manager.import_json(&json)?;
    workspace.warn_if_degraded();

    let session = workspace.manager.load_session();
    match session.record {
        Some(record) => println!("Imported snapshot; logged in as {}", record.display_name),
        None => println!("Imported snapshot; no active session"),
    }
    Ok(())
}

pub fn reset(workspace: &Workspace, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to delete all persisted state without --yes");
    }
    workspace.manager.reset()?;
    println!("All persisted state cleared");
    Ok(())
}
