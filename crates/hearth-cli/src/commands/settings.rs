use anyhow::{Result, bail};
use clap::Subcommand;
use hearth_core::preference::{Language, PreferenceMap, Theme};
use serde_json::Value;

use super::Workspace;

#[derive(Subcommand, Debug)]
pub enum PrefsAction {
    /// Print the whole map, or one key
    Get { key: Option<String> },
    /// Merge one key into the map. The value is parsed as JSON, falling
    /// back to a plain string.
    Set { key: String, value: String },
}

pub fn theme(workspace: &Workspace, value: Option<&str>) -> Result<()> {
    let prefs = workspace.manager.preferences();
    let theme = match value {
        None => prefs.theme(),
        Some("toggle") => prefs.toggle_theme()?,
        Some(raw) => {
            let Ok(theme) = raw.parse::<Theme>() else {
                bail!("Unknown theme '{}', expected dark, light or toggle", raw);
            };
            prefs.set_theme(theme)?;
            theme
        }
    };
    workspace.warn_if_degraded();
    println!("{}", theme);
    Ok(())
}

pub fn language(workspace: &Workspace, code: Option<&str>) -> Result<()> {
    let prefs = workspace.manager.preferences();
    let Some(code) = code else {
        let current = prefs.language();
        for language in Language::supported() {
            let marker = if language == current { "*" } else { " " };
            println!("{} {}  {}", marker, language, language.native_name());
        }
        return Ok(());
    };

    let fallback = prefs.defaults().language;
    let language = Language::from_code_or(code, fallback);
    if !code.trim().to_ascii_lowercase().starts_with(language.as_ref()) {
        tracing::warn!("Unsupported language '{}', using {}", code, language);
    }
    prefs.set_language(language)?;
    workspace.warn_if_degraded();
    println!("{} ({})", language, language.native_name());
    Ok(())
}

pub fn prefs(workspace: &Workspace, action: PrefsAction) -> Result<()> {
    match action {
        PrefsAction::Get { key: None } => {
            let map = workspace.manager.load_user_preferences();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        PrefsAction::Get { key: Some(key) } => {
            match workspace.manager.load_user_preferences().get(&key) {
                Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
                None => bail!("No preference named '{}'", key),
            }
        }
        PrefsAction::Set { key, value } => {
            let mut partial = PreferenceMap::new();
            partial.insert(key, parse_value(&value));
            let merged = workspace.manager.save_user_preferences(partial)?;
            workspace.warn_if_degraded();
            println!("{}", serde_json::to_string_pretty(&merged)?);
        }
    }
    Ok(())
}

pub fn scroll(workspace: &Workspace, offset: Option<u32>) -> Result<()> {
    let manager = &workspace.manager;
    if let Some(offset) = offset {
        if !manager.load_session().authenticated {
            bail!("Scroll offsets are only kept while logged in");
        }
        manager.record_scroll(offset);
        workspace.warn_if_degraded();
    }
    println!("{}", manager.scroll().saved_offset());
    Ok(())
}

/// JSON when it parses, otherwise the raw text as a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(parse_value("compact"), json!("compact"));
    }
}
