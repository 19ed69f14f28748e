use anyhow::Result;
use hearth_core::preference::ModelLookup;

use super::Workspace;

pub fn show(workspace: &Workspace) -> Result<()> {
    let manager = &workspace.manager;
    let session = manager.load_session();
    let settings = manager.load_app_settings();
    let prefs = manager.preferences();

    match &session.record {
        Some(record) => {
            println!("Session:   {} ({}, id {})", record.display_name, record.role, record.id);
            if let Some(email) = &record.email {
                println!("Email:     {}", email);
            }
            if let Some(last_login) = record.last_login {
                println!("Last login: {}", last_login.to_rfc3339());
            }
        }
        None => println!("Session:   anonymous"),
    }

    println!("Theme:     {}", settings.theme);
    println!(
        "Language:  {} ({})",
        settings.language,
        settings.language.native_name()
    );

    let model = match prefs.resolve_selected_model() {
        ModelLookup::Builtin(model) => format!("{} ({})", model.name, model.provider),
        ModelLookup::Custom(model) => format!("{} ({}, custom)", model.name, model.provider),
        ModelLookup::Unknown(id) => format!("{} (not in catalog)", id),
    };
    println!("Model:     {}", model);
    println!("Custom models: {}", prefs.custom_models().len());

    if session.authenticated {
        println!("Scroll:    {}", manager.scroll().saved_offset());
    }

    println!("Config:    {}", workspace.config_file.display());
    println!("Data dir:  {}", workspace.paths.data_dir()?.display());
    println!(
        "Directory: {} account(s)",
        workspace.config.directory.len()
    );
    println!(
        "Storage:   {}",
        if manager.is_degraded() {
            "degraded (in memory)"
        } else {
            "ok"
        }
    );
    Ok(())
}
