use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use hearth_application::PreferenceStore;
use hearth_core::preference::{ModelDescriptor, ModelLookup, NewModel};

use super::Workspace;

#[derive(Subcommand, Debug)]
pub enum ModelAction {
    /// List built-in and custom models
    List,
    /// Select a model by id
    Select { id: String },
    /// Register a custom model
    Add(AddModelArgs),
    /// Remove a custom model
    Remove { id: String },
}

#[derive(Args, Debug)]
pub struct AddModelArgs {
    pub id: String,
    /// Display name; defaults to the id
    #[arg(long)]
    pub name: Option<String>,
    /// Defaults to "Custom"
    #[arg(long)]
    pub provider: Option<String>,
    /// Mark the model as paid
    #[arg(long)]
    pub paid: bool,
    #[arg(long)]
    pub description: Option<String>,
}

impl From<AddModelArgs> for NewModel {
    fn from(args: AddModelArgs) -> Self {
        NewModel {
            id: args.id,
            name: args.name.unwrap_or_default(),
            provider: args.provider,
            free: Some(!args.paid),
            description: args.description,
        }
    }
}

pub fn run(workspace: &Workspace, action: ModelAction) -> Result<()> {
    let prefs = workspace.manager.preferences();
    match action {
        ModelAction::List => {
            let selected = prefs.selected_model();
            let custom = prefs.custom_models();
            for model in prefs.available_models() {
                let is_custom = custom.iter().any(|c| c.id == model.id);
                println!("{}", format_row(&model, model.id == selected, is_custom));
            }
            if let ModelLookup::Unknown(id) = prefs.resolve_selected_model() {
                println!("* {} (not in catalog)", id);
            }
        }
        ModelAction::Select { id } => {
            let lookup = prefs.resolve_model(&id);
            if !lookup.is_known() {
                tracing::warn!("Model '{}' is not in the catalog", id);
            }
            prefs.update_selected_model(&id)?;
            workspace.warn_if_degraded();
            println!("Selected {}", id);
        }
        ModelAction::Add(args) => {
            let model = prefs.add_custom_model(args.into())?;
            workspace.warn_if_degraded();
            println!("Added {} ({})", model.id, model.provider);
        }
        ModelAction::Remove { id } => {
            let selected = remove_custom(prefs, &id)?;
            workspace.warn_if_degraded();
            println!("Removed {}; selected model is {}", id, selected);
        }
    }
    Ok(())
}

/// Removes a custom model and returns the selection afterwards. Ids that are
/// not in the custom list are refused before anything changes.
fn remove_custom(prefs: &PreferenceStore, id: &str) -> Result<String> {
    if !prefs.custom_models().iter().any(|m| m.id == id) {
        bail!("No custom model named '{}'", id);
    }
    prefs.remove_custom_model(id)?;
    Ok(prefs.selected_model())
}

fn format_row(model: &ModelDescriptor, selected: bool, custom: bool) -> String {
    format!(
        "{} {:<24} {:<22} {:<10} {}{}",
        if selected { "*" } else { " " },
        model.id,
        model.name,
        model.provider,
        if model.free { "free" } else { "paid" },
        if custom { " [custom]" } else { "" },
    )
}
