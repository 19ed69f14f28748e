use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::Args;
use hearth_core::session::{Role, SignupRequest};

use super::Workspace;

#[derive(Args, Debug)]
pub struct SignupArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    /// Defaults to the email address
    #[arg(long)]
    pub name: Option<String>,
    /// admin or user
    #[arg(long)]
    pub role: Option<Role>,
    #[arg(long)]
    pub company: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date_of_birth: Option<NaiveDate>,
    #[arg(long)]
    pub address: Option<String>,
}

impl From<SignupArgs> for SignupRequest {
    fn from(args: SignupArgs) -> Self {
        SignupRequest {
            email: args.email,
            password: args.password,
            display_name: args.name,
            role: args.role,
            company: args.company,
            date_of_birth: args.date_of_birth,
            address: args.address,
        }
    }
}

pub fn login(workspace: &Workspace, identifier: &str, secret: &str) -> Result<()> {
    if !workspace.manager.login(identifier, secret)? {
        bail!("Invalid identifier or secret");
    }
    workspace.warn_if_degraded();

    let session = workspace.manager.load_session();
    if let Some(record) = session.record {
        println!("Logged in as {} ({})", record.display_name, record.role);
    }
    Ok(())
}

pub fn signup(workspace: &Workspace, args: SignupArgs) -> Result<()> {
    let record = workspace.manager.signup(args.into())?;
    workspace.warn_if_degraded();

    println!("Signed up as {} ({})", record.display_name, record.role);
    println!("Identity: {}", record.id);
    Ok(())
}

pub fn logout(workspace: &Workspace) -> Result<()> {
    let was_authenticated = workspace.manager.load_session().authenticated;
    workspace.manager.logout()?;
    workspace.warn_if_degraded();

    if was_authenticated {
        println!("Logged out");
    } else {
        println!("No active session");
    }
    Ok(())
}
