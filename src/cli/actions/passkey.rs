use crate::{
    cli::{
        actions::{finish, open_store, operator_error, print_json, require_access},
        globals::GlobalArgs,
    },
    features::{auth::RouteRequirement, passkeys},
};
use anyhow::{anyhow, Result};

const DEFAULT_REGISTERED_MESSAGE: &str = "Passkey registered successfully";
const DEFAULT_DELETED_MESSAGE: &str = "Passkey deleted successfully";

#[derive(Debug)]
pub enum Command {
    /// Without an email the signed-in identity's address is used.
    Register { email: Option<String> },
    Login { email: String },
    List,
    Delete { id: String },
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub command: Command,
}

/// # Errors
/// Returns the operator-facing message of the failed flow.
pub async fn execute(args: Args) -> Result<()> {
    let Args { globals, command } = args;
    let store = open_store(&globals).await?;

    match command {
        Command::Register { email } => {
            let email = match email {
                Some(email) => email,
                None => store
                    .identity()
                    .map(|identity| identity.email)
                    .ok_or_else(|| anyhow!("Not signed in. Run `identihub login` first."))?,
            };
            let outcome = store
                .register_passkey(&email)
                .await
                .map_err(operator_error)?;
            println!(
                "{}",
                outcome
                    .message
                    .as_deref()
                    .unwrap_or(DEFAULT_REGISTERED_MESSAGE)
            );
            Ok(())
        }
        Command::Login { email } => {
            let identity = store
                .login_with_passkey(&email)
                .await
                .map_err(operator_error)?;
            finish(&store).await;
            if globals.json {
                return print_json(&identity);
            }
            println!("{} ({}) id {}", identity.email, identity.role, identity.id);
            Ok(())
        }
        Command::List => {
            let token = require_access(&store, RouteRequirement::Authenticated, "/profile")?;
            let records = passkeys::client::list(store.api(), &token)
                .await
                .map_err(operator_error)?;
            if globals.json {
                return print_json(&records);
            }
            if records.is_empty() {
                println!("No passkeys registered.");
                return Ok(());
            }
            for record in records {
                println!(
                    "{}  {:<16}  created {}  last used {}",
                    record.id,
                    record.device_type.label(),
                    record.created_at.as_deref().unwrap_or("-"),
                    record.last_used.as_deref().unwrap_or("never"),
                );
            }
            Ok(())
        }
        Command::Delete { id } => {
            let token = require_access(&store, RouteRequirement::Authenticated, "/profile")?;
            let response = passkeys::client::delete(store.api(), &token, &id)
                .await
                .map_err(operator_error)?;
            if !response.success {
                return Err(anyhow!(response
                    .message
                    .unwrap_or_else(|| "Failed to delete passkey".to_string())));
            }
            println!(
                "{}",
                response.message.as_deref().unwrap_or(DEFAULT_DELETED_MESSAGE)
            );
            Ok(())
        }
    }
}
