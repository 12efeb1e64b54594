use crate::{
    cli::{
        actions::{open_store, operator_error, print_json, require_access},
        globals::GlobalArgs,
    },
    features::{auth::RouteRequirement, sessions},
};
use anyhow::Result;

#[derive(Debug)]
pub enum Command {
    List,
    Terminate { id: String },
    TerminateAll,
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub command: Command,
}

/// # Errors
/// Returns the operator-facing message of the failed call.
pub async fn execute(args: Args) -> Result<()> {
    let Args { globals, command } = args;
    let store = open_store(&globals).await?;

    match command {
        Command::List => {
            let token = require_access(&store, RouteRequirement::Authenticated, "/sessions")?;
            let records = sessions::client::list(store.api(), &token)
                .await
                .map_err(operator_error)?;
            if globals.json {
                return print_json(&records);
            }
            if records.is_empty() {
                println!("No device sessions.");
                return Ok(());
            }
            for session in records {
                println!(
                    "{}  {:<8}  {} / {}  {}  {}  last seen {}",
                    session.id,
                    session.status.to_string(),
                    session.device,
                    session.browser,
                    session.location,
                    session.ip_address,
                    session.last_seen,
                );
            }
            Ok(())
        }
        Command::Terminate { id } => {
            require_access(&store, RouteRequirement::Authenticated, "/sessions")?;
            store
                .terminate_session(&id)
                .await
                .map_err(operator_error)?;
            println!("Session terminated. Signed out.");
            Ok(())
        }
        Command::TerminateAll => {
            require_access(&store, RouteRequirement::Authenticated, "/sessions")?;
            store
                .terminate_all_sessions()
                .await
                .map_err(operator_error)?;
            println!("All sessions terminated. Signed out.");
            Ok(())
        }
    }
}
