use crate::{
    cli::{
        actions::{open_store, operator_error, print_json, require_access},
        globals::GlobalArgs,
    },
    features::{
        admin::{self, UserSearchFilters},
        auth::{Role, RouteRequirement},
    },
};
use anyhow::Result;

#[derive(Debug)]
pub enum Command {
    Stats,
    Search(UserSearchFilters),
    Show { id: String },
    SetRole { id: String, role: Role },
    Delete { id: String },
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
    let token = require_access(&store, RouteRequirement::AdminOnly, "/admin")?;
    let api = store.api();

    match command {
        Command::Stats => {
            let stats = admin::client::stats(api, &token)
                .await
                .map_err(operator_error)?;
            if globals.json {
                return print_json(&stats);
            }
            println!("Total users:      {}", stats.total_users);
            println!("Admins:           {}", stats.admin_users);
            println!("Regular users:    {}", stats.regular_users);
            println!("Active sessions:  {}", stats.active_sessions);
            println!("Logins today:     {}", stats.today_logins);
            Ok(())
        }
        Command::Search(filters) => {
            let result = admin::client::search(api, &token, &filters)
                .await
                .map_err(operator_error)?;
            if globals.json {
                return print_json(&result);
            }
            for user in &result.users {
                println!(
                    "{}  {:<32}  {:<5}  {:<8}  sessions {}  last login {}",
                    user.id,
                    user.email,
                    user.role.to_string(),
                    user.status.as_deref().unwrap_or("-"),
                    user.active_sessions,
                    user.last_login.as_deref().unwrap_or("never"),
                );
            }
            println!(
                "Page {} of {} ({} users)",
                result.pagination.current_page,
                result.pagination.total_pages,
                result.pagination.total_users
            );
            Ok(())
        }
        Command::Show { id } => {
            let user = admin::client::user_detail(api, &token, &id)
                .await
                .map_err(operator_error)?;
            if globals.json {
                return print_json(&user);
            }
            println!("{} ({}) id {}", user.email, user.role, user.id);
            if let Some(profile) = &user.profile {
                if let Some(name) = &profile.full_name {
                    println!("Name:      {name}");
                }
                if let Some(phone) = &profile.phone {
                    println!("Phone:     {phone}");
                }
                if let Some(location) = &profile.location {
                    println!("Location:  {location}");
                }
            }
            if let Some(created_at) = &user.created_at {
                println!("Created:   {created_at}");
            }
            println!("Active sessions:");
            for session in &user.active_sessions {
                println!(
                    "  {} / {}  {}",
                    session.device, session.browser, session.location
                );
            }
            println!("Login history:");
            for event in &user.login_history {
                println!("  {}  {}", event.timestamp, event.status);
            }
            Ok(())
        }
        Command::SetRole { id, role } => {
            admin::client::set_role(api, &token, &id, &role)
                .await
                .map_err(operator_error)?;
            println!("Role of {id} set to {role}.");
            Ok(())
        }
        Command::Delete { id } => {
            admin::client::delete_user(api, &token, &id)
                .await
                .map_err(operator_error)?;
            println!("User {id} deleted.");
            Ok(())
        }
    }
}
