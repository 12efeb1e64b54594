use crate::{
    app_lib::{config::default_token_path, ConsoleConfig},
    cli::{
        actions::{account, admin, passkey, sessions, Action},
        commands::{
            account::{
                ARG_AGREE_TO_TERMS, ARG_CALLBACK_URL, ARG_CONFIRM_PASSWORD, ARG_EMAIL,
                ARG_FULL_NAME, ARG_PASSWORD, ARG_PHONE,
            },
            admin::{ARG_LIMIT, ARG_PAGE, ARG_ROLE, ARG_SEARCH, ARG_STATUS, ARG_USER_ID},
            connection::{
                ARG_API_URL, ARG_AUTHENTICATOR, ARG_CEREMONY_TIMEOUT, ARG_JSON, ARG_LOCATION,
                ARG_SCREEN_RESOLUTION, ARG_TIMEOUT, ARG_TOKEN_PATH, ARG_USER_AGENT,
            },
            passkey::ARG_PASSKEY_ID,
            sessions::ARG_SESSION_ID,
        },
        globals::GlobalArgs,
    },
    features::{
        admin::UserSearchFilters,
        auth::{registration::RegistrationForm, Role},
    },
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;
use std::path::PathBuf;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let globals = global_args(matches);

    let (name, sub_m) = matches.subcommand().context("missing subcommand")?;
    let action = match name {
        "passkey" => Action::Passkey(passkey::Args {
            globals,
            command: passkey_command(sub_m)?,
        }),
        "sessions" => Action::Sessions(sessions::Args {
            globals,
            command: sessions_command(sub_m)?,
        }),
        "admin" => Action::Admin(admin::Args {
            globals,
            command: admin_command(sub_m)?,
        }),
        other => Action::Account(account::Args {
            globals,
            command: account_command(other, sub_m)?,
        }),
    };

    Ok(action)
}

fn global_args(matches: &ArgMatches) -> GlobalArgs {
    let string = |id: &str| matches.get_one::<String>(id).map_or("", String::as_str);

    let mut config = ConsoleConfig::new(string(ARG_API_URL))
        .with_request_timeout_seconds(matches.get_one::<u64>(ARG_TIMEOUT).copied().unwrap_or(0))
        .with_ceremony_timeout_seconds(
            matches
                .get_one::<u64>(ARG_CEREMONY_TIMEOUT)
                .copied()
                .unwrap_or(0),
        )
        .with_token_path(
            matches
                .get_one::<PathBuf>(ARG_TOKEN_PATH)
                .cloned()
                .unwrap_or_else(default_token_path),
        );

    // Blank values keep the defaults.
    config = config
        .with_user_agent(string(ARG_USER_AGENT))
        .with_screen_resolution(string(ARG_SCREEN_RESOLUTION))
        .with_location(string(ARG_LOCATION));

    let mut globals = GlobalArgs::new(config);
    if let Some(program) = matches.get_one::<PathBuf>(ARG_AUTHENTICATOR) {
        globals.set_authenticator(program.clone());
    }
    globals.json = matches.get_flag(ARG_JSON);
    globals
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(id)
        .with_context(|| format!("missing required argument: --{id}"))
}

fn secret(matches: &ArgMatches, id: &str) -> Result<SecretString> {
    Ok(SecretString::from(required(matches, id)?.clone()))
}

fn account_command(name: &str, matches: &ArgMatches) -> Result<account::Command> {
    let command = match name {
        "login" => account::Command::Login {
            email: required(matches, ARG_EMAIL)?.trim().to_string(),
            password: secret(matches, ARG_PASSWORD)?,
        },
        "login-admin" => account::Command::LoginAdmin {
            email: required(matches, ARG_EMAIL)?.trim().to_string(),
            password: secret(matches, ARG_PASSWORD)?,
        },
        "register" => account::Command::Register(RegistrationForm {
            full_name: required(matches, ARG_FULL_NAME)?.clone(),
            email: required(matches, ARG_EMAIL)?.trim().to_string(),
            phone: required(matches, ARG_PHONE)?.trim().to_string(),
            password: required(matches, ARG_PASSWORD)?.clone(),
            confirm_password: required(matches, ARG_CONFIRM_PASSWORD)?.clone(),
            agree_to_terms: matches.get_flag(ARG_AGREE_TO_TERMS),
        }),
        "whoami" => account::Command::Whoami,
        "logout" => account::Command::Logout,
        "google-url" => account::Command::GoogleUrl,
        "google-callback" => account::Command::GoogleCallback {
            url: required(matches, ARG_CALLBACK_URL)?.clone(),
        },
        "capabilities" => account::Command::Capabilities,
        other => return Err(anyhow!("unknown command: {other}")),
    };
    Ok(command)
}

fn passkey_command(matches: &ArgMatches) -> Result<passkey::Command> {
    let (name, sub_m) = matches.subcommand().context("missing passkey subcommand")?;
    let command = match name {
        "register" => passkey::Command::Register {
            email: sub_m
                .get_one::<String>(ARG_EMAIL)
                .map(|email| email.trim().to_string())
                .filter(|email| !email.is_empty()),
        },
        "login" => passkey::Command::Login {
            email: required(sub_m, ARG_EMAIL)?.trim().to_string(),
        },
        "list" => passkey::Command::List,
        "delete" => passkey::Command::Delete {
            id: required(sub_m, ARG_PASSKEY_ID)?.clone(),
        },
        other => return Err(anyhow!("unknown passkey command: {other}")),
    };
    Ok(command)
}

fn sessions_command(matches: &ArgMatches) -> Result<sessions::Command> {
    let (name, sub_m) = matches.subcommand().context("missing sessions subcommand")?;
    let command = match name {
        "list" => sessions::Command::List,
        "terminate" => sessions::Command::Terminate {
            id: required(sub_m, ARG_SESSION_ID)?.clone(),
        },
        "terminate-all" => sessions::Command::TerminateAll,
        other => return Err(anyhow!("unknown sessions command: {other}")),
    };
    Ok(command)
}

fn admin_command(matches: &ArgMatches) -> Result<admin::Command> {
    let (name, sub_m) = matches.subcommand().context("missing admin subcommand")?;
    let optional = |id: &str| sub_m.get_one::<String>(id).cloned().unwrap_or_default();

    let command = match name {
        "stats" => admin::Command::Stats,
        "search" => admin::Command::Search(UserSearchFilters {
            search_term: optional(ARG_SEARCH),
            role: optional(ARG_ROLE),
            status: optional(ARG_STATUS),
            page: sub_m.get_one::<u32>(ARG_PAGE).copied().unwrap_or(1),
            limit: sub_m.get_one::<u32>(ARG_LIMIT).copied().unwrap_or(10),
        }),
        "show" => admin::Command::Show {
            id: required(sub_m, ARG_USER_ID)?.clone(),
        },
        "set-role" => admin::Command::SetRole {
            id: required(sub_m, ARG_USER_ID)?.clone(),
            role: parse_role(required(sub_m, ARG_ROLE)?)?,
        },
        "delete" => admin::Command::Delete {
            id: required(sub_m, ARG_USER_ID)?.clone(),
        },
        other => return Err(anyhow!("unknown admin command: {other}")),
    };
    Ok(command)
}

fn parse_role(value: &str) -> Result<Role> {
    match value {
        "user" => Ok(Role::User),
        "admin" => Ok(Role::Admin),
        other => Err(anyhow!("invalid role: {other}")),
    }
}
