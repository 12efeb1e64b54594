pub mod account;
pub mod admin;
pub mod passkey;
pub mod sessions;

// Internal "interpreter" for `Action`.
mod run;

use crate::{
    app_lib::ConsoleError,
    cli::globals::GlobalArgs,
    features::auth::{
        guard, guards::LOGIN_PATH, AuthState, AuthStore, GuardDecision, RouteRequirement,
    },
};
use anyhow::{anyhow, Result};
use secrecy::SecretString;
use serde::Serialize;
use std::time::Duration;

const NOT_SIGNED_IN: &str = "Not signed in. Run `identihub login` first.";
const ACCESS_DENIED: &str = "Access denied: admin role required.";

/// How long a command waits for background device-session records on exit.
const BACKGROUND_FLUSH: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub enum Action {
    Account(account::Args),
    Passkey(passkey::Args),
    Sessions(sessions::Args),
    Admin(admin::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        run::execute(self).await
    }
}

/// Builds the store and restores any persisted session.
pub(crate) async fn open_store(globals: &GlobalArgs) -> Result<AuthStore> {
    let store = globals.store().map_err(operator_error)?;
    store.bootstrap().await;
    Ok(store)
}

/// Applies the route guard for `path` and returns the session token.
pub(crate) fn require_access(
    store: &AuthStore,
    requirement: RouteRequirement,
    path: &str,
) -> Result<SecretString> {
    check_access(&store.state(), requirement, path)?;
    store.token().map_err(|_| anyhow!(NOT_SIGNED_IN))
}

fn check_access(state: &AuthState, requirement: RouteRequirement, path: &str) -> Result<()> {
    match guard(state, requirement, path) {
        GuardDecision::Allow => Ok(()),
        // commands only run after bootstrap settled
        GuardDecision::Loading | GuardDecision::Redirect(LOGIN_PATH) => {
            Err(anyhow!(NOT_SIGNED_IN))
        }
        GuardDecision::Redirect(_) | GuardDecision::Forbidden => Err(anyhow!(ACCESS_DENIED)),
    }
}

pub(crate) async fn finish(store: &AuthStore) {
    store.flush_background(BACKGROUND_FLUSH).await;
}

/// Converts a library error into the message shown to the operator.
pub(crate) fn operator_error(err: ConsoleError) -> anyhow::Error {
    anyhow!(err.user_message())
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::features::auth::{Identity, Role};

    fn settled(role: Option<Role>) -> AuthState {
        AuthState {
            token: role
                .as_ref()
                .map(|_| SecretString::from("tok".to_string())),
            identity: role.map(|role| Identity {
                id: "u1".into(),
                email: "a@b.com".into(),
                role,
            }),
            loading: false,
            passkey_supported: false,
        }
    }

    #[test]
    fn admin_commands_need_an_admin_session() {
        let admin_only = |role| check_access(&settled(role), RouteRequirement::AdminOnly, "/admin");

        let denied = admin_only(Some(Role::User)).unwrap_err();
        assert_eq!(denied.to_string(), ACCESS_DENIED);
        let signed_out = admin_only(None).unwrap_err();
        assert_eq!(signed_out.to_string(), NOT_SIGNED_IN);
        assert!(admin_only(Some(Role::Admin)).is_ok());
    }

    #[test]
    fn session_commands_need_any_session() {
        let signed_in =
            |role| check_access(&settled(role), RouteRequirement::Authenticated, "/sessions");

        let signed_out = signed_in(None).unwrap_err();
        assert_eq!(signed_out.to_string(), NOT_SIGNED_IN);
        assert!(signed_in(Some(Role::User)).is_ok());
    }

    #[test]
    fn unsettled_state_reads_as_signed_out() {
        let state = AuthState {
            loading: true,
            ..settled(Some(Role::Admin))
        };
        let err = check_access(&state, RouteRequirement::AdminOnly, "/admin").unwrap_err();
        assert_eq!(err.to_string(), NOT_SIGNED_IN);
    }

    #[test]
    fn operator_error_carries_guidance() {
        let err = operator_error(ConsoleError::PasskeysUnsupported);
        assert_eq!(
            err.to_string(),
            "Passkeys are not supported on this device. You can still use password authentication."
        );
    }
}
