//! Route access decisions derived from the auth state. These are UX-only
//! checks; the API enforces authorization on every request.

use crate::features::auth::store::AuthState;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// What a route asks of the current session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteRequirement {
    /// Open to everyone; signed-in users are bounced off the login and
    /// registration pages.
    Public,
    /// Requires a session.
    Authenticated,
    /// Requires an admin session; non-admins are sent to the dashboard.
    AdminRedirect,
    /// Requires an admin session; non-admins get an access-denied answer.
    AdminOnly,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Bootstrap has not settled yet.
    Loading,
    Allow,
    Redirect(&'static str),
    Forbidden,
}

#[must_use]
pub fn guard(state: &AuthState, requirement: RouteRequirement, path: &str) -> GuardDecision {
    if state.loading {
        return GuardDecision::Loading;
    }

    let authenticated = state.is_authenticated();
    match requirement {
        RouteRequirement::Public => {
            if authenticated && (path == LOGIN_PATH || path == REGISTER_PATH) {
                GuardDecision::Redirect(DASHBOARD_PATH)
            } else {
                GuardDecision::Allow
            }
        }
        RouteRequirement::Authenticated => {
            if authenticated {
                GuardDecision::Allow
            } else {
                GuardDecision::Redirect(LOGIN_PATH)
            }
        }
        RouteRequirement::AdminRedirect => {
            if !authenticated {
                GuardDecision::Redirect(LOGIN_PATH)
            } else if state.is_admin() {
                GuardDecision::Allow
            } else {
                GuardDecision::Redirect(DASHBOARD_PATH)
            }
        }
        RouteRequirement::AdminOnly => {
            if !authenticated {
                GuardDecision::Redirect(LOGIN_PATH)
            } else if state.is_admin() {
                GuardDecision::Allow
            } else {
                GuardDecision::Forbidden
            }
        }
    }
}
