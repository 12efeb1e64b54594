//! Auth feature: password, admin, passkey and Google sign-in, session bootstrap
//! and the state store guards read from. Tokens pass through here, so nothing
//! in this module logs token material.
//!
//! Flow overview: bootstrap verifies a persisted token and fails closed. Every
//! login persists the new token, publishes token and identity together, and
//! records the device session in the background. Logout ends server sessions
//! best effort and always clears local state.

pub mod client;
pub mod guards;
pub mod oauth;
pub mod registration;
pub mod storage;
pub mod store;
pub mod types;

pub use guards::{guard, GuardDecision, RouteRequirement};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use store::{AuthState, AuthStore};
pub use types::{Identity, IssuedSession, LoginMethod, Role};
