//! # IdentiHub (Identity Console Client)
//!
//! `identihub` is the client half of an identity-management console. The
//! backend owns accounts, credentials and sessions; this crate drives the
//! client side of those protocols and keeps the local session consistent.
//!
//! ## Passkeys
//!
//! Capability detection asks the credential platform whether a
//! user-verifying platform authenticator exists. Registration and
//! authentication ceremonies fetch options from the API, hand them to the
//! platform and post the resulting credential back for verification. Only
//! one ceremony of each kind runs at a time.
//!
//! ## Session
//!
//! The auth store holds the single token + identity pair. Bootstrap verifies a
//! persisted token and fails closed; every login path persists the token,
//! publishes token and identity together, and records a device session in
//! the background. Role checks are UX only: the API enforces authorization.

pub mod app_lib;
pub mod cli;
pub mod features;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
