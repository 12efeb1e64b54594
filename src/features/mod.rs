//! Domain features of the console. Each area keeps its endpoint paths and
//! payload types together; the API enforces authorization for all of them.

pub mod admin;
pub mod auth;
pub mod passkeys;
pub mod sessions;
pub mod webauthn;
