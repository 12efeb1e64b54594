//! Device sessions: one record per login, listed and terminated by the owner.

pub mod client;
pub mod types;

pub use types::{DeviceSession, NewDeviceSession, SessionStatus};
