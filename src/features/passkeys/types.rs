//! Types for the passkey management endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PasskeyDeviceType {
    Platform,
    #[default]
    #[serde(other)]
    CrossPlatform,
}

impl PasskeyDeviceType {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Platform => "Platform Passkey",
            Self::CrossPlatform => "Security Key",
        }
    }
}

impl fmt::Display for PasskeyDeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasskeyRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub device_type: PasskeyDeviceType,
    #[serde(default)]
    pub transports: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_used: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DeletePasskeyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}
