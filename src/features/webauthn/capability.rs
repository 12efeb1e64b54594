//! Passkey capability detection.
//!
//! Biometric types are inferred from the user-agent string. They are a
//! best-effort hint for what to show the operator and must never be used for
//! access decisions.

use super::platform::CredentialPlatform;
use crate::app_lib::ConsoleError;
use serde::Serialize;
use std::fmt;
use tracing::{instrument, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDescriptor {
    pub platform_authenticator: bool,
    pub conditional_mediation: bool,
    pub fingerprint: bool,
    pub face: bool,
    pub iris: bool,
    pub voice: bool,
}

impl CapabilityDescriptor {
    #[must_use]
    pub fn passkeys_supported(&self) -> bool {
        self.platform_authenticator
    }
}

/// Result of one detection run. `failure` is set when a platform predicate
/// errored; the descriptor is then all-false.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapabilityProbe {
    pub descriptor: CapabilityDescriptor,
    pub failure: Option<ConsoleError>,
}

/// Queries both platform predicates and derives biometric hints.
#[instrument(skip(platform))]
pub async fn detect(platform: &dyn CredentialPlatform) -> CapabilityProbe {
    let (authenticator, mediation) = tokio::join!(
        platform.platform_authenticator_available(),
        platform.conditional_mediation_available()
    );

    let mut failures = Vec::new();
    let platform_authenticator = authenticator.unwrap_or_else(|err| {
        warn!("Error checking platform authenticator availability: {err}");
        failures.push(format!("platform authenticator: {err}"));
        false
    });
    let conditional_mediation = mediation.unwrap_or_else(|err| {
        warn!("Error checking conditional mediation availability: {err}");
        failures.push(format!("conditional mediation: {err}"));
        false
    });

    if !failures.is_empty() {
        return CapabilityProbe {
            descriptor: CapabilityDescriptor::default(),
            failure: Some(ConsoleError::CapabilityDetectionFailure(failures.join("; "))),
        };
    }

    let mut descriptor = CapabilityDescriptor {
        platform_authenticator,
        conditional_mediation,
        ..CapabilityDescriptor::default()
    };
    if platform_authenticator {
        infer_biometrics(platform.user_agent(), &mut descriptor);
    }

    CapabilityProbe {
        descriptor,
        failure: None,
    }
}

fn infer_biometrics(user_agent: &str, descriptor: &mut CapabilityDescriptor) {
    if user_agent.contains("iPhone") || user_agent.contains("iPad") {
        descriptor.fingerprint = true;
        descriptor.face = true;
    } else if user_agent.contains("Android") {
        descriptor.fingerprint = true;
        descriptor.face = ["Samsung", "Google", "OnePlus"]
            .iter()
            .any(|vendor| user_agent.contains(vendor));
    } else if user_agent.contains("Windows") {
        descriptor.fingerprint = true;
        descriptor.face = true;
        descriptor.iris = true;
    } else if user_agent.contains("Mac") {
        descriptor.fingerprint = true;
        descriptor.face = user_agent.contains("MacBook Pro") || user_agent.contains("MacBook Air");
    }
}

/// Short description of the best available verification method.
#[must_use]
pub fn biometric_label(descriptor: &CapabilityDescriptor) -> &'static str {
    if descriptor.face && descriptor.fingerprint {
        "Fingerprint or Face ID"
    } else if descriptor.face {
        "Face ID"
    } else if descriptor.fingerprint {
        "Fingerprint"
    } else if descriptor.iris {
        "Iris Scan"
    } else if descriptor.platform_authenticator {
        "Biometric Authentication"
    } else {
        "Security Key"
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Ios,
    Android,
    Windows,
    Macos,
    Linux,
    Unknown,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Windows => "windows",
            Self::Macos => "macos",
            Self::Linux => "linux",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub name: &'static str,
    pub user_agent: String,
}

#[must_use]
pub fn device_info(user_agent: &str) -> DeviceInfo {
    let (device_type, name) = if user_agent.contains("iPhone") {
        (DeviceType::Ios, "iPhone")
    } else if user_agent.contains("iPad") {
        (DeviceType::Ios, "iPad")
    } else if user_agent.contains("Android") {
        let name = if user_agent.contains("Samsung") {
            "Samsung Device"
        } else if user_agent.contains("Google") {
            "Google Pixel"
        } else {
            "Android Device"
        };
        (DeviceType::Android, name)
    } else if user_agent.contains("Windows") {
        (DeviceType::Windows, "Windows PC")
    } else if user_agent.contains("Mac") {
        (DeviceType::Macos, "Mac")
    } else if user_agent.contains("Linux") {
        (DeviceType::Linux, "Linux PC")
    } else {
        (DeviceType::Unknown, "Unknown Device")
    };

    DeviceInfo {
        device_type,
        name,
        user_agent: user_agent.to_string(),
    }
}
