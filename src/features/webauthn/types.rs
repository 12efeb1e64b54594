//! Types for the passkey ceremonies: request bodies sent to the server, the
//! options documents handed to the platform, and the ceremony outcomes.
//!
//! Options documents are deliberately not `Clone`: each one is moved into a
//! single platform call and cannot be replayed into a second ceremony.

use crate::{app_lib::ConsoleError, features::auth::types::Identity};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

pub const USER_VERIFICATION_REQUIRED: &str = "required";

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorSelection {
    pub authenticator_attachment: &'static str,
    pub user_verification: &'static str,
    pub resident_key: &'static str,
    pub require_resident_key: bool,
}

impl AuthenticatorSelection {
    /// Platform authenticator, discoverable credential, user verification required.
    #[must_use]
    pub fn platform_biometric() -> Self {
        Self {
            authenticator_attachment: "platform",
            user_verification: USER_VERIFICATION_REQUIRED,
            resident_key: "required",
            require_resident_key: true,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOptionsRequest<'a> {
    pub email: &'a str,
    pub user_verification: &'static str,
    pub authenticator_selection: AuthenticatorSelection,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationOptionsRequest<'a> {
    pub email: &'a str,
    pub user_verification: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VerifyCredentialRequest {
    pub credential: Value,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct RegistrationOutcome {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct AuthenticationVerifyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<Identity>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Which ceremony a state or guard refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CeremonyKind {
    Registration,
    Authentication,
}

impl CeremonyKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Authentication => "authentication",
        }
    }
}

/// Progress of one ceremony instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CeremonyState {
    #[default]
    Idle,
    OptionsRequested,
    OptionsReceived,
    CredentialCreated,
    VerificationRequested,
    Verified,
    Failed,
}

impl CeremonyState {
    #[must_use]
    pub fn in_flight(self) -> bool {
        matches!(
            self,
            Self::OptionsRequested
                | Self::OptionsReceived
                | Self::CredentialCreated
                | Self::VerificationRequested
        )
    }
}

impl fmt::Display for CeremonyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::OptionsRequested => "options-requested",
            Self::OptionsReceived => "options-received",
            Self::CredentialCreated => "credential-created",
            Self::VerificationRequested => "verification-requested",
            Self::Verified => "verified",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// `publicKey` options for `navigator.credentials.create`, with the
/// platform-authenticator selection forced on top of the server's document.
#[derive(Debug)]
pub struct CreationRequest {
    public_key: Map<String, Value>,
}

impl CreationRequest {
    /// # Errors
    /// Returns `RegistrationFailed` when the server options lack a challenge.
    pub fn from_server_options(options: Value) -> Result<Self, ConsoleError> {
        let mut public_key = public_key_section(options).ok_or_else(|| {
            ConsoleError::RegistrationFailed("Registration options are missing a challenge".into())
        })?;

        let mut selection = public_key
            .remove("authenticatorSelection")
            .and_then(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .unwrap_or_default();
        if let Ok(Value::Object(forced)) =
            serde_json::to_value(AuthenticatorSelection::platform_biometric())
        {
            selection.extend(forced);
        }
        public_key.insert("authenticatorSelection".into(), Value::Object(selection));
        public_key.insert(
            "userVerification".into(),
            Value::from(USER_VERIFICATION_REQUIRED),
        );

        Ok(Self { public_key })
    }

    #[must_use]
    pub fn public_key(&self) -> &Map<String, Value> {
        &self.public_key
    }

    /// `{ "publicKey": { … } }`, the shape the credential API expects.
    #[must_use]
    pub fn into_json(self) -> Value {
        json!({ "publicKey": Value::Object(self.public_key) })
    }
}

/// `publicKey` options for `navigator.credentials.get` with user verification
/// required.
#[derive(Debug)]
pub struct AssertionRequest {
    public_key: Map<String, Value>,
}

impl AssertionRequest {
    /// # Errors
    /// Returns `AuthenticationFailed` when the server options lack a challenge.
    pub fn from_server_options(options: Value) -> Result<Self, ConsoleError> {
        let mut public_key = public_key_section(options).ok_or_else(|| {
            ConsoleError::AuthenticationFailed(
                "Authentication options are missing a challenge".into(),
            )
        })?;
        public_key.insert(
            "userVerification".into(),
            Value::from(USER_VERIFICATION_REQUIRED),
        );
        Ok(Self { public_key })
    }

    #[must_use]
    pub fn public_key(&self) -> &Map<String, Value> {
        &self.public_key
    }

    #[must_use]
    pub fn into_json(self) -> Value {
        json!({ "publicKey": Value::Object(self.public_key) })
    }
}

/// Unwraps `{ publicKey: … }` when present; requires a string challenge.
fn public_key_section(options: Value) -> Option<Map<String, Value>> {
    let section = match options {
        Value::Object(mut map) => match map.remove("publicKey") {
            Some(Value::Object(inner)) => inner,
            Some(_) => return None,
            None => map,
        },
        _ => return None,
    };

    let has_challenge = section
        .get("challenge")
        .and_then(Value::as_str)
        .is_some_and(|challenge| !challenge.is_empty());
    has_challenge.then_some(section)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn creation_request_forces_platform_selection() {
        let request = CreationRequest::from_server_options(json!({
            "challenge": "Y2hhbGxlbmdl",
            "rp": {"name": "IdentiHub"},
            "authenticatorSelection": {"authenticatorAttachment": "cross-platform", "extra": 1}
        }))
        .unwrap();

        let selection = &request.public_key()["authenticatorSelection"];
        assert_eq!(selection["authenticatorAttachment"], "platform");
        assert_eq!(selection["requireResidentKey"], true);
        assert_eq!(selection["residentKey"], "required");
        assert_eq!(selection["userVerification"], "required");
        assert_eq!(selection["extra"], 1);
        assert_eq!(request.public_key()["rp"]["name"], "IdentiHub");
    }

    #[test]
    fn creation_request_unwraps_public_key_section() {
        let request =
            CreationRequest::from_server_options(json!({"publicKey": {"challenge": "abc"}}))
                .unwrap();
        let value = request.into_json();
        assert_eq!(value["publicKey"]["challenge"], "abc");
    }

    #[test]
    fn missing_challenge_is_rejected() {
        assert!(CreationRequest::from_server_options(json!({"rp": {}})).is_err());
        assert!(AssertionRequest::from_server_options(json!({"challenge": ""})).is_err());
        assert!(AssertionRequest::from_server_options(json!("nope")).is_err());
    }

    #[test]
    fn assertion_request_requires_user_verification() {
        let request = AssertionRequest::from_server_options(json!({
            "challenge": "abc",
            "userVerification": "preferred",
            "allowCredentials": []
        }))
        .unwrap();
        assert_eq!(request.public_key()["userVerification"], "required");
    }

    #[test]
    fn in_flight_states() {
        assert!(!CeremonyState::Idle.in_flight());
        assert!(CeremonyState::OptionsRequested.in_flight());
        assert!(CeremonyState::VerificationRequested.in_flight());
        assert!(!CeremonyState::Verified.in_flight());
        assert!(!CeremonyState::Failed.in_flight());
        assert_eq!(CeremonyState::CredentialCreated.to_string(), "credential-created");
    }

    #[test]
    fn options_requests_serialize_camel_case() {
        let body = serde_json::to_value(RegistrationOptionsRequest {
            email: "a@b.com",
            user_verification: USER_VERIFICATION_REQUIRED,
            authenticator_selection: AuthenticatorSelection::platform_biometric(),
        })
        .unwrap();
        assert_eq!(body["userVerification"], "required");
        assert_eq!(
            body["authenticatorSelection"]["authenticatorAttachment"],
            "platform"
        );
    }
}
