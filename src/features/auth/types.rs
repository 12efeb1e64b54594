//! Request and response types for auth-related API calls. Login requests carry
//! passwords and responses carry session tokens, so none of these may be logged.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role as reported by the server. Trusted verbatim: authorization is enforced
/// server-side and the console only uses it to pick what to show.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    #[serde(other)]
    Other,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
            Self::Other => write!(f, "unknown"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    pub role: Role,
}

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Identity,
}

#[derive(Deserialize)]
pub struct VerifyResponse {
    pub user: Identity,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAccountRequest<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RegisterAccountResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// How the current session was obtained; reported with the device session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMethod {
    Password,
    Passkey,
    GoogleOauth,
    AdminPassword,
}

impl LoginMethod {
    /// Location label recorded for methods that do not resolve a real location.
    #[must_use]
    pub fn location_label(self) -> Option<&'static str> {
        match self {
            Self::Password => None,
            Self::Passkey => Some("Passkey Authentication"),
            Self::GoogleOauth => Some("Google OAuth"),
            Self::AdminPassword => Some("Admin Portal"),
        }
    }
}

/// Token plus identity issued by any login flow.
#[derive(Clone)]
pub struct IssuedSession {
    pub token: SecretString,
    pub user: Identity,
}

impl fmt::Debug for IssuedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedSession")
            .field("token", &"***")
            .field("user", &self.user)
            .finish()
    }
}

impl From<LoginResponse> for IssuedSession {
    fn from(response: LoginResponse) -> Self {
        Self {
            token: SecretString::from(response.token),
            user: response.user,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identity_accepts_mongo_style_id() {
        let identity: Identity =
            serde_json::from_value(json!({"_id": "u1", "email": "a@b.com", "role": "admin"}))
                .unwrap();
        assert_eq!(identity.id, "u1");
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn unknown_role_is_not_privileged() {
        let identity: Identity =
            serde_json::from_value(json!({"id": "u1", "email": "a@b.com", "role": "superuser"}))
                .unwrap();
        assert_eq!(identity.role, Role::Other);
    }

    #[test]
    fn login_method_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(LoginMethod::GoogleOauth).unwrap(),
            json!("google_oauth")
        );
        assert_eq!(
            serde_json::to_value(LoginMethod::AdminPassword).unwrap(),
            json!("admin_password")
        );
    }

    #[test]
    fn register_request_uses_camel_case() {
        let body = serde_json::to_value(RegisterAccountRequest {
            full_name: "Ada Lovelace",
            email: "ada@example.com",
            phone: "+94771234567",
            password: "secret-password",
        })
        .unwrap();
        assert_eq!(body["fullName"], "Ada Lovelace");
    }

    #[test]
    fn issued_session_debug_hides_token() {
        let session = IssuedSession {
            token: SecretString::from("tok-secret".to_string()),
            user: Identity {
                id: "u1".into(),
                email: "a@b.com".into(),
                role: Role::User,
            },
        };
        assert!(!format!("{session:?}").contains("tok-secret"));
    }
}
