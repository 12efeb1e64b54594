use crate::features::auth::types::LoginMethod;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters of the session token recorded with a device session.
pub const SESSION_TOKEN_PREFIX_CHARS: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Active,
    #[default]
    #[serde(other)]
    Inactive,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Inactive => write!(f, "Inactive"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSession {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub browser: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub last_seen: String,
    #[serde(default)]
    pub status: SessionStatus,
}

/// Device-session record created after every successful login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeviceSession {
    pub screen_resolution: String,
    pub location: String,
    pub user_id: String,
    pub user_email: String,
    /// Truncated token prefix, never the full token.
    pub session_token: String,
    pub login_method: LoginMethod,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn device_session_accepts_server_shape() {
        let session: DeviceSession = serde_json::from_value(json!({
            "_id": "s1",
            "device": "iPhone",
            "browser": "Safari",
            "location": "Colombo, Sri Lanka",
            "ipAddress": "10.0.0.1",
            "lastSeen": "2024-05-01T10:00:00Z",
            "status": "Active"
        }))
        .unwrap();
        assert_eq!(session.id, "s1");
        assert_eq!(session.ip_address, "10.0.0.1");
        assert_eq!(session.status, SessionStatus::Active);
    }

    #[test]
    fn unknown_status_is_inactive() {
        let session: DeviceSession =
            serde_json::from_value(json!({"id": "s2", "status": "Expired"})).unwrap();
        assert_eq!(session.status, SessionStatus::Inactive);
        assert!(session.device.is_empty());
    }
}
