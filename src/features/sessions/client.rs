//! Client helpers for device-session endpoints. Every call except
//! [`register_device`] is bearer-authenticated.

use crate::{
    app_lib::{api::path_id, ApiClient, ConsoleError},
    features::sessions::types::{DeviceSession, NewDeviceSession},
};
use secrecy::SecretString;
use tracing::instrument;

/// Lists the device sessions of the signed-in account.
///
/// # Errors
/// Returns the mapped API error.
#[instrument(skip(api, token))]
pub async fn list(api: &ApiClient, token: &SecretString) -> Result<Vec<DeviceSession>, ConsoleError> {
    Ok(api.get_json("/api/sessions", Some(token)).await?)
}

/// Ends one device session.
///
/// # Errors
/// Returns `Validation` for a malformed id, otherwise the mapped API error.
#[instrument(skip(api, token))]
pub async fn terminate(
    api: &ApiClient,
    token: &SecretString,
    session_id: &str,
) -> Result<(), ConsoleError> {
    let id = path_id(session_id, "Session")?;
    Ok(api.put_empty(&format!("/api/logout/{id}"), Some(token)).await?)
}

/// Ends every device session of the signed-in account.
///
/// # Errors
/// Returns the mapped API error.
#[instrument(skip(api, token))]
pub async fn terminate_all(api: &ApiClient, token: &SecretString) -> Result<(), ConsoleError> {
    Ok(api.put_empty("/api/logout-all", Some(token)).await?)
}

/// Records the device a login happened on.
///
/// # Errors
/// Returns the mapped API error.
#[instrument(skip(api, session, user_agent), fields(method = ?session.login_method))]
pub async fn register_device(
    api: &ApiClient,
    session: &NewDeviceSession,
    user_agent: &str,
) -> Result<(), ConsoleError> {
    Ok(api
        .post_json_with_headers("/api/login", session, &[("User-Agent", user_agent)])
        .await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{
        app_lib::ConsoleConfig,
        features::{auth::types::LoginMethod, sessions::types::SessionStatus},
    };
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn token() -> SecretString {
        SecretString::from("tok-s".to_string())
    }

    #[tokio::test]
    async fn list_returns_sessions() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/sessions"))
            .and(header("Authorization", "Bearer tok-s"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": "s1", "device": "MacBook", "status": "Active"},
                {"_id": "s2", "device": "iPhone", "status": "Inactive"}
            ])))
            .mount(&server)
            .await;

        let api = ApiClient::new(&ConsoleConfig::new(&server.uri()))?;
        let sessions = list(&api, &token()).await?;
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[1].status, SessionStatus::Inactive);
        Ok(())
    }

    #[tokio::test]
    async fn terminate_puts_empty_body() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/logout/s1"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&ConsoleConfig::new(&server.uri()))?;
        terminate(&api, &token(), "s1").await?;
        assert!(matches!(
            terminate(&api, &token(), "").await,
            Err(ConsoleError::Validation(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn register_device_forwards_user_agent() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .and(header("User-Agent", "Mozilla/5.0 (Windows NT 10.0)"))
            .and(body_json(json!({
                "screenResolution": "1920x1080",
                "location": "Admin Portal",
                "userId": "u1",
                "userEmail": "a@b.com",
                "sessionToken": "0123456789",
                "loginMethod": "admin_password"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&ConsoleConfig::new(&server.uri()))?;
        let session = NewDeviceSession {
            screen_resolution: "1920x1080".into(),
            location: "Admin Portal".into(),
            user_id: "u1".into(),
            user_email: "a@b.com".into(),
            session_token: "0123456789".into(),
            login_method: LoginMethod::AdminPassword,
        };
        register_device(&api, &session, "Mozilla/5.0 (Windows NT 10.0)").await?;
        Ok(())
    }
}
