//! Passkey registration and authentication ceremonies.
//!
//! Each ceremony is options → platform credential operation → verify: exactly
//! two server round-trips and one platform interaction, never retried. Progress
//! is published per ceremony kind on a `watch` channel; starting a ceremony
//! while one of the same kind is in flight fails immediately.

use super::{
    platform::{CredentialPlatform, PlatformError},
    types::{
        AssertionRequest, AuthenticationOptionsRequest, AuthenticationVerifyResponse,
        AuthenticatorSelection, CeremonyKind, CeremonyState, CreationRequest,
        RegistrationOptionsRequest, RegistrationOutcome, VerifyCredentialRequest,
        USER_VERIFICATION_REQUIRED,
    },
};
use crate::{
    app_lib::{ApiClient, ApiFailure, ConsoleError},
    features::auth::types::IssuedSession,
};
use secrecy::SecretString;
use serde_json::Value;
use std::{future::Future, sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

const ALREADY_REGISTERED_MESSAGE: &str =
    "This passkey is already registered. Use it to sign in or remove it first.";

pub struct CeremonyClient {
    api: ApiClient,
    platform: Arc<dyn CredentialPlatform>,
    ceremony_timeout: Duration,
    registration: watch::Sender<CeremonyState>,
    authentication: watch::Sender<CeremonyState>,
}

impl CeremonyClient {
    #[must_use]
    pub fn new(
        api: ApiClient,
        platform: Arc<dyn CredentialPlatform>,
        ceremony_timeout: Duration,
    ) -> Self {
        let (registration, _) = watch::channel(CeremonyState::Idle);
        let (authentication, _) = watch::channel(CeremonyState::Idle);
        Self {
            api,
            platform,
            ceremony_timeout,
            registration,
            authentication,
        }
    }

    #[must_use]
    pub fn platform(&self) -> &Arc<dyn CredentialPlatform> {
        &self.platform
    }

    #[must_use]
    pub fn state(&self, kind: CeremonyKind) -> CeremonyState {
        *self.channel(kind).borrow()
    }

    /// Receiver that observes every state transition of one ceremony kind.
    #[must_use]
    pub fn subscribe(&self, kind: CeremonyKind) -> watch::Receiver<CeremonyState> {
        self.channel(kind).subscribe()
    }

    /// Registers a platform passkey for the signed-in account.
    ///
    /// # Errors
    /// - `CeremonyInProgress` if a registration is already running.
    /// - `SessionExpired` when the server's registration challenge expired.
    /// - `CeremonyCancelled` when the operator cancels or the ceremony times out.
    /// - `RegistrationFailed` for any other refusal.
    #[instrument(skip(self, token))]
    pub async fn register(
        &self,
        email: &str,
        token: &SecretString,
    ) -> Result<RegistrationOutcome, ConsoleError> {
        let run = CeremonyRun::begin(&self.registration, CeremonyKind::Registration)?;

        let body = RegistrationOptionsRequest {
            email,
            user_verification: USER_VERIFICATION_REQUIRED,
            authenticator_selection: AuthenticatorSelection::platform_biometric(),
        };
        let options: Value = self
            .api
            .post_json("/passkey/register/options", &body, Some(token))
            .await
            .map_err(|failure| registration_error(failure, "Failed to get registration options"))?;
        let request = CreationRequest::from_server_options(options)?;
        run.advance(CeremonyState::OptionsReceived);

        let credential = self
            .bounded(self.platform.create_credential(request))
            .await
            .map_err(|err| platform_error(err, CeremonyKind::Registration))?;
        run.advance(CeremonyState::CredentialCreated);

        run.advance(CeremonyState::VerificationRequested);
        let outcome: RegistrationOutcome = self
            .api
            .post_json(
                "/passkey/register/verify",
                &VerifyCredentialRequest { credential },
                Some(token),
            )
            .await
            .map_err(|failure| registration_error(failure, "Failed to verify registration"))?;

        run.finish();
        info!("Passkey registration successful");
        Ok(outcome)
    }

    /// Signs in with a passkey and returns the issued session.
    ///
    /// # Errors
    /// - `CeremonyInProgress` if an authentication is already running.
    /// - `NoPasskeysRegistered` or `AccountNotFound` from the options call.
    /// - `CeremonyCancelled` when the operator cancels or the ceremony times out.
    /// - `AuthenticationFailed` for any other refusal.
    #[instrument(skip(self))]
    pub async fn authenticate(&self, email: &str) -> Result<IssuedSession, ConsoleError> {
        let run = CeremonyRun::begin(&self.authentication, CeremonyKind::Authentication)?;

        let body = AuthenticationOptionsRequest {
            email,
            user_verification: USER_VERIFICATION_REQUIRED,
        };
        let options: Value = self
            .api
            .post_json("/passkey/authenticate/options", &body, None)
            .await
            .map_err(authentication_options_error)?;
        let request = AssertionRequest::from_server_options(options)?;
        run.advance(CeremonyState::OptionsReceived);

        let credential = self
            .bounded(self.platform.get_assertion(request))
            .await
            .map_err(|err| platform_error(err, CeremonyKind::Authentication))?;
        run.advance(CeremonyState::CredentialCreated);

        run.advance(CeremonyState::VerificationRequested);
        let response: AuthenticationVerifyResponse = self
            .api
            .post_json(
                "/passkey/authenticate/verify",
                &VerifyCredentialRequest { credential },
                None,
            )
            .await
            .map_err(|failure| match failure {
                ApiFailure::Rejected { body, .. } => ConsoleError::AuthenticationFailed(
                    body.reason()
                        .unwrap_or("Failed to verify authentication")
                        .to_string(),
                ),
                ApiFailure::Transport(err) => err,
            })?;

        let session = match response {
            AuthenticationVerifyResponse {
                success: true,
                token: Some(token),
                user: Some(user),
                ..
            } if !token.is_empty() => IssuedSession {
                token: SecretString::from(token),
                user,
            },
            AuthenticationVerifyResponse { error, .. } => {
                return Err(ConsoleError::AuthenticationFailed(
                    error.unwrap_or_else(|| "Passkey authentication failed".to_string()),
                ))
            }
        };

        run.finish();
        info!("Passkey authentication successful");
        Ok(session)
    }

    fn channel(&self, kind: CeremonyKind) -> &watch::Sender<CeremonyState> {
        match kind {
            CeremonyKind::Registration => &self.registration,
            CeremonyKind::Authentication => &self.authentication,
        }
    }

    /// Bounds a platform operation by the ceremony timeout.
    async fn bounded<F>(&self, operation: F) -> Result<Value, PlatformError>
    where
        F: Future<Output = Result<Value, PlatformError>>,
    {
        tokio::time::timeout(self.ceremony_timeout, operation)
            .await
            .unwrap_or_else(|_| {
                warn!(timeout = ?self.ceremony_timeout, "platform ceremony timed out");
                Err(PlatformError::Cancelled)
            })
    }
}

/// Marks a ceremony as running for as long as it lives; a run dropped before
/// `finish` leaves the ceremony in `Failed`.
struct CeremonyRun<'a> {
    state: &'a watch::Sender<CeremonyState>,
    finished: bool,
}

impl<'a> CeremonyRun<'a> {
    fn begin(
        state: &'a watch::Sender<CeremonyState>,
        kind: CeremonyKind,
    ) -> Result<Self, ConsoleError> {
        let started = state.send_if_modified(|current| {
            if current.in_flight() {
                false
            } else {
                *current = CeremonyState::OptionsRequested;
                true
            }
        });

        if started {
            debug!(ceremony = kind.label(), "ceremony started");
            Ok(Self {
                state,
                finished: false,
            })
        } else {
            Err(ConsoleError::CeremonyInProgress(kind.label()))
        }
    }

    fn advance(&self, next: CeremonyState) {
        self.state.send_replace(next);
    }

    fn finish(mut self) {
        self.finished = true;
        self.state.send_replace(CeremonyState::Verified);
    }
}

impl Drop for CeremonyRun<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.state.send_replace(CeremonyState::Failed);
        }
    }
}

fn registration_error(failure: ApiFailure, fallback: &str) -> ConsoleError {
    match failure {
        ApiFailure::Rejected { body, .. } if body.has_code("SESSION_EXPIRED") => {
            ConsoleError::SessionExpired
        }
        ApiFailure::Rejected { body, .. } => {
            ConsoleError::RegistrationFailed(body.reason().unwrap_or(fallback).to_string())
        }
        ApiFailure::Transport(err) => err,
    }
}

fn authentication_options_error(failure: ApiFailure) -> ConsoleError {
    match failure {
        ApiFailure::Rejected { body, .. } if body.has_code("NO_PASSKEYS") => {
            ConsoleError::NoPasskeysRegistered
        }
        ApiFailure::Rejected { body, .. } if body.has_code("USER_NOT_FOUND") => {
            ConsoleError::AccountNotFound
        }
        ApiFailure::Rejected { body, .. } => ConsoleError::AuthenticationFailed(
            body.reason()
                .unwrap_or("Failed to get authentication options")
                .to_string(),
        ),
        ApiFailure::Transport(err) => err,
    }
}

fn platform_error(err: PlatformError, kind: CeremonyKind) -> ConsoleError {
    match (err, kind) {
        (PlatformError::Cancelled, _) => ConsoleError::CeremonyCancelled,
        (PlatformError::Unsupported, _) => ConsoleError::PasskeysUnsupported,
        (PlatformError::AlreadyRegistered, CeremonyKind::Registration) => {
            ConsoleError::RegistrationFailed(ALREADY_REGISTERED_MESSAGE.to_string())
        }
        (err, CeremonyKind::Registration) => ConsoleError::RegistrationFailed(err.to_string()),
        (err, CeremonyKind::Authentication) => ConsoleError::AuthenticationFailed(err.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{
        app_lib::ConsoleConfig,
        features::{auth::types::Role, webauthn::testing::FakePlatform},
    };
    use secrecy::ExposeSecret;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0)";

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client(server: &MockServer, platform: &FakePlatform, timeout: Duration) -> CeremonyClient {
        let api = ApiClient::new(&ConsoleConfig::new(&server.uri())).unwrap();
        CeremonyClient::new(api, Arc::new(platform.clone()), timeout)
    }

    async fn mount_authentication_options(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/passkey/authenticate/options"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "challenge": "YXV0aA",
                "userVerification": "preferred"
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn register_runs_options_platform_verify() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/passkey/register/options"))
            .and(header("Authorization", "Bearer tok-1"))
            .and(body_json(json!({
                "email": "a@b.com",
                "userVerification": "required",
                "authenticatorSelection": {
                    "authenticatorAttachment": "platform",
                    "userVerification": "required",
                    "residentKey": "required",
                    "requireResidentKey": true
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "challenge": "cmVn",
                "authenticatorSelection": {"authenticatorAttachment": "cross-platform"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/passkey/register/verify"))
            .and(header("Authorization", "Bearer tok-1"))
            .and(body_json(json!({"credential": {"id": "cred-1", "type": "public-key"}})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"message": "Passkey registered"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let platform = FakePlatform::supported(UA);
        let ceremonies = client(&server, &platform, Duration::from_secs(5));
        let mut states = ceremonies.subscribe(CeremonyKind::Registration);

        let outcome = ceremonies
            .register("a@b.com", &SecretString::from("tok-1".to_string()))
            .await?;

        assert_eq!(outcome.message.as_deref(), Some("Passkey registered"));
        assert_eq!(platform.calls(), 1);
        let handed = platform.last_options().unwrap();
        assert_eq!(
            handed["publicKey"]["authenticatorSelection"]["authenticatorAttachment"],
            "platform"
        );
        assert_eq!(ceremonies.state(CeremonyKind::Registration), CeremonyState::Verified);
        assert!(states.has_changed()?);
        assert_eq!(*states.borrow_and_update(), CeremonyState::Verified);
        Ok(())
    }

    #[tokio::test]
    async fn expired_registration_session_is_reported() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/passkey/register/options"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"challenge": "cmVn"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/passkey/register/verify"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "SESSION_EXPIRED",
                "error": "challenge expired"
            })))
            .mount(&server)
            .await;

        let platform = FakePlatform::supported(UA);
        let ceremonies = client(&server, &platform, Duration::from_secs(5));
        let err = ceremonies
            .register("a@b.com", &SecretString::from("tok".to_string()))
            .await
            .err();

        assert_eq!(err, Some(ConsoleError::SessionExpired));
        assert_eq!(ceremonies.state(CeremonyKind::Registration), CeremonyState::Failed);
        Ok(())
    }

    #[tokio::test]
    async fn already_registered_authenticator_fails_registration() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/passkey/register/options"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"challenge": "cmVn"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/passkey/register/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let platform =
            FakePlatform::supported(UA).with_outcome(Err(PlatformError::AlreadyRegistered));
        let ceremonies = client(&server, &platform, Duration::from_secs(5));
        let err = ceremonies
            .register("a@b.com", &SecretString::from("tok".to_string()))
            .await
            .err();

        assert_eq!(
            err,
            Some(ConsoleError::RegistrationFailed(
                ALREADY_REGISTERED_MESSAGE.to_string()
            ))
        );
        Ok(())
    }

    #[tokio::test]
    async fn authenticate_returns_session() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_authentication_options(&server).await;
        Mock::given(method("POST"))
            .and(path("/passkey/authenticate/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "token": "tok-pk",
                "user": {"_id": "u1", "email": "a@b.com", "role": "user"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let platform = FakePlatform::supported(UA);
        let ceremonies = client(&server, &platform, Duration::from_secs(5));
        let session = ceremonies.authenticate("a@b.com").await?;

        assert_eq!(session.token.expose_secret(), "tok-pk");
        assert_eq!(session.user.role, Role::User);
        let handed = platform.last_options().unwrap();
        assert_eq!(handed["publicKey"]["userVerification"], "required");
        Ok(())
    }

    #[tokio::test]
    async fn no_passkeys_is_distinct_from_unknown_account() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/passkey/authenticate/options"))
            .and(body_json(json!({"email": "none@b.com", "userVerification": "required"})))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"code": "NO_PASSKEYS", "error": "no credentials"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/passkey/authenticate/options"))
            .and(body_json(json!({"email": "ghost@b.com", "userVerification": "required"})))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"code": "USER_NOT_FOUND", "error": "missing"})),
            )
            .mount(&server)
            .await;

        let platform = FakePlatform::supported(UA);
        let ceremonies = client(&server, &platform, Duration::from_secs(5));

        let no_passkeys = ceremonies.authenticate("none@b.com").await.err().unwrap();
        assert_eq!(no_passkeys, ConsoleError::NoPasskeysRegistered);
        assert!(no_passkeys.to_string().contains("No passkeys found"));

        let unknown = ceremonies.authenticate("ghost@b.com").await.err().unwrap();
        assert_eq!(unknown, ConsoleError::AccountNotFound);
        assert_eq!(platform.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn unsuccessful_verification_is_authentication_failure() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_authentication_options(&server).await;
        Mock::given(method("POST"))
            .and(path("/passkey/authenticate/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "Signature mismatch"
            })))
            .mount(&server)
            .await;

        let platform = FakePlatform::supported(UA);
        let ceremonies = client(&server, &platform, Duration::from_secs(5));
        let err = ceremonies.authenticate("a@b.com").await.err();

        assert_eq!(
            err,
            Some(ConsoleError::AuthenticationFailed("Signature mismatch".into()))
        );
        assert_eq!(
            ceremonies.state(CeremonyKind::Authentication),
            CeremonyState::Failed
        );
        Ok(())
    }

    #[tokio::test]
    async fn slow_platform_is_cancelled_without_verify() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_authentication_options(&server).await;
        Mock::given(method("POST"))
            .and(path("/passkey/authenticate/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let platform = FakePlatform::supported(UA).with_delay(Duration::from_secs(5));
        let ceremonies = client(&server, &platform, Duration::from_millis(50));
        let err = ceremonies.authenticate("a@b.com").await.err();

        assert_eq!(err, Some(ConsoleError::CeremonyCancelled));
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_ceremony_of_same_kind_is_rejected() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        mount_authentication_options(&server).await;
        Mock::given(method("POST"))
            .and(path("/passkey/authenticate/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "token": "tok-pk",
                "user": {"id": "u1", "email": "a@b.com", "role": "user"}
            })))
            .mount(&server)
            .await;

        let platform = FakePlatform::supported(UA).with_delay(Duration::from_millis(100));
        let ceremonies = client(&server, &platform, Duration::from_secs(5));

        let (first, second) = tokio::join!(
            ceremonies.authenticate("a@b.com"),
            ceremonies.authenticate("a@b.com")
        );

        assert!(first.is_ok());
        assert_eq!(
            second.err(),
            Some(ConsoleError::CeremonyInProgress("authentication"))
        );
        assert_eq!(platform.calls(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_ceremony_can_be_retried_by_caller() -> anyhow::Result<()> {
        let api = ApiClient::new(&ConsoleConfig::new("http://127.0.0.1:9"))?;
        let ceremonies = CeremonyClient::new(
            api,
            Arc::new(FakePlatform::supported(UA)),
            Duration::from_secs(1),
        );

        let first = ceremonies.authenticate("a@b.com").await.err().unwrap();
        assert!(first.is_transport());
        assert_eq!(
            ceremonies.state(CeremonyKind::Authentication),
            CeremonyState::Failed
        );

        let second = ceremonies.authenticate("a@b.com").await.err().unwrap();
        assert!(second.is_transport());
        Ok(())
    }
}
