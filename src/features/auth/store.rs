//! Auth state store and session bootstrap.
//!
//! The store owns the single token + identity pair and publishes it on a
//! `watch` channel so guards and front ends observe one consistent snapshot.
//! Every login path funnels through one adoption step: persist the token,
//! publish token and identity in a single update, then record the device
//! session in the background. Bootstrap fails closed: a persisted token that
//! cannot be verified is discarded.

use crate::{
    app_lib::{ApiClient, ConsoleConfig, ConsoleError},
    features::{
        auth::{
            client, oauth,
            storage::TokenStorage,
            types::{Identity, IssuedSession, LoginMethod, Role},
        },
        sessions::{
            self,
            types::{NewDeviceSession, SESSION_TOKEN_PREFIX_CHARS},
        },
        webauthn::{
            capability::{self, CapabilityProbe},
            CeremonyClient, CredentialPlatform, RegistrationOutcome,
        },
    },
};
use secrecy::{ExposeSecret, SecretString};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{sync::watch, task::JoinSet};
use tracing::{debug, info, instrument, warn};

/// Snapshot of the console's authentication state.
#[derive(Clone, Debug, Default)]
pub struct AuthState {
    pub identity: Option<Identity>,
    pub token: Option<SecretString>,
    /// True until bootstrap has settled.
    pub loading: bool,
    pub passkey_supported: bool,
}

impl AuthState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some() && self.token.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(&Role::Admin)
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role() == Some(&Role::User)
    }

    fn role(&self) -> Option<&Role> {
        self.identity.as_ref().map(|identity| &identity.role)
    }
}

pub struct AuthStore {
    api: ApiClient,
    config: ConsoleConfig,
    storage: Arc<dyn TokenStorage>,
    ceremonies: CeremonyClient,
    state: watch::Sender<AuthState>,
    background: Mutex<JoinSet<()>>,
}

impl AuthStore {
    /// # Errors
    /// Returns `Config` when the HTTP client cannot be built.
    pub fn new(
        config: ConsoleConfig,
        storage: Arc<dyn TokenStorage>,
        platform: Arc<dyn CredentialPlatform>,
    ) -> Result<Self, ConsoleError> {
        let api = ApiClient::new(&config)?;
        let ceremonies = CeremonyClient::new(api.clone(), platform, config.ceremony_timeout());
        let (state, _) = watch::channel(AuthState {
            loading: true,
            ..AuthState::default()
        });

        Ok(Self {
            api,
            config,
            storage,
            ceremonies,
            state,
            background: Mutex::new(JoinSet::new()),
        })
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    #[must_use]
    pub fn ceremonies(&self) -> &CeremonyClient {
        &self.ceremonies
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.state.borrow().is_user()
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    /// Token of the current session.
    ///
    /// # Errors
    /// Returns `NotAuthenticated` when no session is held.
    pub fn token(&self) -> Result<SecretString, ConsoleError> {
        self.state
            .borrow()
            .token
            .clone()
            .ok_or(ConsoleError::NotAuthenticated)
    }

    /// Runs capability detection and records whether passkeys can be used.
    pub async fn probe_capabilities(&self) -> CapabilityProbe {
        let probe = capability::detect(self.ceremonies.platform().as_ref()).await;
        let supported = probe.descriptor.passkeys_supported();
        self.state.send_if_modified(|state| {
            let changed = state.passkey_supported != supported;
            state.passkey_supported = supported;
            changed
        });
        debug!(supported, "passkey support");
        probe
    }

    /// Restores a persisted session. Always leaves `loading` false.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) {
        self.probe_capabilities().await;

        let stored = self.storage.load().unwrap_or_else(|err| {
            warn!("Failed to read persisted token: {err}");
            None
        });

        let Some(token) = stored else {
            self.state.send_modify(|state| state.loading = false);
            return;
        };

        match client::verify(&self.api, &token).await {
            Ok(identity) => {
                info!(user = %identity.email, "session restored");
                self.state.send_modify(|state| {
                    state.identity = Some(identity);
                    state.token = Some(token);
                    state.loading = false;
                });
            }
            Err(err) => {
                warn!("Auth verification failed: {err}");
                self.discard_token();
                self.state.send_modify(|state| {
                    state.identity = None;
                    state.token = None;
                    state.loading = false;
                });
            }
        }
    }

    /// Waits until bootstrap has settled and returns the resulting state.
    pub async fn ready(&self) -> AuthState {
        let mut receiver = self.state.subscribe();
        if let Ok(state) = receiver.wait_for(|state| !state.loading).await {
            return state.clone();
        }
        self.state()
    }

    /// # Errors
    /// Returns `InvalidCredentials` with the server's message on refusal.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, ConsoleError> {
        let session = client::login(&self.api, email, password).await?;
        self.adopt(session, LoginMethod::Password)
    }

    /// # Errors
    /// Returns `InvalidCredentials` with the server's message on refusal.
    #[instrument(skip(self, password))]
    pub async fn login_admin(&self, email: &str, password: &str) -> Result<Identity, ConsoleError> {
        let session = client::login_admin(&self.api, email, password).await?;
        self.adopt(session, LoginMethod::AdminPassword)
    }

    /// # Errors
    /// Returns `PasskeysUnsupported` without a platform authenticator, otherwise
    /// the ceremony's error.
    #[instrument(skip(self))]
    pub async fn login_with_passkey(&self, email: &str) -> Result<Identity, ConsoleError> {
        self.require_passkeys()?;
        let session = self.ceremonies.authenticate(email).await?;
        self.adopt(session, LoginMethod::Passkey)
    }

    /// URL the operator opens to start Google sign-in.
    #[must_use]
    pub fn login_with_google(&self) -> String {
        client::google_login_url(&self.api)
    }

    /// Adopts the session carried by the OAuth callback URL.
    ///
    /// # Errors
    /// Returns `OAuth` with a user-facing message when the callback is unusable.
    #[instrument(skip(self, callback_url))]
    pub async fn handle_google_callback(&self, callback_url: &str) -> Result<Identity, ConsoleError> {
        let session = oauth::parse_callback(callback_url)?;
        self.adopt(session, LoginMethod::GoogleOauth)
    }

    /// # Errors
    /// Returns `PasskeysUnsupported`, `NotAuthenticated`, or the ceremony's error.
    #[instrument(skip(self))]
    pub async fn register_passkey(&self, email: &str) -> Result<RegistrationOutcome, ConsoleError> {
        self.require_passkeys()?;
        let token = self.token()?;
        self.ceremonies.register(email, &token).await
    }

    /// Ends every server session (best effort) and forgets the local one.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Ok(token) = self.token() {
            if let Err(err) = sessions::client::terminate_all(&self.api, &token).await {
                warn!("Session logout failed: {err}");
            }
        }
        self.clear_local();
    }

    /// Ends one device session, then logs out locally.
    ///
    /// # Errors
    /// Returns `NotAuthenticated` without a session, otherwise the API error;
    /// the local session is kept when the server refuses.
    #[instrument(skip(self))]
    pub async fn terminate_session(&self, session_id: &str) -> Result<(), ConsoleError> {
        let token = self.token()?;
        sessions::client::terminate(&self.api, &token, session_id).await?;
        self.logout().await;
        Ok(())
    }

    /// Ends every device session, then forgets the local one.
    ///
    /// # Errors
    /// Returns `NotAuthenticated` without a session, otherwise the API error.
    #[instrument(skip(self))]
    pub async fn terminate_all_sessions(&self) -> Result<(), ConsoleError> {
        let token = self.token()?;
        sessions::client::terminate_all(&self.api, &token).await?;
        self.clear_local();
        Ok(())
    }

    /// Waits up to `within` for background device-session records to finish.
    pub async fn flush_background(&self, within: Duration) {
        let mut pending = match self.background.lock() {
            Ok(mut set) => std::mem::take(&mut *set),
            Err(_) => return,
        };
        let drained = tokio::time::timeout(within, async {
            while pending.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            debug!("background tasks still running at shutdown");
        }
    }

    fn require_passkeys(&self) -> Result<(), ConsoleError> {
        if self.state.borrow().passkey_supported {
            Ok(())
        } else {
            Err(ConsoleError::PasskeysUnsupported)
        }
    }

    fn adopt(&self, session: IssuedSession, method: LoginMethod) -> Result<Identity, ConsoleError> {
        self.storage.save(&session.token)?;

        let identity = session.user.clone();
        let token = session.token.clone();
        self.state.send_modify(|state| {
            state.identity = Some(identity.clone());
            state.token = Some(token);
            state.loading = false;
        });
        info!(user = %identity.email, role = %identity.role, "signed in");

        self.record_device_session(&session, method);
        Ok(identity)
    }

    fn record_device_session(&self, session: &IssuedSession, method: LoginMethod) {
        let record = NewDeviceSession {
            screen_resolution: self.config.screen_resolution().to_string(),
            location: method
                .location_label()
                .map_or_else(|| self.config.location().to_string(), str::to_string),
            user_id: session.user.id.clone(),
            user_email: session.user.email.clone(),
            session_token: token_prefix(&session.token),
            login_method: method,
        };
        let api = self.api.clone();
        let user_agent = self.config.user_agent().to_string();

        let task = async move {
            match sessions::client::register_device(&api, &record, &user_agent).await {
                Ok(()) => debug!("device session recorded"),
                Err(err) => warn!("Session creation failed: {err}"),
            }
        };

        match self.background.lock() {
            Ok(mut set) => {
                // reap finished recordings so the set only holds in-flight ones
                while set.try_join_next().is_some() {}
                set.spawn(task);
            }
            Err(_) => {
                tokio::spawn(task);
            }
        }
    }

    #[cfg(test)]
    fn pending_background(&self) -> usize {
        self.background.lock().map_or(0, |set| set.len())
    }

    fn clear_local(&self) {
        self.discard_token();
        self.state.send_modify(|state| {
            state.identity = None;
            state.token = None;
        });
    }

    fn discard_token(&self) {
        if let Err(err) = self.storage.remove() {
            warn!("Failed to remove persisted token: {err}");
        }
    }
}

fn token_prefix(token: &SecretString) -> String {
    token
        .expose_secret()
        .chars()
        .take(SESSION_TOKEN_PREFIX_CHARS)
        .collect()
}
