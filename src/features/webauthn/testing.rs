//! Scriptable credential platform for unit tests.

use super::{
    platform::{CredentialPlatform, PlatformError},
    types::{AssertionRequest, CreationRequest},
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

#[derive(Clone)]
pub struct FakePlatform {
    user_agent: String,
    authenticator: bool,
    broken_mediation: bool,
    outcome: Result<Value, PlatformError>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    last_options: Arc<Mutex<Option<Value>>>,
}

impl FakePlatform {
    pub fn supported(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            authenticator: true,
            broken_mediation: false,
            outcome: Ok(json!({"id": "cred-1", "type": "public-key"})),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            last_options: Arc::new(Mutex::new(None)),
        }
    }

    pub fn unsupported(user_agent: &str) -> Self {
        Self {
            authenticator: false,
            ..Self::supported(user_agent)
        }
    }

    pub fn with_broken_mediation(mut self) -> Self {
        self.broken_mediation = true;
        self
    }

    pub fn with_outcome(mut self, outcome: Result<Value, PlatformError>) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<Value> {
        self.last_options.lock().ok().and_then(|slot| slot.clone())
    }

    async fn respond(&self, options: Value) -> Result<Value, PlatformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut slot) = self.last_options.lock() {
            *slot = Some(options);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}

#[async_trait]
impl CredentialPlatform for FakePlatform {
    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    async fn platform_authenticator_available(&self) -> Result<bool, PlatformError> {
        Ok(self.authenticator)
    }

    async fn conditional_mediation_available(&self) -> Result<bool, PlatformError> {
        if self.broken_mediation {
            Err(PlatformError::Failed("predicate threw".to_string()))
        } else {
            Ok(self.authenticator)
        }
    }

    async fn create_credential(&self, request: CreationRequest) -> Result<Value, PlatformError> {
        self.respond(request.into_json()).await
    }

    async fn get_assertion(&self, request: AssertionRequest) -> Result<Value, PlatformError> {
        self.respond(request.into_json()).await
    }
}
