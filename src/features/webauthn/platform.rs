//! Seam between the ceremony logic and whatever performs the actual
//! public-key-credential operation (a browser, an OS authenticator, a helper
//! process).
//!
//! Two adapters ship with the crate:
//! - [`HeadlessPlatform`] reports no authenticator and refuses ceremonies.
//! - [`CommandPlatform`] delegates ceremonies to an external helper program:
//!   `<helper> create` or `<helper> get` receives the options JSON on stdin and
//!   prints the credential JSON on stdout. Exit code 2 means the user
//!   cancelled; exit code 3 means the authenticator is already registered.

use super::types::{AssertionRequest, CreationRequest};
use async_trait::async_trait;
use serde_json::Value;
use std::{path::PathBuf, process::Stdio};
use thiserror::Error;
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, instrument};

const EXIT_CANCELLED: i32 = 2;
const EXIT_ALREADY_REGISTERED: i32 = 3;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("operation was cancelled or timed out")]
    Cancelled,
    #[error("authenticator is already registered")]
    AlreadyRegistered,
    #[error("no platform authenticator available")]
    Unsupported,
    #[error("{0}")]
    Failed(String),
}

#[async_trait]
pub trait CredentialPlatform: Send + Sync {
    /// User-agent string used for device and biometric heuristics.
    fn user_agent(&self) -> &str;

    /// Whether a user-verifying platform authenticator is available.
    async fn platform_authenticator_available(&self) -> Result<bool, PlatformError>;

    /// Whether autofill-style (conditional) credential selection is available.
    async fn conditional_mediation_available(&self) -> Result<bool, PlatformError>;

    /// Runs the attestation ceremony and returns the credential JSON.
    async fn create_credential(&self, request: CreationRequest) -> Result<Value, PlatformError>;

    /// Runs the assertion ceremony and returns the credential JSON.
    async fn get_assertion(&self, request: AssertionRequest) -> Result<Value, PlatformError>;
}

#[derive(Clone, Debug)]
pub struct HeadlessPlatform {
    user_agent: String,
}

impl HeadlessPlatform {
    #[must_use]
    pub fn new(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
        }
    }
}

#[async_trait]
impl CredentialPlatform for HeadlessPlatform {
    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    async fn platform_authenticator_available(&self) -> Result<bool, PlatformError> {
        Ok(false)
    }

    async fn conditional_mediation_available(&self) -> Result<bool, PlatformError> {
        Ok(false)
    }

    async fn create_credential(&self, _request: CreationRequest) -> Result<Value, PlatformError> {
        Err(PlatformError::Unsupported)
    }

    async fn get_assertion(&self, _request: AssertionRequest) -> Result<Value, PlatformError> {
        Err(PlatformError::Unsupported)
    }
}

#[derive(Clone, Debug)]
pub struct CommandPlatform {
    program: PathBuf,
    args: Vec<String>,
    user_agent: String,
}

impl CommandPlatform {
    #[must_use]
    pub fn new(program: PathBuf, user_agent: &str) -> Self {
        Self {
            program,
            args: Vec::new(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Arguments placed before the `create`/`get` verb.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    #[instrument(skip(self, options), fields(program = %self.program.display()))]
    async fn run(&self, verb: &str, options: Value) -> Result<Value, PlatformError> {
        let payload = serde_json::to_vec(&options)
            .map_err(|err| PlatformError::Failed(format!("Failed to encode options: {err}")))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(verb)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| PlatformError::Failed(format!("Failed to start authenticator: {err}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(&payload).await {
                Ok(()) => {}
                // The helper may exit before reading; its exit code decides.
                Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => {
                    debug!("authenticator closed stdin early");
                }
                Err(err) => {
                    return Err(PlatformError::Failed(format!(
                        "Failed to send options: {err}"
                    )));
                }
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|err| PlatformError::Failed(format!("Authenticator failed: {err}")))?;

        debug!(status = ?output.status, "authenticator finished");

        match output.status.code() {
            Some(0) => serde_json::from_slice(&output.stdout).map_err(|err| {
                PlatformError::Failed(format!("Authenticator returned invalid JSON: {err}"))
            }),
            Some(EXIT_CANCELLED) => Err(PlatformError::Cancelled),
            Some(EXIT_ALREADY_REGISTERED) => Err(PlatformError::AlreadyRegistered),
            _ => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let message = stderr.trim();
                Err(PlatformError::Failed(if message.is_empty() {
                    format!("Authenticator exited with {}", output.status)
                } else {
                    message.to_string()
                }))
            }
        }
    }
}

#[async_trait]
impl CredentialPlatform for CommandPlatform {
    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    async fn platform_authenticator_available(&self) -> Result<bool, PlatformError> {
        Ok(true)
    }

    async fn conditional_mediation_available(&self) -> Result<bool, PlatformError> {
        Ok(false)
    }

    async fn create_credential(&self, request: CreationRequest) -> Result<Value, PlatformError> {
        self.run("create", request.into_json()).await
    }

    async fn get_assertion(&self, request: AssertionRequest) -> Result<Value, PlatformError> {
        self.run("get", request.into_json()).await
    }
}
