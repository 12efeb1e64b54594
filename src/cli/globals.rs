use crate::{
    app_lib::{ConsoleConfig, ConsoleError},
    features::{
        auth::{AuthStore, FileTokenStorage},
        webauthn::{CommandPlatform, CredentialPlatform, HeadlessPlatform},
    },
};
use std::{path::PathBuf, sync::Arc};

/// Settings shared by every subcommand.
#[derive(Clone, Debug)]
pub struct GlobalArgs {
    pub config: ConsoleConfig,
    /// External program that performs WebAuthn ceremonies; headless when unset.
    pub authenticator: Option<PathBuf>,
    /// Print machine-readable JSON instead of text.
    pub json: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(config: ConsoleConfig) -> Self {
        Self {
            config,
            authenticator: None,
            json: false,
        }
    }

    pub fn set_authenticator(&mut self, program: PathBuf) {
        self.authenticator = Some(program);
    }

    #[must_use]
    pub fn platform(&self) -> Arc<dyn CredentialPlatform> {
        let user_agent = self.config.user_agent();
        match &self.authenticator {
            Some(program) => Arc::new(CommandPlatform::new(program.clone(), user_agent)),
            None => Arc::new(HeadlessPlatform::new(user_agent)),
        }
    }

    /// Auth store backed by the token file and the selected platform.
    ///
    /// # Errors
    /// Returns `Config` when the HTTP client cannot be built.
    pub fn store(&self) -> Result<AuthStore, ConsoleError> {
        let storage = Arc::new(FileTokenStorage::new(self.config.token_path().clone()));
        AuthStore::new(self.config.clone(), storage, self.platform())
    }
}
