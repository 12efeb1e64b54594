use thiserror::Error;

/// Errors surfaced by console operations.
///
/// Every network, server and platform failure is converted into one of these
/// variants at the call site; nothing in the library panics on a bad response.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("Registration session expired. Please try registering again.")]
    SessionExpired,
    #[error(
        "No passkeys found for this account. Please register a passkey first in your profile settings."
    )]
    NoPasskeysRegistered,
    #[error("User account not found. Please check your email address.")]
    AccountNotFound,
    #[error("Capability detection failed: {0}")]
    CapabilityDetectionFailure(String),
    #[error("Operation timed out or was cancelled.")]
    CeremonyCancelled,
    #[error("A passkey {0} is already in progress.")]
    CeremonyInProgress(&'static str),
    #[error("Passkeys are not supported on this device")]
    PasskeysUnsupported,
    #[error("User not authenticated. Please login first.")]
    NotAuthenticated,
    #[error("{0}")]
    RegistrationFailed(String),
    #[error("{0}")]
    AuthenticationFailed(String),
    #[error("{0}")]
    OAuth(String),
}

impl ConsoleError {
    /// Message shown to the operator, with a hint on what to do next.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NoPasskeysRegistered => format!(
                "{self} You can still sign in with your password and add a passkey afterwards."
            ),
            Self::AccountNotFound => {
                format!("{self} If you are new here, register an account first.")
            }
            Self::SessionExpired | Self::CeremonyCancelled => {
                format!("{self} Start the passkey flow again when ready.")
            }
            Self::PasskeysUnsupported => {
                format!("{self}. You can still use password authentication.")
            }
            Self::Network(_) | Self::Timeout(_) => {
                format!("{self} Check your connection and try again.")
            }
            _ => self.to_string(),
        }
    }

    /// True for failures caused by the transport rather than the server's answer.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}
