//! Google OAuth callback handling. The backend finishes the OAuth exchange and
//! redirects back with `token`, a URL-encoded `user` JSON document, or an
//! `error` code. Only parsing happens here; adopting the session is the
//! store's job.

use crate::{
    app_lib::ConsoleError,
    features::auth::types::{Identity, IssuedSession},
};
use secrecy::SecretString;
use url::Url;

/// Error codes the backend reports on the callback URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OAuthErrorCode {
    OauthFailed,
    NoUser,
    TokenGenerationFailed,
    Unknown,
}

impl OAuthErrorCode {
    #[must_use]
    pub fn parse(code: &str) -> Self {
        match code {
            "oauth_failed" => Self::OauthFailed,
            "no_user" => Self::NoUser,
            "token_generation_failed" => Self::TokenGenerationFailed,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::OauthFailed => "Google OAuth authentication failed. Please try again.",
            Self::NoUser => "No user account found. Please register first.",
            Self::TokenGenerationFailed => {
                "Authentication token generation failed. Please try again."
            }
            Self::Unknown => "An error occurred during authentication.",
        }
    }
}

/// Parses the callback URL into an issued session.
///
/// # Errors
/// Returns `OAuth` with a user-facing message when the callback reports an
/// error, lacks the token or user, or carries an unreadable user document.
pub fn parse_callback(callback_url: &str) -> Result<IssuedSession, ConsoleError> {
    let url = Url::parse(callback_url.trim())
        .map_err(|_| ConsoleError::OAuth("Invalid authentication response from Google.".into()))?;

    let mut token = None;
    let mut user = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "error" => {
                return Err(ConsoleError::OAuth(
                    OAuthErrorCode::parse(&value).message().to_string(),
                ))
            }
            "token" => token = Some(value.into_owned()),
            "user" => user = Some(value.into_owned()),
            _ => {}
        }
    }

    let (Some(token), Some(user)) = (
        token.filter(|value| !value.is_empty()),
        user.filter(|value| !value.is_empty()),
    ) else {
        return Err(ConsoleError::OAuth(
            "Invalid authentication response from Google.".into(),
        ));
    };

    let user: Identity = serde_json::from_str(&user).map_err(|_| {
        ConsoleError::OAuth("Failed to process authentication response.".into())
    })?;

    Ok(IssuedSession {
        token: SecretString::from(token),
        user,
    })
}
