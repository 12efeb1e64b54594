//! Account registration form and its client-side validation. The server
//! repeats every check; these exist so obvious mistakes never leave the machine.

use crate::{
    app_lib::{ApiClient, ConsoleError},
    features::auth::{client, types::RegisterAccountRequest},
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

const MIN_PASSWORD_CHARS: usize = 8;

static EMAIL_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());
static PHONE_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\+?\d{7,15}$").ok());

#[must_use]
pub fn valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

#[must_use]
pub fn valid_phone(phone: &str) -> bool {
    PHONE_RE.as_ref().is_some_and(|re| re.is_match(phone))
}

#[derive(Clone, Default)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub agree_to_terms: bool,
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"***")
            .field("confirm_password", &"***")
            .field("agree_to_terms", &self.agree_to_terms)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl RegistrationForm {
    /// Returns every problem with the form, in field order. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let mut push = |field, message| errors.push(FieldError { field, message });

        if self.full_name.trim().is_empty() {
            push("fullName", "Full name is required");
        }

        if self.email.is_empty() {
            push("email", "Email is required");
        } else if !valid_email(&self.email) {
            push("email", "Invalid email address");
        }

        if self.phone.is_empty() {
            push("phone", "Phone number is required");
        } else if !valid_phone(&self.phone) {
            push("phone", "Invalid phone number");
        }

        if self.password.is_empty() {
            push("password", "Password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_CHARS {
            push("password", "Password must be at least 8 characters");
        }

        if self.confirm_password.is_empty() {
            push("confirmPassword", "Please confirm your password");
        } else if self.password != self.confirm_password {
            push("confirmPassword", "Passwords do not match");
        }

        if !self.agree_to_terms {
            push("agreeToTerms", "You must agree to the Terms & Conditions");
        }

        errors
    }
}

/// Validates the form and submits it.
///
/// # Errors
/// Returns `Validation` listing the first invalid field, or the server's refusal.
pub async fn register(api: &ApiClient, form: &RegistrationForm) -> Result<String, ConsoleError> {
    if let Some(first) = form.validate().first() {
        return Err(ConsoleError::Validation(format!(
            "{}: {}",
            first.field, first.message
        )));
    }

    let request = RegisterAccountRequest {
        full_name: form.full_name.trim(),
        email: &form.email,
        phone: &form.phone,
        password: &form.password,
    };

    let response = client::register_account(api, &request).await?;
    Ok(response
        .message
        .unwrap_or_else(|| "Registration successful".to_string()))
}
