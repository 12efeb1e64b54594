use clap::{Arg, ArgAction, Command};

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_CONFIRM_PASSWORD: &str = "confirm-password";
pub const ARG_FULL_NAME: &str = "full-name";
pub const ARG_PHONE: &str = "phone";
pub const ARG_AGREE_TO_TERMS: &str = "agree-to-terms";
pub const ARG_CALLBACK_URL: &str = "callback-url";

pub(crate) fn email_arg() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long(ARG_EMAIL)
        .help("Account email")
        .env("IDENTIHUB_EMAIL")
}

fn password_arg() -> Arg {
    Arg::new(ARG_PASSWORD)
        .short('p')
        .long(ARG_PASSWORD)
        .help("Account password")
        .env("IDENTIHUB_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn subcommands() -> Vec<Command> {
    vec![
        Command::new("login")
            .about("Sign in with email and password")
            .arg(email_arg().required(true))
            .arg(password_arg()),
        Command::new("login-admin")
            .about("Sign in through the admin portal")
            .arg(email_arg().required(true))
            .arg(password_arg()),
        Command::new("register")
            .about("Create an account")
            .arg(
                Arg::new(ARG_FULL_NAME)
                    .long(ARG_FULL_NAME)
                    .help("Full name")
                    .required(true),
            )
            .arg(email_arg().required(true))
            .arg(
                Arg::new(ARG_PHONE)
                    .long(ARG_PHONE)
                    .help("Phone number, 7 to 15 digits with optional leading +")
                    .required(true),
            )
            .arg(password_arg())
            .arg(
                Arg::new(ARG_CONFIRM_PASSWORD)
                    .long(ARG_CONFIRM_PASSWORD)
                    .help("Password confirmation")
                    .env("IDENTIHUB_CONFIRM_PASSWORD")
                    .hide_env_values(true)
                    .required(true),
            )
            .arg(
                Arg::new(ARG_AGREE_TO_TERMS)
                    .long(ARG_AGREE_TO_TERMS)
                    .help("Accept the Terms & Conditions")
                    .action(ArgAction::SetTrue),
            ),
        Command::new("whoami").about("Show the signed-in identity"),
        Command::new("logout").about("End every session and forget the local token"),
        Command::new("google-url").about("Print the URL that starts Google sign-in"),
        Command::new("google-callback")
            .about("Finish Google sign-in from the callback URL")
            .arg(
                Arg::new(ARG_CALLBACK_URL)
                    .help("Full callback URL, including the query string")
                    .required(true),
            ),
        Command::new("capabilities").about("Report passkey support on this device"),
    ]
}
