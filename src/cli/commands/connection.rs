use crate::app_lib::config::DEFAULT_API_BASE_URL;
use clap::{Arg, ArgAction, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_TOKEN_PATH: &str = "token-path";
pub const ARG_TIMEOUT: &str = "timeout";
pub const ARG_CEREMONY_TIMEOUT: &str = "ceremony-timeout";
pub const ARG_USER_AGENT: &str = "user-agent";
pub const ARG_SCREEN_RESOLUTION: &str = "screen-resolution";
pub const ARG_LOCATION: &str = "location";
pub const ARG_AUTHENTICATOR: &str = "authenticator";
pub const ARG_JSON: &str = "json";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Base URL of the identity API")
                .env("IDENTIHUB_API_URL")
                .default_value(DEFAULT_API_BASE_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_PATH)
                .long(ARG_TOKEN_PATH)
                .help("File holding the session token (default: ~/.identihub/token)")
                .env("IDENTIHUB_TOKEN_PATH")
                .value_parser(clap::value_parser!(std::path::PathBuf))
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("HTTP request timeout in seconds")
                .env("IDENTIHUB_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64))
                .global(true),
        )
        .arg(
            Arg::new(ARG_CEREMONY_TIMEOUT)
                .long(ARG_CEREMONY_TIMEOUT)
                .help("Seconds to wait for the authenticator during a passkey ceremony")
                .env("IDENTIHUB_CEREMONY_TIMEOUT_SECONDS")
                .default_value("120")
                .value_parser(clap::value_parser!(u64))
                .global(true),
        )
        .arg(
            Arg::new(ARG_USER_AGENT)
                .long(ARG_USER_AGENT)
                .help("User agent reported with device sessions")
                .env("IDENTIHUB_USER_AGENT")
                .global(true),
        )
        .arg(
            Arg::new(ARG_SCREEN_RESOLUTION)
                .long(ARG_SCREEN_RESOLUTION)
                .help("Screen resolution reported with device sessions, e.g. 1920x1080")
                .env("IDENTIHUB_SCREEN_RESOLUTION")
                .global(true),
        )
        .arg(
            Arg::new(ARG_LOCATION)
                .long(ARG_LOCATION)
                .help("Location reported with password sign-in device sessions")
                .env("IDENTIHUB_LOCATION")
                .global(true),
        )
        .arg(
            Arg::new(ARG_AUTHENTICATOR)
                .long(ARG_AUTHENTICATOR)
                .help("Helper program that performs passkey ceremonies")
                .long_help(
                    "Helper program that performs passkey ceremonies. It is invoked as `<program> create` or `<program> get`, reads the options JSON on stdin and prints the credential JSON on stdout. Without it passkeys are reported as unsupported.",
                )
                .env("IDENTIHUB_AUTHENTICATOR")
                .value_parser(clap::value_parser!(std::path::PathBuf))
                .global(true),
        )
        .arg(
            Arg::new(ARG_JSON)
                .long(ARG_JSON)
                .help("Print JSON instead of text")
                .action(ArgAction::SetTrue)
                .global(true),
        )
}
