pub mod account;
pub mod admin;
pub mod connection;
pub mod logging;
pub mod passkey;
pub mod sessions;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("identihub")
        .about("Identity console: passkeys, sessions and user management")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommands(account::subcommands())
        .subcommand(passkey::subcommand())
        .subcommand(sessions::subcommand())
        .subcommand(admin::subcommand());

    let command = connection::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "identihub");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Identity console: passkeys, sessions and user management".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
        command.debug_assert();
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(
            [
                "IDENTIHUB_API_URL",
                "IDENTIHUB_TIMEOUT_SECONDS",
                "IDENTIHUB_CEREMONY_TIMEOUT_SECONDS",
                "IDENTIHUB_LOG_LEVEL",
            ],
            || {
                let matches = new().get_matches_from(vec!["identihub", "whoami"]);
                assert_eq!(
                    matches.get_one::<String>(connection::ARG_API_URL).cloned(),
                    Some("http://localhost:5000".to_string())
                );
                assert_eq!(
                    matches.get_one::<u64>(connection::ARG_TIMEOUT).copied(),
                    Some(10)
                );
                assert_eq!(
                    matches
                        .get_one::<u64>(connection::ARG_CEREMONY_TIMEOUT)
                        .copied(),
                    Some(120)
                );
                assert!(!matches.get_flag(connection::ARG_JSON));
                assert_eq!(matches.subcommand_name(), Some("whoami"));
            },
        );
    }

    #[test]
    fn test_check_login() {
        temp_env::with_vars_unset(["IDENTIHUB_EMAIL", "IDENTIHUB_PASSWORD"], || {
            let matches = new().get_matches_from(vec![
                "identihub",
                "login",
                "--email",
                "ada@example.com",
                "--password",
                "hunter22",
                "--json",
            ]);
            assert!(matches.get_flag(connection::ARG_JSON));
            let (name, sub_m) = matches.subcommand().unwrap();
            assert_eq!(name, "login");
            assert_eq!(
                sub_m.get_one::<String>(account::ARG_EMAIL).cloned(),
                Some("ada@example.com".to_string())
            );
            assert_eq!(
                sub_m.get_one::<String>(account::ARG_PASSWORD).cloned(),
                Some("hunter22".to_string())
            );
        });
    }

    #[test]
    fn test_login_requires_password() {
        temp_env::with_vars_unset(["IDENTIHUB_PASSWORD"], || {
            let result = new().try_get_matches_from(vec![
                "identihub",
                "login",
                "--email",
                "ada@example.com",
            ]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("IDENTIHUB_API_URL", Some("https://api.identihub.dev")),
                ("IDENTIHUB_TOKEN_PATH", Some("/tmp/identihub/token")),
                ("IDENTIHUB_TIMEOUT_SECONDS", Some("3")),
                ("IDENTIHUB_CEREMONY_TIMEOUT_SECONDS", Some("45")),
                ("IDENTIHUB_AUTHENTICATOR", Some("/usr/bin/fido-helper")),
                ("IDENTIHUB_EMAIL", Some("ada@example.com")),
                ("IDENTIHUB_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["identihub", "passkey", "login"]);
                assert_eq!(
                    matches.get_one::<String>(connection::ARG_API_URL).cloned(),
                    Some("https://api.identihub.dev".to_string())
                );
                assert_eq!(
                    matches
                        .get_one::<PathBuf>(connection::ARG_TOKEN_PATH)
                        .cloned(),
                    Some(PathBuf::from("/tmp/identihub/token"))
                );
                assert_eq!(
                    matches.get_one::<u64>(connection::ARG_TIMEOUT).copied(),
                    Some(3)
                );
                assert_eq!(
                    matches
                        .get_one::<u64>(connection::ARG_CEREMONY_TIMEOUT)
                        .copied(),
                    Some(45)
                );
                assert_eq!(
                    matches
                        .get_one::<PathBuf>(connection::ARG_AUTHENTICATOR)
                        .cloned(),
                    Some(PathBuf::from("/usr/bin/fido-helper"))
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );

                let (_, passkey_m) = matches.subcommand().unwrap();
                let (name, login_m) = passkey_m.subcommand().unwrap();
                assert_eq!(name, "login");
                assert_eq!(
                    login_m.get_one::<String>(account::ARG_EMAIL).cloned(),
                    Some("ada@example.com".to_string())
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("IDENTIHUB_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["identihub", "whoami"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = ["-v", "-vv", "-vvv", "-vvvv"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars_unset(["IDENTIHUB_LOG_LEVEL"], || {
                let matches = new().get_matches_from(vec!["identihub", level, "whoami"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index + 1).ok()
                );
            });
        }
    }

    #[test]
    fn test_admin_search_paging() {
        let matches = new().get_matches_from(vec![
            "identihub",
            "admin",
            "search",
            "--search",
            "ada",
            "--role",
            "admin",
            "--page",
            "3",
        ]);
        let (_, admin_m) = matches.subcommand().unwrap();
        let (name, search_m) = admin_m.subcommand().unwrap();
        assert_eq!(name, "search");
        assert_eq!(search_m.get_one::<u32>(admin::ARG_PAGE).copied(), Some(3));
        assert_eq!(search_m.get_one::<u32>(admin::ARG_LIMIT).copied(), Some(10));
        assert_eq!(
            search_m.get_one::<String>(admin::ARG_ROLE).cloned(),
            Some("admin".to_string())
        );
    }

    #[test]
    fn test_set_role_rejects_unknown_roles() {
        let result = new().try_get_matches_from(vec![
            "identihub",
            "admin",
            "set-role",
            "u1",
            "owner",
        ]);
        assert!(result.is_err());
    }
}
