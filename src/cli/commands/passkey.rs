use super::account::email_arg;
use clap::{Arg, Command};

pub const ARG_PASSKEY_ID: &str = "passkey-id";

#[must_use]
pub fn subcommand() -> Command {
    Command::new("passkey")
        .about("Register, use and manage passkeys")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("register")
                .about("Register a passkey for the signed-in account")
                .arg(email_arg().help("Account email (default: the signed-in identity)")),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in with a passkey")
                .arg(email_arg().required(true)),
        )
        .subcommand(Command::new("list").about("List registered passkeys"))
        .subcommand(
            Command::new("delete")
                .about("Remove a passkey")
                .arg(Arg::new(ARG_PASSKEY_ID).help("Passkey id").required(true)),
        )
}
