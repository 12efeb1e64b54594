use clap::{Arg, Command};

pub const ARG_SESSION_ID: &str = "session-id";

#[must_use]
pub fn subcommand() -> Command {
    Command::new("sessions")
        .about("Inspect and end device sessions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List device sessions"))
        .subcommand(
            Command::new("terminate")
                .about("End one device session, then sign out locally")
                .arg(Arg::new(ARG_SESSION_ID).help("Session id").required(true)),
        )
        .subcommand(Command::new("terminate-all").about("End every device session"))
}
