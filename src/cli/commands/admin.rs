use clap::{builder::PossibleValuesParser, Arg, Command};

pub const ARG_USER_ID: &str = "user-id";
pub const ARG_ROLE: &str = "role";
pub const ARG_SEARCH: &str = "search";
pub const ARG_STATUS: &str = "status";
pub const ARG_PAGE: &str = "page";
pub const ARG_LIMIT: &str = "limit";

fn user_id_arg() -> Arg {
    Arg::new(ARG_USER_ID).help("User id").required(true)
}

#[must_use]
pub fn subcommand() -> Command {
    Command::new("admin")
        .about("Manage users (admin accounts only)")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("stats").about("Show user statistics"))
        .subcommand(
            Command::new("search")
                .about("Search users")
                .arg(
                    Arg::new(ARG_SEARCH)
                        .short('s')
                        .long(ARG_SEARCH)
                        .help("Match against email or name"),
                )
                .arg(
                    Arg::new(ARG_ROLE)
                        .long(ARG_ROLE)
                        .help("Only users with this role")
                        .value_parser(PossibleValuesParser::new(["user", "admin"])),
                )
                .arg(
                    Arg::new(ARG_STATUS)
                        .long(ARG_STATUS)
                        .help("Only users with this status"),
                )
                .arg(
                    Arg::new(ARG_PAGE)
                        .long(ARG_PAGE)
                        .help("Result page, starting at 1")
                        .default_value("1")
                        .value_parser(clap::value_parser!(u32).range(1..)),
                )
                .arg(
                    Arg::new(ARG_LIMIT)
                        .long(ARG_LIMIT)
                        .help("Users per page")
                        .default_value("10")
                        .value_parser(clap::value_parser!(u32).range(1..=100)),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Show one user's profile, login history and sessions")
                .arg(user_id_arg()),
        )
        .subcommand(
            Command::new("set-role")
                .about("Change a user's role")
                .arg(user_id_arg())
                .arg(
                    Arg::new(ARG_ROLE)
                        .help("New role")
                        .required(true)
                        .value_parser(PossibleValuesParser::new(["user", "admin"])),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a user")
                .arg(user_id_arg()),
        )
}
