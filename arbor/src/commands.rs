use crate::config::{DATABASE_ENV, DEFAULT_DATABASE_PATH};
use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("arbor")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("arbor")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress progress and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Log more detail (-vv for debug output)")
                .required(false)
                .action(clap::ArgAction::Count)
                .global(true),
        )
        .arg(
            arg!(--"database" <PATH>)
                .required(false)
                .help("Location of the page database")
                .env(DATABASE_ENV)
                .default_value(DEFAULT_DATABASE_PATH)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            command!("load")
                .about("Crawl a page and the pages it links to, storing them as a tree")
                .arg(arg!(<URL>).required(true).help("The root URL to crawl"))
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("How many links deep to follow below the root page")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("0"),
                )
                .arg(
                    arg!(-f --"force")
                        .required(false)
                        .help("Replace an already stored tree for this URL without asking"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("5"),
                )
                .arg(
                    arg!(-t --"workers" <NUM_WORKERS>)
                        .required(false)
                        .help("How many pages to fetch at once")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    arg!(--"max-duration" <SECONDS>)
                        .required(false)
                        .help("Stop crawling after this many seconds")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(
            command!("get")
                .about("Print a stored tree, shallowest pages first")
                .arg(
                    arg!(<URL_PATTERN>)
                        .required(true)
                        .help("Root URL to look up; SQL LIKE wildcards (% and _) are allowed"),
                )
                .arg(
                    arg!(-r --"rows" <ROWS>)
                        .required(false)
                        .help("Maximum number of rows to print")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("1"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("purge")
                .about("Delete a stored tree and every page below it")
                .arg(arg!(<URL>).required(true).help("The root URL of the tree to delete")),
        )
}
