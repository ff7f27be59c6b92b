use arbor::commands::command_argument_builder;
use arbor::config::database_path;
use arbor::handlers::{handle_get, handle_load, handle_purge};
use colored::Colorize;
use tracing::Level;

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();
    init_tracing(matches.get_count("verbose"));

    let quiet = matches.get_flag("quiet");
    let db_path = database_path(&matches);

    let result = match matches.subcommand() {
        Some(("load", sub_matches)) => handle_load(&db_path, sub_matches, quiet).await,
        Some(("get", sub_matches)) => handle_get(&db_path, sub_matches, quiet),
        Some(("purge", sub_matches)) => handle_purge(&db_path, sub_matches),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
