pub mod commands;
pub mod config;
pub mod handlers;

pub use commands::command_argument_builder;
pub use config::{GetSettings, LoadSettings, OutputFormat, database_path};
pub use handlers::{LoadOutcome, format_rows, load_tree, open_store, read_yes_no};
