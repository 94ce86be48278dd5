//! rid-import: batch-create Redmine issues from RID review spreadsheets

mod api;
mod cli;
mod import;

use clap::Parser;
use colored::Colorize;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Cli::parse();
    if let Err(err) = cli::run(args) {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}
