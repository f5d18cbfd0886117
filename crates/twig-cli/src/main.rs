//! Twig CLI - a small local version-control system.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{Cli, Commands};

/// Environment variable holding the tracing filter directives.
const LOG_ENV: &str = "TWIG_LOG";

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    output::set_quiet(cli.quiet);
    output::apply_repo_color();

    let result = match cli.command {
        Commands::Init { initial_branch } => commands::init::run(initial_branch.as_deref()),
        Commands::Add { file } => commands::add::run(&file),
        Commands::Commit { message } => commands::commit::run(&message),
        Commands::Rm { file } => commands::rm::run(&file),
        Commands::Log { json } => commands::log::run(json),
        Commands::GlobalLog { json } => commands::log::run_global(json),
        Commands::Find { message } => commands::find::run(&message),
        Commands::Status { json } => commands::status::run(json),
        Commands::Checkout { target, file } => {
            commands::checkout::run(target.as_deref(), file.as_deref())
        }
        Commands::Branch { name } => commands::branch::run(&name),
        Commands::RmBranch { name } => commands::branch::run_remove(&name),
        Commands::Reset { commit } => commands::reset::run(&commit),
        Commands::Merge { branch, json } => commands::merge::run(&branch, json),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
