//! CLI entry point and command dispatch for fluxlint.

mod cli;
mod cmd;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use std::io;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    if cli.quiet {
        std::env::set_var("FLUXLINT_QUIET", "1");
    }

    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    let result = match cli.command {
        Commands::Deps {
            root,
            rules,
            format,
        } => cmd::deps::run(&cmd::resolve_root(&root), rules.as_deref(), format),
        Commands::Build {
            root,
            verbose,
            format,
            jobs,
        } => cmd::build::run(&cmd::resolve_root(&root), verbose, format, jobs),
        Commands::Flux { root } => cmd::flux::run(&cmd::resolve_root(&root)),
        Commands::All {
            root,
            verbose,
            jobs,
        } => cmd::run_all(&cmd::resolve_root(&root), verbose, jobs),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "fluxlint", &mut io::stdout());
            Ok(0)
        }
        Commands::Version => {
            print_version();
            Ok(0)
        }
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            std::process::exit(1);
        }
    }
}

fn print_version() {
    const GIT_SHA: &str = env!("GIT_SHA");
    const BUILD_DATE: &str = env!("BUILD_DATE");
    println!("fluxlint {}", env!("CARGO_PKG_VERSION"));
    println!("commit: {}", GIT_SHA);
    println!("built: {}", BUILD_DATE);
}
