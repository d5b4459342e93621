// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Pipelens command-line entry point

mod cli;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.level_filter())
        .parse_default_env()
        .init();

    let result = match cli.command {
        Commands::Version => {
            cli::handle_version();
            Ok(())
        }
        Commands::Run {
            html,
            sample_limit,
            input_path,
            min_length,
            execution,
        } => cli::handle_run(html, sample_limit, input_path, min_length, execution),
        Commands::Repl { html_dir, sample_limit } => cli::handle_repl(html_dir, sample_limit),
    };

    if let Err(e) = result {
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}
