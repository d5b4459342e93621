// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command definitions for Pipelens

use clap::{Parser, Subcommand, ValueEnum};
use pipelens::ExecutionMode;
use std::path::PathBuf;

/// Log level options
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only errors
    Error,
    /// Warnings and errors
    Warn,
    /// Info, warnings, and errors
    Info,
    /// Debug messages and above (verbose)
    Debug,
    /// All messages including trace (very verbose)
    Trace,
    /// Disable all logging
    Off,
}

impl LogLevel {
    /// Convert to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// Pipelens CLI - run dataflow pipelines and inspect them
#[derive(Parser)]
#[command(name = "pipelens")]
#[command(about = "Pipelens - run dataflow pipelines locally and render their graph")]
#[command(version)]
pub struct Cli {
    /// Set log level (error, warn, info, debug, trace, off)
    #[arg(short = 'l', long = "log-level", global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Verbose mode (equivalent to --log-level debug)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective log filter, `warn` unless asked otherwise
    pub fn level_filter(&self) -> log::LevelFilter {
        if self.verbose {
            return log::LevelFilter::Debug;
        }
        self.log_level
            .map(LogLevel::to_level_filter)
            .unwrap_or(log::LevelFilter::Warn)
    }
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show detailed version information
    Version,

    /// Run the bundled word-count dataflow once and render it
    Run {
        /// File the HTML fragment is written to
        #[arg(long, default_value = "pipeline.html")]
        html: PathBuf,

        /// Maximum number of items sampled per collection
        #[arg(long)]
        sample_limit: Option<usize>,

        /// Text file read line by line instead of the built-in lines
        #[arg(long)]
        input_path: Option<PathBuf>,

        /// Shortest word counted
        #[arg(long, default_value_t = 1)]
        min_length: usize,

        /// Where the pipeline executes
        #[arg(long, default_value = "local")]
        execution: ExecutionMode,
    },

    /// Interactive console (REPL) with the demo module loaded
    Repl {
        /// Directory rendered pipelines are written to
        #[arg(long, default_value = ".")]
        html_dir: PathBuf,

        /// Maximum number of items sampled per collection
        #[arg(long)]
        sample_limit: Option<usize>,
    },
}
