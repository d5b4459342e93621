// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for Pipelens
//!
//! Provides a one-off run of the bundled dataflow and an interactive
//! console driving the same session the library exposes.

pub mod commands;
pub mod demo;
pub mod handlers;
pub mod output;
pub mod repl;

pub use commands::{Cli, Commands};
pub use handlers::{handle_repl, handle_run, handle_version};
