// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for Pipelens

use colored::Colorize;
use rustyline::{error::ReadlineError, CompletionType, Config, EditMode, Editor};
use std::path::{Path, PathBuf};

use super::demo::demo_module;
use super::output::OutputFormatter;
use super::repl::{Repl, ReplAction};
use pipelens::{DataCollector, ExecutionMode, InteractiveShell, RunArgs, VisualizationConfig};

const HISTORY_PATH: &str = ".pipelens/history.txt";

/// Handle the version command
pub fn handle_version() {
    println!("{} {}", "Pipelens".bold().green(), env!("CARGO_PKG_VERSION"));
    println!("Runner: direct (in-process)");
}

/// Session with the demo module bound as `dataflow`
fn demo_session(sample_limit: Option<usize>) -> InteractiveShell {
    let mut config = VisualizationConfig::default();
    if let Some(limit) = sample_limit {
        config = config.with_sample_limit(limit);
    }
    let mut shell = InteractiveShell::new().with_config(config);
    shell.namespace_mut().bind_module(demo_module());
    shell
}

/// Handle the run command (one-off dataflow run)
///
/// Runs the bundled word-count pipeline, writes its HTML fragment to `html`
/// and prints the sampled collections.
pub fn handle_run(
    html: PathBuf,
    sample_limit: Option<usize>,
    input_path: Option<PathBuf>,
    min_length: usize,
    execution: ExecutionMode,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut shell = demo_session(sample_limit);

    let mut args = RunArgs::new(execution).with("min-length", min_length.to_string());
    if let Some(path) = &input_path {
        args.set("input-path", path.to_string_lossy());
    }

    // Failures were already written to stderr by the session
    let pipeline = shell.dataflow(args).ok_or("The dataflow run failed")?;
    let fragment = shell
        .display(&pipeline)
        .ok_or("The pipeline could not be rendered")?;
    if let Some(parent) = html.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&html, fragment)?;

    let samples = DataCollector::with_limit(&pipeline, shell.config().sample_limit).collect()?;
    println!("{}", OutputFormatter::format_samples(&samples));
    if let Some(counts) = shell.namespace().get("counts") {
        println!("{} {}", "counts =".bold(), OutputFormatter::format_binding(counts));
    }
    println!("{}", format!("Rendered to {}", html.display()).green());
    Ok(())
}

/// Handle the repl command (interactive console)
pub fn handle_repl(html_dir: PathBuf, sample_limit: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&html_dir)?;
    let mut repl = Repl::new(demo_session(sample_limit), html_dir);

    println!("{}", "Pipelens".bold().green());
    println!("Type ':help' for commands, ':quit' to exit");
    println!("The demo module is bound as 'dataflow'");

    let config = Config::builder()
        .edit_mode(EditMode::Emacs)
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .auto_add_history(false)
        .build();

    let mut rl = Editor::<(), _>::with_config(config)?;

    if let Some(parent) = Path::new(HISTORY_PATH).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.load_history(HISTORY_PATH);

    loop {
        let line = match rl.readline(&format!("{} ", "pipelens>".cyan())) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        if !line.trim().is_empty() {
            rl.add_history_entry(line.as_str())?;
        }

        match repl.execute(&line) {
            ReplAction::Output(text) => println!("{}", text),
            ReplAction::Silent => {}
            ReplAction::Exit => {
                println!("{}", "Goodbye!".green());
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_PATH);
    Ok(())
}
