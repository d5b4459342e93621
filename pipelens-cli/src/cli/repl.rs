// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Line-oriented interactive console
//!
//! Each input line is one of:
//! - `name = <json>` binds a variable (a JSON array becomes a list)
//! - `name` prints a variable
//! - `%dataflow run [--execution local|remote] [--<arg> <value> ...]`
//! - `%ptransform run --name <class> --input <list> [--output <list>]`
//! - `:vars`, `:help`, `:quit`
//!
//! Magic commands are parsed with clap; the `%dataflow` arguments are
//! built from the ones the pipeline declares.

use clap::builder::PossibleValuesParser;
use clap::{value_parser, Arg, ArgMatches, Command};
use log::debug;
use std::fs;
use std::path::PathBuf;

use super::output::OutputFormatter;
use pipelens::{
    ArgSpec, DataCollector, ExecutionMode, InteractiveShell, Item, LensError, LocalExecutor, Pipeline, RunArgs,
    TransformRequest,
};

/// Result of one console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplAction {
    /// Text to print
    Output(String),
    /// Nothing to print; errors already went to the error stream
    Silent,
    /// Leave the console
    Exit,
}

/// Console state: the session plus where rendered pipelines go
pub struct Repl {
    shell: InteractiveShell,
    html_dir: PathBuf,
    renders: usize,
}

impl Repl {
    pub fn new(shell: InteractiveShell, html_dir: PathBuf) -> Self {
        Self {
            shell,
            html_dir,
            renders: 0,
        }
    }

    pub fn shell(&self) -> &InteractiveShell {
        &self.shell
    }

    /// Execute one input line
    pub fn execute(&mut self, line: &str) -> ReplAction {
        let line = line.trim();
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens.first().copied() {
            None => ReplAction::Silent,
            Some(":quit" | ":q" | ":exit") => ReplAction::Exit,
            Some(":vars") => ReplAction::Output(OutputFormatter::format_bindings(self.shell.namespace())),
            Some(":help") => ReplAction::Output(help_text()),
            Some("%dataflow") => self.dataflow_magic(&tokens),
            Some("%ptransform") => self.ptransform_magic(&tokens),
            Some(_) => match line.split_once('=') {
                Some((name, value)) => self.assign(name.trim(), value.trim()),
                None => self.show(line),
            },
        }
    }

    fn dataflow_magic(&mut self, tokens: &[&str]) -> ReplAction {
        let specs = match LocalExecutor::from_namespace(self.shell.namespace_mut()) {
            Ok(executor) => executor.arg_specs().to_vec(),
            Err(e) => return self.fail(e),
        };

        let matches = match dataflow_command(&specs).try_get_matches_from(tokens.iter().copied()) {
            Ok(matches) => matches,
            Err(e) => return ReplAction::Output(e.to_string()),
        };
        let Some(("run", run)) = matches.subcommand() else {
            return ReplAction::Output("Usage: %dataflow run [OPTIONS]".to_string());
        };

        let execution = run.get_one::<ExecutionMode>("execution").copied().unwrap_or_default();
        let mut args = RunArgs::new(execution);
        for spec in &specs {
            if let Some(value) = run.get_one::<String>(&spec.name) {
                args.set(spec.name.as_str(), value.as_str());
            }
        }

        debug!("%dataflow run with {:?}", args);
        let pipeline = self.shell.dataflow(args);
        self.render(pipeline)
    }

    fn ptransform_magic(&mut self, tokens: &[&str]) -> ReplAction {
        let matches = match ptransform_command().try_get_matches_from(tokens.iter().copied()) {
            Ok(matches) => matches,
            Err(e) => return ReplAction::Output(e.to_string()),
        };
        let Some(("run", run)) = matches.subcommand() else {
            return ReplAction::Output("Usage: %ptransform run --name <NAME> --input <INPUT>".to_string());
        };

        let mut request = TransformRequest::new(required(run, "name"), required(run, "input"));
        if let Some(output) = run.get_one::<String>("output") {
            request = request.with_output(output.as_str());
        }

        let pipeline = self.shell.ptransform(&request);
        self.render(pipeline)
    }

    /// Sample table plus the HTML fragment written under `html_dir`
    fn render(&mut self, pipeline: Option<Pipeline>) -> ReplAction {
        let Some(pipeline) = pipeline else {
            return ReplAction::Silent;
        };

        let samples = match DataCollector::with_limit(&pipeline, self.shell.config().sample_limit).collect() {
            Ok(samples) => samples,
            Err(e) => return self.fail(e),
        };
        let mut output = OutputFormatter::format_samples(&samples);

        if let Some(html) = self.shell.display(&pipeline) {
            self.renders += 1;
            let path = self.html_dir.join(format!("pipeline-{}.html", self.renders));
            match fs::write(&path, html) {
                Ok(()) => output.push_str(&format!("\nRendered to {}", path.display())),
                Err(e) => self.shell.report(&LensError::Io(e)),
            }
        }
        ReplAction::Output(output)
    }

    fn assign(&mut self, name: &str, value: &str) -> ReplAction {
        if !is_identifier(name) {
            return self.fail(LensError::Configuration(format!("Invalid variable name \"{}\"", name)));
        }
        let value: serde_json::Value = match serde_json::from_str(value) {
            Ok(value) => value,
            Err(e) => return self.fail(e.into()),
        };

        let ns = self.shell.namespace_mut();
        match value {
            serde_json::Value::Array(items) => {
                ns.bind_list(name, items.into_iter().map(Item::from).collect());
            }
            other => ns.bind_value(name, Item::from(other)),
        }
        ReplAction::Silent
    }

    fn show(&mut self, name: &str) -> ReplAction {
        match self.shell.namespace().get(name) {
            Some(binding) => ReplAction::Output(OutputFormatter::format_binding(binding)),
            None => self.fail(LensError::Lookup(format!("No variable named \"{}\"", name))),
        }
    }

    fn fail(&mut self, e: LensError) -> ReplAction {
        self.shell.report(&e);
        ReplAction::Silent
    }
}

fn dataflow_command(specs: &[ArgSpec]) -> Command {
    let mut run = Command::new("run").about("Run the module's pipeline locally").arg(
        Arg::new("execution")
            .long("execution")
            .help("Where the pipeline executes")
            .value_parser(value_parser!(ExecutionMode))
            .default_value("local"),
    );
    for spec in specs {
        let mut arg = Arg::new(spec.name.clone())
            .long(spec.name.clone())
            .help(spec.help.clone());
        if !spec.choices.is_empty() {
            arg = arg.value_parser(PossibleValuesParser::new(spec.choices.clone()));
        }
        run = run.arg(arg);
    }

    Command::new("%dataflow")
        .subcommand_required(true)
        .disable_version_flag(true)
        .subcommand(run)
}

fn ptransform_command() -> Command {
    Command::new("%ptransform")
        .subcommand_required(true)
        .disable_version_flag(true)
        .subcommand(
            Command::new("run")
                .about("Run one transform of the dataflow module")
                .arg(
                    Arg::new("name")
                        .long("name")
                        .required(true)
                        .help("Transform class in the dataflow module"),
                )
                .arg(
                    Arg::new("input")
                        .long("input")
                        .required(true)
                        .help("List variable read as input"),
                )
                .arg(Arg::new("output").long("output").help("List variable created for the output")),
        )
}

fn required(matches: &ArgMatches, id: &str) -> String {
    matches.get_one::<String>(id).cloned().unwrap_or_default()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

pub fn help_text() -> String {
    [
        "Available commands:",
        "  name = <json>          Bind a variable (arrays become lists)",
        "  name                   Show a variable",
        "  %dataflow run [..]     Run the dataflow module's pipeline",
        "  %ptransform run --name <class> --input <list> [--output <list>]",
        "  :vars                  List session variables",
        "  :help                  Show this help message",
        "  :quit                  Exit the console",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::demo::demo_module;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn repl(dir: &tempfile::TempDir) -> (Repl, Captured) {
        let err = Captured::default();
        let mut shell = InteractiveShell::with_error_stream(Box::new(err.clone()));
        shell.namespace_mut().bind_module(demo_module());
        (Repl::new(shell, dir.path().to_path_buf()), err)
    }

    #[test]
    fn test_assign_and_show() {
        let dir = tempfile::tempdir().unwrap();
        let (mut repl, _) = repl(&dir);

        assert_eq!(repl.execute("xs = [1, 2, 3]"), ReplAction::Silent);
        assert_eq!(repl.execute("n = 4"), ReplAction::Silent);

        assert_eq!(repl.shell().namespace().list("xs").unwrap().len(), 3);
        assert_eq!(repl.execute("xs"), ReplAction::Output("[1, 2, 3]".to_string()));
        assert_eq!(repl.execute("n"), ReplAction::Output("4".to_string()));
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (mut repl, err) = repl(&dir);

        assert_eq!(repl.execute("xs = [1,"), ReplAction::Silent);
        assert!(!err.text().is_empty());
        assert!(repl.shell().namespace().get("xs").is_none());
    }

    #[test]
    fn test_unknown_variable() {
        let dir = tempfile::tempdir().unwrap();
        let (mut repl, err) = repl(&dir);

        assert_eq!(repl.execute("missing"), ReplAction::Silent);
        assert_eq!(err.text(), "No variable named \"missing\"\n");
    }

    #[test]
    fn test_ptransform_run_writes_output_and_html() {
        let dir = tempfile::tempdir().unwrap();
        let (mut repl, err) = repl(&dir);
        repl.execute("xs = [1, 2, 3]");

        let action = repl.execute("%ptransform run --name Double --input xs --output ys");

        match action {
            ReplAction::Output(text) => assert!(text.contains("Double/Multiply")),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            repl.shell().namespace().list("ys").unwrap().snapshot(),
            vec![Item::Int(2), Item::Int(4), Item::Int(6)]
        );
        assert!(dir.path().join("pipeline-1.html").exists());
        assert!(err.text().is_empty());
    }

    #[test]
    fn test_ptransform_requires_name_and_input() {
        let dir = tempfile::tempdir().unwrap();
        let (mut repl, _) = repl(&dir);

        match repl.execute("%ptransform run --input xs") {
            ReplAction::Output(text) => assert!(text.contains("--name")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_dataflow_run_with_declared_args() {
        let dir = tempfile::tempdir().unwrap();
        let (mut repl, err) = repl(&dir);

        let action = repl.execute("%dataflow run --min-length 5");

        assert!(matches!(action, ReplAction::Output(_)), "{}", err.text());
        assert_eq!(repl.shell().namespace().list("counts").unwrap().len(), 4);
    }

    #[test]
    fn test_dataflow_rejects_undeclared_args() {
        let dir = tempfile::tempdir().unwrap();
        let (mut repl, _) = repl(&dir);

        match repl.execute("%dataflow run --threads 4") {
            ReplAction::Output(text) => assert!(text.contains("--threads")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(repl.shell().namespace().get("counts").is_none());
    }

    #[test]
    fn test_dataflow_without_module() {
        let dir = tempfile::tempdir().unwrap();
        let err = Captured::default();
        let shell = InteractiveShell::with_error_stream(Box::new(err.clone()));
        let mut repl = Repl::new(shell, dir.path().to_path_buf());

        assert_eq!(repl.execute("%dataflow run"), ReplAction::Silent);
        assert!(err.text().contains("A module named \"dataflow\" was not found"));
    }

    #[test]
    fn test_control_commands() {
        let dir = tempfile::tempdir().unwrap();
        let (mut repl, _) = repl(&dir);

        assert_eq!(repl.execute("   "), ReplAction::Silent);
        assert_eq!(repl.execute(":quit"), ReplAction::Exit);
        match repl.execute(":vars") {
            ReplAction::Output(text) => assert!(text.contains("dataflow")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("counts"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier(""));
    }
}
