// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Interactive session and command surface
//!
//! The shell is the command-dispatch boundary: every error raised by the
//! executors or the visualization is written to the session's error stream
//! and the command simply produces no result.

use log::debug;
use std::any::Any;
use std::io::{self, Write};
use std::sync::Once;

use crate::config::VisualizationConfig;
use crate::display;
use crate::error::{LensError, Result};
use crate::exec::{LocalExecutor, RunArgs, TransformExecutor};
use crate::namespace::Namespace;
use crate::pipeline::Pipeline;
use crate::viz;

static INSTALL_DISPLAY: Once = Once::new();

/// Arguments of a single-transform run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    /// Transform class in the `dataflow` module
    pub name: String,
    /// Namespace list read as input
    pub input: String,
    /// Namespace list created for the output, if any
    pub output: Option<String>,
}

impl TransformRequest {
    pub fn new(name: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            output: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// An interactive session: namespace, display settings and error stream
pub struct InteractiveShell {
    namespace: Namespace,
    config: VisualizationConfig,
    err: Box<dyn Write + Send>,
}

impl InteractiveShell {
    /// Session writing errors to stderr
    pub fn new() -> Self {
        Self::with_error_stream(Box::new(io::stderr()))
    }

    /// Session writing errors to `err`
    pub fn with_error_stream(err: Box<dyn Write + Send>) -> Self {
        INSTALL_DISPLAY.call_once(viz::install);
        Self {
            namespace: Namespace::new(),
            config: VisualizationConfig::default(),
            err,
        }
    }

    pub fn with_config(mut self, config: VisualizationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn namespace_mut(&mut self) -> &mut Namespace {
        &mut self.namespace
    }

    pub fn config(&self) -> &VisualizationConfig {
        &self.config
    }

    /// Run the notebook's pipeline with `args`
    pub fn dataflow(&mut self, args: RunArgs) -> Option<Pipeline> {
        let result =
            LocalExecutor::from_namespace(&mut self.namespace).and_then(|mut executor| executor.run(args));
        self.settle(result)
    }

    /// Run a single named transform against namespace lists
    pub fn ptransform(&mut self, request: &TransformRequest) -> Option<Pipeline> {
        let result = TransformExecutor::from_namespace(&mut self.namespace, &request.name)
            .and_then(|mut executor| executor.run(&request.input, request.output.as_deref()));
        self.settle(result)
    }

    /// Rich HTML representation of `value`, if its type has one
    pub fn display(&mut self, value: &dyn Any) -> Option<String> {
        let rendered = display::format_html(value, &self.config)?;
        self.settle(rendered)
    }

    /// Write an error to the session's error stream
    pub fn report(&mut self, e: &LensError) {
        debug!("Command failed: {}", e);
        // Nothing else can be done if the error stream itself is broken
        let _ = writeln!(self.err, "{}", e);
        let _ = self.err.flush();
    }

    fn settle<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.report(&e);
                None
            }
        }
    }
}

impl Default for InteractiveShell {
    fn default() -> Self {
        Self::new()
    }
}
