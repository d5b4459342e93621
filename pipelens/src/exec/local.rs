// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Full-pipeline executor

use log::{info, warn};
use std::sync::Arc;

use super::args::{ArgSpec, ExecutionMode, RunArgs};
use super::dataflow_module;
use crate::catalog::LocalCatalog;
use crate::error::{LensError, Result};
use crate::namespace::{ModuleMember, Namespace, PipelineEntry};
use crate::pipeline::{DirectRunner, Pipeline};

/// Member names searched for the pipeline callback, in order
const ENTRY_POINTS: [&str; 2] = ["dataflow", "main"];

/// Runs the notebook's `dataflow(pipeline, catalog, args)` callback locally
pub struct LocalExecutor<'a> {
    entry: PipelineEntry,
    ns: &'a mut Namespace,
}

impl<'a> LocalExecutor<'a> {
    /// Locate the pipeline callback in the namespace's `dataflow` module
    ///
    /// The callback is the member `dataflow`, or `main` when there is no
    /// `dataflow` member at all.
    pub fn from_namespace(ns: &'a mut Namespace) -> Result<Self> {
        let module = dataflow_module(ns)?;
        let member = ENTRY_POINTS.iter().find_map(|name| module.get(name));

        match member {
            Some(ModuleMember::Pipeline(entry)) => Ok(Self {
                entry: entry.clone(),
                ns,
            }),
            _ => Err(LensError::Configuration(
                "The dataflow module defined does not contain a \"dataflow(pipeline, catalog, args)\" method."
                    .to_string(),
            )),
        }
    }

    /// Extra arguments declared by the pipeline
    pub fn arg_specs(&self) -> &[ArgSpec] {
        self.entry.args()
    }

    /// Build, run and return the pipeline
    pub fn run(&mut self, args: RunArgs) -> Result<Pipeline> {
        let args = args.resolve(self.entry.args())?;
        if args.execution() == ExecutionMode::Remote {
            warn!("Remote execution is not available here, running on the direct runner");
        }

        let mut pipeline = Pipeline::new(Arc::new(DirectRunner::new()));
        let catalog = LocalCatalog::from_template(self.entry.catalog(), self.ns, &args)?;
        self.entry.call(&mut pipeline, &catalog, &args)?;

        pipeline.run().map_err(LensError::Execution)?;
        info!("Dataflow run completed");
        Ok(pipeline)
    }
}
