// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Single-transform executor

use log::info;

use super::dataflow_module;
use crate::catalog::LocalCatalog;
use crate::error::{LensError, Result};
use crate::namespace::{ModuleMember, Namespace, TransformClass};
use crate::pipeline::Pipeline;

/// Runs one named transform of the `dataflow` module against namespace lists
pub struct TransformExecutor<'a> {
    name: String,
    class: TransformClass,
    ns: &'a mut Namespace,
}

impl<'a> TransformExecutor<'a> {
    /// Locate the transform class `name` in the namespace's `dataflow` module
    pub fn from_namespace(ns: &'a mut Namespace, name: &str) -> Result<Self> {
        let module = dataflow_module(ns)?;
        match module.get(name) {
            Some(ModuleMember::Transform(class)) => Ok(Self {
                name: name.to_string(),
                class: class.clone(),
                ns,
            }),
            Some(_) => Err(LensError::Configuration(format!(
                "The member named \"{}\" is not a transform.",
                name
            ))),
            None => Err(LensError::Configuration(format!(
                "The dataflow module does not contain a class named \"{}\"",
                name
            ))),
        }
    }

    /// Read `input_name`, apply the transform, optionally write `output_name`
    ///
    /// The transform is instantiated with its class name as label.
    pub fn run(&mut self, input_name: &str, output_name: Option<&str>) -> Result<Pipeline> {
        let mut catalog = LocalCatalog::new();
        catalog.add_source(input_name, None, self.ns)?;
        if let Some(output_name) = output_name {
            catalog.add_sink(output_name, self.ns);
        }

        let mut pipeline = Pipeline::direct();
        let input = pipeline.read("read", catalog.source(input_name)?)?;
        let transform = (self.class)(&self.name);
        let output = pipeline.apply(&input, &*transform)?;
        if let Some(output_name) = output_name {
            pipeline.write(&output, "write", catalog.sink(output_name)?)?;
        }

        pipeline.run().map_err(LensError::Execution)?;
        info!("Transform '{}' run completed", self.name);
        Ok(pipeline)
    }
}
