// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Local execution harness
//!
//! Both executors build a pipeline on the direct runner, redirect its I/O
//! to the interactive namespace through a [`LocalCatalog`](crate::LocalCatalog)
//! and run it to completion before handing it back for inspection.

pub mod args;
pub mod local;
pub mod transform;

pub use args::{ArgSpec, ExecutionMode, RunArgs};
pub use local::LocalExecutor;
pub use transform::TransformExecutor;

use std::sync::Arc;

use crate::error::{LensError, Result};
use crate::namespace::{Binding, DataflowModule, Namespace, MODULE_NAME};

/// The notebook module bound under [`MODULE_NAME`]
pub(crate) fn dataflow_module(ns: &Namespace) -> Result<Arc<DataflowModule>> {
    match ns.get(MODULE_NAME) {
        Some(Binding::Module(module)) => Ok(module.clone()),
        _ => Err(LensError::Configuration(format!(
            "A module named \"{}\" was not found in this notebook.",
            MODULE_NAME
        ))),
    }
}
