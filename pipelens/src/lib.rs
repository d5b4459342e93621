// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Pipelens - interactive inspection of dataflow pipelines
//!
//! Pipelens turns a pipeline's transform tree into two artifacts consumable
//! by a notebook front end:
//! - a nested graph of transform nodes and their data-dependency edges
//! - a bounded sample of the values produced by every step
//!
//! It also provides a local execution harness that redirects a pipeline's
//! declared sources and sinks to in-memory lists held in the interactive
//! namespace, so samples can be produced cheaply and repeatably.

pub mod catalog;
pub mod config;
pub mod display;
pub mod error;
pub mod exec;
pub mod namespace;
pub mod pipeline;
pub mod shell;
pub mod viz;

pub use catalog::{Catalog, LocalCatalog, SourceDescriptor};
pub use config::VisualizationConfig;
pub use error::{LensError, Result};
pub use exec::{ArgSpec, ExecutionMode, LocalExecutor, RunArgs, TransformExecutor};
pub use namespace::{Binding, DataflowModule, ModuleMember, Namespace, PipelineEntry, SharedList};
pub use pipeline::{Item, PTransform, PValue, Pipeline, PipelineError, PipelineVisitor};
pub use shell::{InteractiveShell, TransformRequest};
pub use viz::{render_pipeline, DataCollector, GraphBuilder, GraphNode, SampleRecord};
