// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Pipeline visualization
//!
//! A finished pipeline is traversed twice: once by the [`GraphBuilder`] for
//! its structure and once by the [`DataCollector`] for its samples. Both
//! results are serialized into an HTML fragment for the notebook front end.

pub mod bridge;
pub mod data_collector;
pub mod graph_builder;
pub mod html;

pub use bridge::{install, render_pipeline, render_pipeline_with};
pub use data_collector::{DataCollector, SampleMap, SampleRecord};
pub use graph_builder::{display_name, GraphBuilder, GraphNode};
pub use html::Html;
