// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Visualization bridge - renders a pipeline as an HTML fragment

use log::debug;
use std::fmt;

use super::data_collector::DataCollector;
use super::graph_builder::GraphBuilder;
use super::html::Html;
use crate::config::VisualizationConfig;
use crate::display;
use crate::error::Result;
use crate::pipeline::Pipeline;

/// Graph container, selected-node title and data table container
const PIPELINE_MARKUP: &str = r#"
    <svg class="df-pipeline"><g /></svg>
    <label class="df-title"></label>
    <div class="df-data"></div>
    "#;

/// Render `pipeline` with the default configuration
pub fn render_pipeline(pipeline: &Pipeline) -> Result<String> {
    render_pipeline_with(pipeline, &VisualizationConfig::default())
}

/// Render `pipeline` with its graph and samples embedded as JSON
pub fn render_pipeline_with(pipeline: &Pipeline, config: &VisualizationConfig) -> Result<String> {
    let graph = serde_json::to_string(&GraphBuilder::new(pipeline).build()?)?;
    let data = serde_json::to_string(&DataCollector::with_limit(pipeline, config.sample_limit).collect()?)?;
    debug!("Rendering pipeline ({} bytes of graph, {} bytes of samples)", graph.len(), data.len());

    let mut html = Html::new(PIPELINE_MARKUP);
    html.add_class("df-run");
    html.add_dependency(config.stylesheet.as_str(), "css");
    html.add_dependency(config.script_module.as_str(), "dataflow");
    html.add_script(format!("dataflow.renderPipeline(dom, {}, {})", graph, data));
    Ok(html.to_html())
}

/// Register the pipeline renderer with the display registry
///
/// Called once at session setup; evaluating a pipeline in the session
/// then renders it.
pub fn install() {
    display::register_html_formatter::<Pipeline, _>(render_pipeline_with);
}

/// Plain-text form of a pipeline, empty since the HTML form replaces it
impl fmt::Display for Pipeline {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}
