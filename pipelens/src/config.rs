// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Visualization configuration

use serde::{Deserialize, Serialize};

/// Number of items kept per sampled collection
pub const DEFAULT_SAMPLE_LIMIT: usize = 25;

/// Stylesheet loaded by the client-side renderer
pub const DEFAULT_STYLESHEET: &str = "style!/static/extensions/dataflow.css";

/// Script module exposing `renderPipeline`
pub const DEFAULT_SCRIPT_MODULE: &str = "extensions/dataflow";

/// Settings for graph/sample rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    /// Maximum number of items kept in each sample
    pub sample_limit: usize,
    /// Stylesheet dependency path
    pub stylesheet: String,
    /// Renderer script dependency path
    pub script_module: String,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            stylesheet: DEFAULT_STYLESHEET.to_string(),
            script_module: DEFAULT_SCRIPT_MODULE.to_string(),
        }
    }
}

impl VisualizationConfig {
    /// Override the sample limit
    pub fn with_sample_limit(mut self, sample_limit: usize) -> Self {
        self.sample_limit = sample_limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: VisualizationConfig = serde_json::from_str(r#"{"sample_limit": 5}"#).unwrap();
        assert_eq!(config.sample_limit, 5);
        assert_eq!(config.stylesheet, DEFAULT_STYLESHEET);
        assert_eq!(config.script_module, DEFAULT_SCRIPT_MODULE);
    }
}
