// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for Pipelens

use thiserror::Error;

use crate::pipeline::PipelineError;

/// Result type alias for Pipelens operations
pub type Result<T> = std::result::Result<T, LensError>;

/// Main error type for catalog, executor and visualization operations
#[derive(Error, Debug)]
pub enum LensError {
    /// An expected callback, class or module is missing or malformed
    #[error("{0}")]
    Configuration(String),

    /// A namespace variable has the wrong shape for its use
    #[error("{0}")]
    Type(String),

    /// Graph edge resolution could not find a producer node
    #[error("{0}")]
    Lookup(String),

    /// The underlying pipeline run failed
    #[error("Pipeline execution failed: {0}")]
    Execution(#[source] PipelineError),

    /// The pipeline could not be constructed
    #[error("Pipeline construction failed: {0}")]
    Pipeline(#[from] PipelineError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
