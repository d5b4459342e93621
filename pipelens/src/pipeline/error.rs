// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Errors raised by pipeline construction and execution

use thiserror::Error;

/// Errors raised by the pipeline collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A transform was applied with an empty label
    #[error("Transform labels must not be empty")]
    EmptyLabel,

    /// Two transforms resolved to the same full label
    #[error("A transform with label \"{0}\" already exists in the pipeline")]
    DuplicateLabel(String),

    /// A value handle does not belong to this pipeline
    #[error("Unknown value #{0}")]
    UnknownValue(usize),

    /// A transform received an input it cannot consume
    #[error("Invalid input for \"{label}\": {reason}")]
    InvalidInput { label: String, reason: String },

    /// Results were requested before the pipeline ran
    #[error("Value #{0} has not been materialized; run the pipeline first")]
    NotMaterialized(usize),

    /// A source failed while being read
    #[error("Read failed in \"{label}\": {message}")]
    Read { label: String, message: String },

    /// A sink failed while being written
    #[error("Write failed in \"{label}\": {message}")]
    Write { label: String, message: String },

    /// A user function failed on an element
    #[error("Transform \"{label}\" failed: {message}")]
    Transform { label: String, message: String },
}
