// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Source and sink capabilities
//!
//! Readers and writers are scoped sessions: the runner always calls
//! `close()` once it is done with a session, including after a failure.

use super::error::PipelineError;
use super::item::Item;

/// Something a pipeline can read items from
pub trait Source: Send + Sync {
    /// Open a read session
    fn reader(&self) -> Result<Box<dyn SourceReader + '_>, PipelineError>;

    /// Short description used in logs
    fn describe(&self) -> String {
        "source".to_string()
    }
}

/// An open read session yielding items in order
pub trait SourceReader: Iterator<Item = Result<Item, PipelineError>> {
    /// Release the session
    fn close(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// Something a pipeline can write items to
pub trait Sink: Send + Sync {
    /// Open a write session
    fn writer(&self) -> Result<Box<dyn SinkWriter + '_>, PipelineError>;

    fn describe(&self) -> String {
        "sink".to_string()
    }
}

/// An open write session accepting item appends
pub trait SinkWriter {
    fn write(&mut self, item: Item) -> Result<(), PipelineError>;

    /// Release the session
    fn close(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}
