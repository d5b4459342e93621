// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Data collector - samples the materialized output of every collection
//!
//! Each collection is read in full to get its true size, and only a prefix
//! is kept. Local runs are expected to be small, so the full read is
//! acceptable.

use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::DEFAULT_SAMPLE_LIMIT;
use crate::error::{LensError, Result};
use crate::pipeline::{Item, PValue, Pipeline, PipelineError, PipelineVisitor, TransformNode, ValueKind};

/// Bounded sample of one produced collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRecord {
    /// Total number of items in the collection
    pub count: usize,
    /// First items of the collection, in iteration order
    pub data: Vec<Item>,
}

/// Samples keyed by the producing transform's full label
pub type SampleMap = BTreeMap<String, SampleRecord>;

/// Visitor sampling the values of one pipeline
#[derive(Debug)]
pub struct DataCollector<'p> {
    pipeline: &'p Pipeline,
    limit: usize,
    samples: SampleMap,
}

impl<'p> DataCollector<'p> {
    pub fn new(pipeline: &'p Pipeline) -> Self {
        Self::with_limit(pipeline, DEFAULT_SAMPLE_LIMIT)
    }

    pub fn with_limit(pipeline: &'p Pipeline, limit: usize) -> Self {
        Self {
            pipeline,
            limit,
            samples: SampleMap::new(),
        }
    }

    /// Traverse the pipeline and return one sample per collection
    pub fn collect(mut self) -> Result<SampleMap> {
        let pipeline = self.pipeline;
        pipeline.visit(&mut self)?;
        debug!("Collected {} samples", self.samples.len());
        Ok(self.samples)
    }
}

impl PipelineVisitor for DataCollector<'_> {
    type Error = LensError;

    fn visit_value(&mut self, value: &PValue, producer: &TransformNode) -> Result<()> {
        if value.kind() != ValueKind::Collection {
            return Ok(());
        }

        let items = match self.pipeline.materialized(value) {
            Ok(items) => items,
            Err(PipelineError::NotMaterialized(_)) => {
                debug!("Skipping unmaterialized output of '{}'", producer.full_label());
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        self.samples.insert(
            producer.full_label().to_string(),
            SampleRecord {
                count: items.len(),
                data: items.iter().take(self.limit).cloned().collect(),
            },
        );
        Ok(())
    }
}
