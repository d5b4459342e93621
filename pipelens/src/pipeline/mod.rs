// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Minimal in-process pipeline collaborator
//!
//! Provides the pipeline surface the visualization and executors build on:
//! - a transform tree with slash-delimited hierarchical labels
//! - value handles tagged with their kind at production time
//! - a depth-first visitation protocol
//! - a direct (non-distributed) runner that materializes every value

pub mod error;
pub mod io;
pub mod item;
pub mod runner;
pub mod transforms;

pub use error::PipelineError;
pub use io::{Sink, SinkWriter, Source, SourceReader};
pub use item::{IntervalWindow, Item, Window};
pub use runner::{DirectRunner, MaterializedValues, PipelineRunner};
pub use transforms::{
    AsSingleton, CombineGlobally, Create, Filter, FlatMap, Flatten, GroupByKey, Map, PTransform,
    Primitive, Read, Write,
};

use log::{debug, info};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Index of a transform node in its pipeline
pub type NodeId = usize;

/// Index of a value in its pipeline
pub type ValueId = usize;

/// Runtime kind of a produced value, fixed when it is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Bulk sequence of items
    Collection,
    /// Single value, e.g. a side input view
    Scalar,
    /// Completion marker produced by writes
    Other,
}

/// Handle to a value produced inside a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PValue {
    id: ValueId,
    kind: ValueKind,
    producer: NodeId,
}

impl PValue {
    pub fn id(&self) -> ValueId {
        self.id
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Node of the leaf transform that produced this value
    pub fn producer(&self) -> NodeId {
        self.producer
    }
}

/// A node in the pipeline's transform tree
#[derive(Debug)]
pub struct TransformNode {
    id: NodeId,
    full_label: String,
    parts: Vec<NodeId>,
    inputs: Vec<PValue>,
    outputs: Vec<PValue>,
    primitive: Option<Primitive>,
}

impl TransformNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Slash-delimited label; empty for the pipeline root
    pub fn full_label(&self) -> &str {
        &self.full_label
    }

    /// Child transforms, in application order
    pub fn parts(&self) -> &[NodeId] {
        &self.parts
    }

    pub fn inputs(&self) -> &[PValue] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PValue] {
        &self.outputs
    }

    pub fn primitive(&self) -> Option<&Primitive> {
        self.primitive.as_ref()
    }

    pub fn is_composite(&self) -> bool {
        self.primitive.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.full_label.is_empty()
    }
}

/// Callbacks fired by [`Pipeline::visit`]
///
/// Traversal is depth-first in application order. Each value is visited
/// once, right after the leaf transform producing it, so producers are
/// always seen before their consumers.
pub trait PipelineVisitor {
    type Error;

    fn visit_value(&mut self, _value: &PValue, _producer: &TransformNode) -> Result<(), Self::Error> {
        Ok(())
    }

    fn enter_composite_transform(&mut self, _node: &TransformNode) -> Result<(), Self::Error> {
        Ok(())
    }

    fn leave_composite_transform(&mut self, _node: &TransformNode) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_transform(&mut self, _node: &TransformNode) -> Result<(), Self::Error> {
        Ok(())
    }
}

const ROOT: NodeId = 0;

/// A dataflow computation graph bound to a runner
pub struct Pipeline {
    runner: Arc<dyn PipelineRunner>,
    nodes: Vec<TransformNode>,
    values: Vec<PValue>,
    labels: HashSet<String>,
    scope: Vec<NodeId>,
    results: Option<MaterializedValues>,
}

impl Pipeline {
    /// Create an empty pipeline bound to `runner`
    pub fn new(runner: Arc<dyn PipelineRunner>) -> Self {
        Self {
            runner,
            nodes: vec![TransformNode {
                id: ROOT,
                full_label: String::new(),
                parts: Vec::new(),
                inputs: Vec::new(),
                outputs: Vec::new(),
                primitive: None,
            }],
            values: Vec::new(),
            labels: HashSet::new(),
            scope: vec![ROOT],
            results: None,
        }
    }

    /// Create a pipeline bound to the direct runner
    pub fn direct() -> Self {
        Self::new(Arc::new(DirectRunner::new()))
    }

    pub fn root(&self) -> &TransformNode {
        &self.nodes[ROOT]
    }

    pub fn node(&self, id: NodeId) -> Option<&TransformNode> {
        self.nodes.get(id)
    }

    /// All transform nodes, root first, in application order
    pub fn nodes(&self) -> &[TransformNode] {
        &self.nodes
    }

    pub fn runner_name(&self) -> &str {
        self.runner.name()
    }

    /// Read every item of `source`
    pub fn read(&mut self, label: &str, source: Arc<dyn Source>) -> Result<PValue, PipelineError> {
        self.apply_root(&Read::new(label, source))
    }

    /// Write every item of `input` to `sink`
    pub fn write(
        &mut self,
        input: &PValue,
        label: &str,
        sink: Arc<dyn Sink>,
    ) -> Result<PValue, PipelineError> {
        self.apply(input, &Write::new(label, sink))
    }

    /// Apply a transform that takes no input (e.g. `Create`)
    pub fn apply_root<T: PTransform + ?Sized>(&mut self, transform: &T) -> Result<PValue, PipelineError> {
        self.apply_many(&[], transform)
    }

    /// Apply a transform to a single input
    pub fn apply<T: PTransform + ?Sized>(
        &mut self,
        input: &PValue,
        transform: &T,
    ) -> Result<PValue, PipelineError> {
        self.apply_many(std::slice::from_ref(input), transform)
    }

    /// Apply a transform to several inputs
    pub fn apply_many<T: PTransform + ?Sized>(
        &mut self,
        inputs: &[PValue],
        transform: &T,
    ) -> Result<PValue, PipelineError> {
        let label = transform.label();
        if label.is_empty() {
            return Err(PipelineError::EmptyLabel);
        }
        for input in inputs {
            if self.values.get(input.id) != Some(input) {
                return Err(PipelineError::UnknownValue(input.id));
            }
        }

        let parent = self.scope.last().copied().unwrap_or(ROOT);
        let full_label = match self.nodes[parent].full_label.as_str() {
            "" => label.to_string(),
            parent_label => format!("{}/{}", parent_label, label),
        };
        if self.labels.contains(&full_label) {
            return Err(PipelineError::DuplicateLabel(full_label));
        }

        let primitive = transform.primitive();
        if let Some(primitive) = &primitive {
            primitive.check_inputs(&full_label, inputs)?;
        }

        debug!("Applying transform '{}'", full_label);
        let id = self.nodes.len();
        self.labels.insert(full_label.clone());
        self.nodes.push(TransformNode {
            id,
            full_label,
            parts: Vec::new(),
            inputs: inputs.to_vec(),
            outputs: Vec::new(),
            primitive: primitive.clone(),
        });
        self.nodes[parent].parts.push(id);
        self.results = None;

        let output = match primitive {
            Some(primitive) => {
                let value = PValue {
                    id: self.values.len(),
                    kind: primitive.output_kind(),
                    producer: id,
                };
                self.values.push(value);
                value
            }
            None => {
                self.scope.push(id);
                let expanded = transform.expand(self, inputs);
                self.scope.pop();
                expanded?
            }
        };

        self.nodes[id].outputs.push(output);
        Ok(output)
    }

    /// Run the pipeline to completion with its runner
    pub fn run(&mut self) -> Result<(), PipelineError> {
        info!(
            "Running pipeline with {} transforms on the {} runner",
            self.nodes.len() - 1,
            self.runner.name()
        );
        let runner = self.runner.clone();
        let results = runner.run(self)?;
        self.results = Some(results);
        Ok(())
    }

    /// Whether the pipeline has run since its last modification
    pub fn is_run(&self) -> bool {
        self.results.is_some()
    }

    /// Items realized for `value` by the last run
    pub fn materialized(&self, value: &PValue) -> Result<&[Item], PipelineError> {
        self.results
            .as_ref()
            .and_then(|results| results.get(value.id))
            .ok_or(PipelineError::NotMaterialized(value.id))
    }

    /// Traverse the transform tree, firing visitor callbacks
    pub fn visit<V: PipelineVisitor + ?Sized>(&self, visitor: &mut V) -> Result<(), V::Error> {
        let mut visited = HashSet::new();
        self.visit_node(ROOT, visitor, &mut visited)
    }

    fn visit_node<V: PipelineVisitor + ?Sized>(
        &self,
        id: NodeId,
        visitor: &mut V,
        visited: &mut HashSet<ValueId>,
    ) -> Result<(), V::Error> {
        let node = &self.nodes[id];
        if node.is_composite() {
            visitor.enter_composite_transform(node)?;
            for &part in &node.parts {
                self.visit_node(part, visitor, visited)?;
            }
            visitor.leave_composite_transform(node)?;
        } else {
            visitor.visit_transform(node)?;
        }

        for output in &node.outputs {
            if output.producer == id && visited.insert(output.id) {
                visitor.visit_value(output, node)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("runner", &self.runner.name())
            .field("transforms", &(self.nodes.len() - 1))
            .field("values", &self.values.len())
            .field("is_run", &self.is_run())
            .finish()
    }
}
