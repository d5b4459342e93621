// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Graph builder - converts a pipeline's transform tree into nested graph nodes
//!
//! The builder is driven by the pipeline's visitation protocol. Composite
//! transforms still open are kept on a stack; every new node is attached
//! to the stack top (or to the top level), and registered by label so the
//! consumers visited later can add edges to it. The pipeline root has an
//! empty label and is not materialized.
//!
//! Nodes live in an arena while the traversal runs and are assembled into
//! the owned tree once it completes.

use log::debug;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::{LensError, Result};
use crate::pipeline::{Pipeline, PipelineVisitor, TransformNode};

/// Separator between the segments of a hierarchical label
const LABEL_SEPARATOR: char = '/';

/// Renderable mirror of a non-root transform node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    /// Full hierarchical label
    pub id: String,
    /// Last label segment
    pub name: String,
    /// Child nodes of a composite transform, in application order
    pub nodes: Vec<GraphNode>,
    /// Ids of the nodes consuming this node's output
    pub edges: Vec<String>,
}

impl GraphNode {
    /// Number of nodes in this subtree, including `self`
    pub fn count(&self) -> usize {
        1 + self.nodes.iter().map(GraphNode::count).sum::<usize>()
    }

    /// Find a node by id in this subtree
    pub fn find(&self, id: &str) -> Option<&GraphNode> {
        if self.id == id {
            return Some(self);
        }
        self.nodes.iter().find_map(|child| child.find(id))
    }
}

/// Display name of a label: the segment after the last separator
///
/// A separator in first position does not count, so `/x` keeps its full
/// label.
pub fn display_name(label: &str) -> &str {
    match label.rfind(LABEL_SEPARATOR) {
        Some(index) if index > 0 => &label[index + LABEL_SEPARATOR.len_utf8()..],
        _ => label,
    }
}

#[derive(Debug)]
struct PendingNode {
    id: String,
    children: Vec<usize>,
    edges: Vec<String>,
}

/// Visitor building the graph of one pipeline
#[derive(Debug)]
pub struct GraphBuilder<'p> {
    pipeline: &'p Pipeline,
    arena: Vec<PendingNode>,
    top_level: Vec<usize>,
    stack: Vec<usize>,
    by_label: HashMap<String, usize>,
}

impl<'p> GraphBuilder<'p> {
    pub fn new(pipeline: &'p Pipeline) -> Self {
        Self {
            pipeline,
            arena: Vec::new(),
            top_level: Vec::new(),
            stack: Vec::new(),
            by_label: HashMap::new(),
        }
    }

    /// Traverse the pipeline and return its top-level graph nodes
    pub fn build(mut self) -> Result<Vec<GraphNode>> {
        let pipeline = self.pipeline;
        pipeline.visit(&mut self)?;

        debug!("Built graph with {} nodes", self.arena.len());
        let top_level = std::mem::take(&mut self.top_level);
        Ok(top_level.into_iter().map(|index| self.assemble(index)).collect())
    }

    fn add_node(&mut self, node: &TransformNode) -> Result<usize> {
        let label = node.full_label().to_string();
        let index = self.arena.len();
        self.arena.push(PendingNode {
            id: label.clone(),
            children: Vec::new(),
            edges: Vec::new(),
        });
        self.by_label.insert(label.clone(), index);

        match self.stack.last() {
            Some(&parent) => self.arena[parent].children.push(index),
            None => self.top_level.push(index),
        }

        // Pipeline::apply_many rejects foreign values, so the lookups below
        // only fail for a visitor fed nodes out of order
        for input in node.inputs() {
            let producer = self.producer_label(input.producer())?;
            let producer_index = *self.by_label.get(producer).ok_or_else(|| {
                LensError::Lookup(format!(
                    "No graph node for \"{}\", the producer of an input to \"{}\"",
                    producer, label
                ))
            })?;
            self.arena[producer_index].edges.push(label.clone());
        }

        Ok(index)
    }

    fn producer_label(&self, producer: usize) -> Result<&'p str> {
        self.pipeline
            .node(producer)
            .map(TransformNode::full_label)
            .ok_or_else(|| LensError::Lookup(format!("Unknown producer node #{}", producer)))
    }

    fn assemble(&mut self, index: usize) -> GraphNode {
        let id = std::mem::take(&mut self.arena[index].id);
        let edges = std::mem::take(&mut self.arena[index].edges);
        let children = std::mem::take(&mut self.arena[index].children);

        GraphNode {
            name: display_name(&id).to_string(),
            nodes: children.into_iter().map(|child| self.assemble(child)).collect(),
            edges,
            id,
        }
    }
}

impl PipelineVisitor for GraphBuilder<'_> {
    type Error = LensError;

    fn enter_composite_transform(&mut self, node: &TransformNode) -> Result<()> {
        if node.is_root() {
            return Ok(());
        }
        let index = self.add_node(node)?;
        self.stack.push(index);
        Ok(())
    }

    fn leave_composite_transform(&mut self, node: &TransformNode) -> Result<()> {
        if node.is_root() {
            return Ok(());
        }
        self.stack.pop();
        Ok(())
    }

    fn visit_transform(&mut self, node: &TransformNode) -> Result<()> {
        self.add_node(node).map(|_| ())
    }
}
