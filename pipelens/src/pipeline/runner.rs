// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Pipeline runners
//!
//! The direct runner executes leaf transforms one after another in
//! application order, which is always a valid topological order since a
//! value must exist before it can be consumed.

use log::debug;
use std::collections::HashMap;

use super::error::PipelineError;
use super::io::{Sink, Source};
use super::item::Item;
use super::transforms::{CombineFn, ElementFn, Primitive};
use super::{Pipeline, TransformNode, ValueId};

/// Items realized for each value by a run
#[derive(Debug, Default, Clone)]
pub struct MaterializedValues {
    values: HashMap<ValueId, Vec<Item>>,
}

impl MaterializedValues {
    pub fn get(&self, id: ValueId) -> Option<&[Item]> {
        self.values.get(&id).map(Vec::as_slice)
    }

    pub fn insert(&mut self, id: ValueId, items: Vec<Item>) {
        self.values.insert(id, items);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Executes a constructed pipeline
pub trait PipelineRunner: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self, pipeline: &Pipeline) -> Result<MaterializedValues, PipelineError>;
}

/// Synchronous, single-process runner
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectRunner;

impl DirectRunner {
    pub fn new() -> Self {
        Self
    }

    fn execute_node(
        &self,
        node: &TransformNode,
        primitive: &Primitive,
        results: &MaterializedValues,
    ) -> Result<Vec<Item>, PipelineError> {
        let label = node.full_label();
        let mut inputs = Vec::with_capacity(node.inputs().len());
        for input in node.inputs() {
            inputs.push(
                results
                    .get(input.id())
                    .ok_or(PipelineError::NotMaterialized(input.id()))?,
            );
        }

        match primitive {
            Primitive::Create(items) => Ok(items.clone()),
            Primitive::Read(source) => read_source(label, source.as_ref()),
            Primitive::ParDo(f) => par_do(label, f, inputs[0]),
            Primitive::Flatten => Ok(inputs.concat()),
            Primitive::GroupByKey => group_by_key(label, inputs[0]),
            Primitive::CombineGlobally(f) => combine(label, f, inputs[0]),
            Primitive::AsSingleton => match inputs[0] {
                [single] => Ok(vec![single.clone()]),
                other => Err(PipelineError::Transform {
                    label: label.to_string(),
                    message: format!("expected exactly one item, found {}", other.len()),
                }),
            },
            Primitive::Write(sink) => {
                write_sink(label, sink.as_ref(), inputs[0])?;
                Ok(Vec::new())
            }
        }
    }
}

impl PipelineRunner for DirectRunner {
    fn name(&self) -> &str {
        "direct"
    }

    fn run(&self, pipeline: &Pipeline) -> Result<MaterializedValues, PipelineError> {
        let mut results = MaterializedValues::default();
        for node in pipeline.nodes() {
            let Some(primitive) = node.primitive() else {
                continue;
            };
            let items = self.execute_node(node, primitive, &results)?;
            debug!(
                "Executed {} '{}' -> {} items",
                primitive.name(),
                node.full_label(),
                items.len()
            );
            for output in node.outputs() {
                results.insert(output.id(), items.clone());
            }
        }
        Ok(results)
    }
}

fn read_source(label: &str, source: &dyn Source) -> Result<Vec<Item>, PipelineError> {
    let read_error = |e: PipelineError| PipelineError::Read {
        label: label.to_string(),
        message: match e {
            PipelineError::Read { message, .. } => message,
            other => other.to_string(),
        },
    };

    let mut reader = source.reader().map_err(read_error)?;
    let items: Result<Vec<Item>, PipelineError> = reader.by_ref().collect();
    let closed = reader.close();
    let items = items.map_err(read_error)?;
    closed.map_err(read_error)?;
    Ok(items)
}

fn write_sink(label: &str, sink: &dyn Sink, items: &[Item]) -> Result<(), PipelineError> {
    let write_error = |e: PipelineError| PipelineError::Write {
        label: label.to_string(),
        message: match e {
            PipelineError::Write { message, .. } => message,
            other => other.to_string(),
        },
    };

    let mut writer = sink.writer().map_err(write_error)?;
    let written = items.iter().try_for_each(|item| writer.write(item.clone()));
    let closed = writer.close();
    written.map_err(write_error)?;
    closed.map_err(write_error)
}

fn par_do(label: &str, f: &ElementFn, items: &[Item]) -> Result<Vec<Item>, PipelineError> {
    let mut output = Vec::with_capacity(items.len());
    for item in items {
        let produced = f(item).map_err(|message| PipelineError::Transform {
            label: label.to_string(),
            message,
        })?;
        output.extend(produced);
    }
    Ok(output)
}

fn group_by_key(label: &str, items: &[Item]) -> Result<Vec<Item>, PipelineError> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(Item, Vec<Item>)> = Vec::new();

    for item in items {
        let (key, value) = item.as_pair().ok_or_else(|| PipelineError::Transform {
            label: label.to_string(),
            message: format!("expected a [key, value] pair, found {}", item),
        })?;
        match index.get(&key.to_string()) {
            Some(&slot) => groups[slot].1.push(value.clone()),
            None => {
                index.insert(key.to_string(), groups.len());
                groups.push((key.clone(), vec![value.clone()]));
            }
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key, values)| Item::pair(key, Item::List(values)))
        .collect())
}

fn combine(label: &str, f: &CombineFn, items: &[Item]) -> Result<Vec<Item>, PipelineError> {
    f(items)
        .map(|combined| vec![combined])
        .map_err(|message| PipelineError::Transform {
            label: label.to_string(),
            message,
        })
}
