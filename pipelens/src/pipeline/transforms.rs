// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Transform capability and the primitive transforms the direct runner executes

use std::fmt;
use std::sync::Arc;

use super::error::PipelineError;
use super::io::{Sink, Source};
use super::item::Item;
use super::{PValue, Pipeline, ValueKind};

/// Per-element function used by `Map`, `FlatMap` and `Filter`
pub type ElementFn = Arc<dyn Fn(&Item) -> Result<Vec<Item>, String> + Send + Sync>;

/// Whole-collection reduction used by `CombineGlobally`
pub type CombineFn = Arc<dyn Fn(&[Item]) -> Result<Item, String> + Send + Sync>;

/// Leaf operations understood by the runner
#[derive(Clone)]
pub enum Primitive {
    Create(Vec<Item>),
    Read(Arc<dyn Source>),
    ParDo(ElementFn),
    Flatten,
    GroupByKey,
    CombineGlobally(CombineFn),
    AsSingleton,
    Write(Arc<dyn Sink>),
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Create(_) => "Create",
            Primitive::Read(_) => "Read",
            Primitive::ParDo(_) => "ParDo",
            Primitive::Flatten => "Flatten",
            Primitive::GroupByKey => "GroupByKey",
            Primitive::CombineGlobally(_) => "CombineGlobally",
            Primitive::AsSingleton => "AsSingleton",
            Primitive::Write(_) => "Write",
        }
    }

    /// Kind of the value this primitive produces
    pub fn output_kind(&self) -> ValueKind {
        match self {
            Primitive::AsSingleton => ValueKind::Scalar,
            Primitive::Write(_) => ValueKind::Other,
            _ => ValueKind::Collection,
        }
    }

    pub(crate) fn check_inputs(&self, label: &str, inputs: &[PValue]) -> Result<(), PipelineError> {
        let invalid = |reason: String| PipelineError::InvalidInput {
            label: label.to_string(),
            reason,
        };

        match self {
            Primitive::Create(_) | Primitive::Read(_) => {
                if !inputs.is_empty() {
                    return Err(invalid(format!("{} takes no inputs", self.name())));
                }
            }
            Primitive::Flatten => {
                if inputs.is_empty() {
                    return Err(invalid("Flatten needs at least one input".to_string()));
                }
            }
            _ => {
                if inputs.len() != 1 {
                    return Err(invalid(format!(
                        "{} takes exactly one input, got {}",
                        self.name(),
                        inputs.len()
                    )));
                }
            }
        }

        if let Some(input) = inputs.iter().find(|input| input.kind() != ValueKind::Collection) {
            return Err(invalid(format!(
                "{} consumes collections, got a {:?} value",
                self.name(),
                input.kind()
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named processing step
///
/// Leaf transforms return a [`Primitive`] and are never expanded. Composite
/// transforms return `None` from `primitive()` and build their sub-steps in
/// `expand` by applying further transforms to the pipeline.
pub trait PTransform {
    fn label(&self) -> &str;

    fn primitive(&self) -> Option<Primitive> {
        None
    }

    fn expand(&self, _pipeline: &mut Pipeline, _inputs: &[PValue]) -> Result<PValue, PipelineError> {
        Err(PipelineError::InvalidInput {
            label: self.label().to_string(),
            reason: "transform is neither primitive nor composite".to_string(),
        })
    }
}

impl<T: PTransform + ?Sized> PTransform for Box<T> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn primitive(&self) -> Option<Primitive> {
        (**self).primitive()
    }

    fn expand(&self, pipeline: &mut Pipeline, inputs: &[PValue]) -> Result<PValue, PipelineError> {
        (**self).expand(pipeline, inputs)
    }
}

macro_rules! leaf_transform {
    ($(#[$meta:meta])* $name:ident { $($field:ident : $ty:ty),* } => |$this:ident| $primitive:expr) => {
        $(#[$meta])*
        pub struct $name {
            label: String,
            $($field: $ty,)*
        }

        impl PTransform for $name {
            fn label(&self) -> &str {
                &self.label
            }

            fn primitive(&self) -> Option<Primitive> {
                let $this = self;
                Some($primitive)
            }
        }
    };
}

leaf_transform!(
    /// Emit a fixed list of items
    Create { items: Vec<Item> } => |t| Primitive::Create(t.items.clone())
);
leaf_transform!(
    /// Read every item of a source
    Read { source: Arc<dyn Source> } => |t| Primitive::Read(t.source.clone())
);
leaf_transform!(
    /// Apply a function producing zero or more items per input item
    FlatMap { f: ElementFn } => |t| Primitive::ParDo(t.f.clone())
);
leaf_transform!(
    /// Merge several collections into one
    Flatten {} => |_t| Primitive::Flatten
);
leaf_transform!(
    /// Group `[key, value]` pairs into `[key, [values...]]`
    GroupByKey {} => |_t| Primitive::GroupByKey
);
leaf_transform!(
    /// Reduce a whole collection to a single-item collection
    CombineGlobally { f: CombineFn } => |t| Primitive::CombineGlobally(t.f.clone())
);
leaf_transform!(
    /// View a single-item collection as a scalar value
    AsSingleton {} => |_t| Primitive::AsSingleton
);
leaf_transform!(
    /// Write every item to a sink
    Write { sink: Arc<dyn Sink> } => |t| Primitive::Write(t.sink.clone())
);

impl Create {
    pub fn new(label: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            label: label.into(),
            items,
        }
    }
}

impl Read {
    pub fn new(label: impl Into<String>, source: Arc<dyn Source>) -> Self {
        Self {
            label: label.into(),
            source,
        }
    }
}

impl FlatMap {
    pub fn new<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Item) -> Result<Vec<Item>, String> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            f: Arc::new(f),
        }
    }
}

impl Flatten {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl GroupByKey {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl CombineGlobally {
    pub fn new<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Item]) -> Result<Item, String> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            f: Arc::new(f),
        }
    }
}

impl AsSingleton {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl Write {
    pub fn new(label: impl Into<String>, sink: Arc<dyn Sink>) -> Self {
        Self {
            label: label.into(),
            sink,
        }
    }
}

/// Apply a function to every item
pub struct Map {
    inner: FlatMap,
}

impl Map {
    pub fn new<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Item) -> Result<Item, String> + Send + Sync + 'static,
    {
        Self {
            inner: FlatMap::new(label, move |item| f(item).map(|out| vec![out])),
        }
    }
}

impl PTransform for Map {
    fn label(&self) -> &str {
        self.inner.label()
    }

    fn primitive(&self) -> Option<Primitive> {
        self.inner.primitive()
    }
}

/// Keep the items matching a predicate
pub struct Filter {
    inner: FlatMap,
}

impl Filter {
    pub fn new<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Item) -> bool + Send + Sync + 'static,
    {
        Self {
            inner: FlatMap::new(label, move |item| {
                Ok(if predicate(item) {
                    vec![item.clone()]
                } else {
                    Vec::new()
                })
            }),
        }
    }
}

impl PTransform for Filter {
    fn label(&self) -> &str {
        self.inner.label()
    }

    fn primitive(&self) -> Option<Primitive> {
        self.inner.primitive()
    }
}
