// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Interactive namespace
//!
//! The namespace holds the session's variables:
//! - lists shared with in-memory sources and sinks
//! - plain values
//! - the `dataflow` module declaring pipelines and transforms
//!
//! Lists are shared by reference. A sink writing into a list and any later
//! reader of the same variable see one sequence; the single-threaded
//! session model is what keeps that safe, the lock only satisfies `Sync`.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::catalog::{Catalog, LocalCatalog};
use crate::error::Result;
use crate::exec::{ArgSpec, RunArgs};
use crate::pipeline::{Item, PTransform, Pipeline};

/// Name under which the notebook's module must be bound
pub const MODULE_NAME: &str = "dataflow";

/// A list variable shared between the namespace and in-memory I/O
#[derive(Debug, Clone, Default)]
pub struct SharedList(Arc<RwLock<Vec<Item>>>);

impl SharedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<Item>) -> Self {
        Self(Arc::new(RwLock::new(items)))
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Vec<Item> {
        self.0.read().clone()
    }

    pub fn push(&self, item: Item) {
        self.0.write().push(item);
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Whether both handles refer to the same list
    pub fn ptr_eq(&self, other: &SharedList) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Value bound to a namespace name
#[derive(Debug, Clone)]
pub enum Binding {
    List(SharedList),
    Value(Item),
    Module(Arc<DataflowModule>),
}

impl Binding {
    /// Short type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Binding::List(_) => "list",
            Binding::Value(Item::Null) => "null",
            Binding::Value(Item::Bool(_)) => "bool",
            Binding::Value(Item::Int(_)) => "int",
            Binding::Value(Item::Float(_)) => "float",
            Binding::Value(Item::Str(_)) => "str",
            Binding::Value(Item::List(_)) => "tuple",
            Binding::Value(Item::Map(_)) => "dict",
            Binding::Value(Item::Window(_)) => "window",
            Binding::Module(_) => "module",
        }
    }
}

/// Session variables
#[derive(Debug, Default)]
pub struct Namespace {
    bindings: HashMap<String, Binding>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, binding: Binding) -> Option<Binding> {
        self.bindings.insert(name.into(), binding)
    }

    pub fn remove(&mut self, name: &str) -> Option<Binding> {
        self.bindings.remove(name)
    }

    /// Bind a fresh list under `name`, replacing any previous binding
    pub fn bind_list(&mut self, name: impl Into<String>, items: Vec<Item>) -> SharedList {
        let list = SharedList::from_items(items);
        self.insert(name, Binding::List(list.clone()));
        list
    }

    pub fn bind_value(&mut self, name: impl Into<String>, value: impl Into<Item>) {
        self.insert(name, Binding::Value(value.into()));
    }

    /// Bind the notebook module under [`MODULE_NAME`]
    pub fn bind_module(&mut self, module: DataflowModule) {
        self.insert(MODULE_NAME, Binding::Module(Arc::new(module)));
    }

    /// The list bound under `name`, if any
    pub fn list(&self, name: &str) -> Option<&SharedList> {
        match self.bindings.get(name) {
            Some(Binding::List(list)) => Some(list),
            _ => None,
        }
    }

    /// Sorted variable names
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// The 3-argument pipeline construction callback
pub type PipelineFn =
    Arc<dyn Fn(&mut Pipeline, &LocalCatalog, &RunArgs) -> Result<()> + Send + Sync>;

/// Factory instantiating a transform with the given label
pub type TransformClass = Arc<dyn Fn(&str) -> Box<dyn PTransform> + Send + Sync>;

/// A pipeline construction callback with its declared catalog and arguments
#[derive(Clone)]
pub struct PipelineEntry {
    func: PipelineFn,
    catalog: Option<Catalog>,
    args: Vec<ArgSpec>,
}

impl PipelineEntry {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&mut Pipeline, &LocalCatalog, &RunArgs) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            catalog: None,
            args: Vec::new(),
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_arg(mut self, arg: ArgSpec) -> Self {
        self.args.push(arg);
        self
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }

    pub fn call(&self, pipeline: &mut Pipeline, catalog: &LocalCatalog, args: &RunArgs) -> Result<()> {
        (self.func)(pipeline, catalog, args)
    }
}

impl fmt::Debug for PipelineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineEntry")
            .field("catalog", &self.catalog)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// A member of the notebook module
#[derive(Clone)]
pub enum ModuleMember {
    Pipeline(PipelineEntry),
    Transform(TransformClass),
    Value(Item),
}

impl fmt::Debug for ModuleMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleMember::Pipeline(entry) => f.debug_tuple("Pipeline").field(entry).finish(),
            ModuleMember::Transform(_) => f.write_str("Transform"),
            ModuleMember::Value(item) => f.debug_tuple("Value").field(item).finish(),
        }
    }
}

/// The notebook's `dataflow` module
#[derive(Debug, Clone, Default)]
pub struct DataflowModule {
    members: BTreeMap<String, ModuleMember>,
}

impl DataflowModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, name: impl Into<String>, member: ModuleMember) -> Self {
        self.members.insert(name.into(), member);
        self
    }

    pub fn with_pipeline(self, name: impl Into<String>, entry: PipelineEntry) -> Self {
        self.with_member(name, ModuleMember::Pipeline(entry))
    }

    pub fn with_transform<F>(self, name: impl Into<String>, class: F) -> Self
    where
        F: Fn(&str) -> Box<dyn PTransform> + Send + Sync + 'static,
    {
        self.with_member(name, ModuleMember::Transform(Arc::new(class)))
    }

    pub fn with_value(self, name: impl Into<String>, value: impl Into<Item>) -> Self {
        self.with_member(name, ModuleMember::Value(value.into()))
    }

    pub fn get(&self, name: &str) -> Option<&ModuleMember> {
        self.members.get(name)
    }

    /// Names of members that are transform classes
    pub fn transform_names(&self) -> Vec<&str> {
        self.members
            .iter()
            .filter(|(_, member)| matches!(member, ModuleMember::Transform(_)))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
