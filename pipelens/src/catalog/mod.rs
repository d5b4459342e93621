// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Named sources and sinks a pipeline is parameterized over
//!
//! A [`Catalog`] is the template a pipeline declares. A [`LocalCatalog`]
//! resolves that template against the interactive namespace:
//! - every sink is redirected to a fresh list bound under the sink's name
//! - every source reads a same-named namespace list when one is defined,
//!   and the template's source otherwise

pub mod list_io;

pub use list_io::{ListSink, ListSource};

use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::error::{LensError, Result};
use crate::exec::RunArgs;
use crate::namespace::{Binding, Namespace, SharedList};
use crate::pipeline::{Item, Sink, Source};

/// Factory building a concrete source from the run arguments
pub type SourceFactory = Arc<dyn Fn(&RunArgs) -> Result<Arc<dyn Source>> + Send + Sync>;

/// A declared source: either concrete or built from run arguments
#[derive(Clone)]
pub enum SourceDescriptor {
    Source(Arc<dyn Source>),
    Factory(SourceFactory),
}

impl SourceDescriptor {
    /// Concrete source, invoking the factory if needed
    pub fn resolve(&self, args: &RunArgs) -> Result<Arc<dyn Source>> {
        match self {
            SourceDescriptor::Source(source) => Ok(source.clone()),
            SourceDescriptor::Factory(factory) => factory(args),
        }
    }
}

impl fmt::Debug for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDescriptor::Source(source) => write!(f, "Source({})", source.describe()),
            SourceDescriptor::Factory(_) => f.write_str("Factory"),
        }
    }
}

/// Template catalog declared alongside a pipeline
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sources: BTreeMap<String, SourceDescriptor>,
    sinks: BTreeSet<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, name: impl Into<String>, source: Arc<dyn Source>) -> Self {
        self.sources.insert(name.into(), SourceDescriptor::Source(source));
        self
    }

    pub fn with_source_factory<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&RunArgs) -> Result<Arc<dyn Source>> + Send + Sync + 'static,
    {
        self.sources
            .insert(name.into(), SourceDescriptor::Factory(Arc::new(factory)));
        self
    }

    pub fn with_sink(mut self, name: impl Into<String>) -> Self {
        self.sinks.insert(name.into());
        self
    }

    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn sink_names(&self) -> impl Iterator<Item = &str> {
        self.sinks.iter().map(String::as_str)
    }

    pub fn source(&self, name: &str) -> Option<&SourceDescriptor> {
        self.sources.get(name)
    }
}

/// Catalog whose I/O is redirected to the interactive namespace
#[derive(Default)]
pub struct LocalCatalog {
    sources: BTreeMap<String, Arc<dyn Source>>,
    sinks: BTreeMap<String, Arc<dyn Sink>>,
}

impl LocalCatalog {
    /// Empty catalog, for ad-hoc sources and sinks
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `template` against the namespace
    ///
    /// Sources are resolved before sinks. Factories are always invoked with
    /// `args`, even when a namespace list then overrides the result.
    pub fn from_template(template: Option<&Catalog>, ns: &mut Namespace, args: &RunArgs) -> Result<Self> {
        let mut catalog = Self::new();
        let Some(template) = template else {
            return Ok(catalog);
        };

        for (name, descriptor) in &template.sources {
            let source = descriptor.resolve(args)?;
            catalog.add_source(name, Some(source), ns)?;
        }
        for name in &template.sinks {
            catalog.add_sink(name, ns);
        }
        Ok(catalog)
    }

    /// Register a source, preferring a namespace list of the same name
    ///
    /// Fails with a type error when `name` is bound to something other than
    /// a list, and with a configuration error when there is neither a
    /// namespace value nor a fallback source.
    pub fn add_source(&mut self, name: &str, source: Option<Arc<dyn Source>>, ns: &Namespace) -> Result<()> {
        let source = match ns.get(name) {
            None | Some(Binding::Value(Item::Null)) => source.ok_or_else(|| {
                LensError::Configuration(format!("No variable named \"{}\" was found", name))
            })?,
            Some(Binding::List(list)) => {
                debug!("Source '{}' reads namespace list ({} items)", name, list.len());
                Arc::new(ListSource::new(list.clone())) as Arc<dyn Source>
            }
            Some(other) => {
                return Err(LensError::Type(format!(
                    "\"{}\" does not represent a list (found {})",
                    name,
                    other.type_name()
                )))
            }
        };

        self.sources.insert(name.to_string(), source);
        Ok(())
    }

    /// Register a sink writing into a fresh list bound under `name`
    pub fn add_sink(&mut self, name: &str, ns: &mut Namespace) -> SharedList {
        let data = ns.bind_list(name, Vec::new());
        debug!("Sink '{}' writes to a new namespace list", name);
        self.sinks
            .insert(name.to_string(), Arc::new(ListSink::new(data.clone())));
        data
    }

    pub fn source(&self, name: &str) -> Result<Arc<dyn Source>> {
        self.sources
            .get(name)
            .cloned()
            .ok_or_else(|| LensError::Configuration(format!("The catalog has no source named \"{}\"", name)))
    }

    pub fn sink(&self, name: &str) -> Result<Arc<dyn Sink>> {
        self.sinks
            .get(name)
            .cloned()
            .ok_or_else(|| LensError::Configuration(format!("The catalog has no sink named \"{}\"", name)))
    }

    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn sink_names(&self) -> impl Iterator<Item = &str> {
        self.sinks.keys().map(String::as_str)
    }
}

impl fmt::Debug for LocalCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCatalog")
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("sinks", &self.sinks.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Item, Pipeline};
    use parking_lot::Mutex;

    fn read_all(source: &Arc<dyn Source>) -> Vec<Item> {
        let mut pipeline = Pipeline::direct();
        let items = pipeline.read("Read", source.clone()).unwrap();
        pipeline.run().unwrap();
        pipeline.materialized(&items).unwrap().to_vec()
    }

    fn template_source() -> Arc<dyn Source> {
        Arc::new(ListSource::new(SharedList::from_items(vec![Item::from("template")])))
    }

    #[test]
    fn test_sink_always_recreates_namespace_list() {
        let mut ns = Namespace::new();
        let previous = ns.bind_list("out", vec![Item::Int(7)]);
        let template = Catalog::new().with_sink("out");

        let catalog = LocalCatalog::from_template(Some(&template), &mut ns, &RunArgs::default()).unwrap();

        let current = ns.list("out").unwrap();
        assert!(current.is_empty());
        assert!(!current.ptr_eq(&previous));
        assert!(catalog.sink("out").is_ok());
    }

    #[test]
    fn test_sink_overwrites_non_list_binding() {
        let mut ns = Namespace::new();
        ns.bind_value("out", 42);
        let mut catalog = LocalCatalog::new();
        catalog.add_sink("out", &mut ns);
        assert!(ns.list("out").unwrap().is_empty());
    }

    #[test]
    fn test_namespace_list_overrides_template_source() {
        let mut ns = Namespace::new();
        ns.bind_list("in", vec![Item::Int(1), Item::Int(2)]);
        let template = Catalog::new().with_source("in", template_source());

        let catalog = LocalCatalog::from_template(Some(&template), &mut ns, &RunArgs::default()).unwrap();

        assert_eq!(read_all(&catalog.source("in").unwrap()), vec![Item::Int(1), Item::Int(2)]);
    }

    #[test]
    fn test_template_source_used_without_namespace_value() {
        let mut ns = Namespace::new();
        ns.bind_value("in", Item::Null);
        let template = Catalog::new().with_source("in", template_source());

        let catalog = LocalCatalog::from_template(Some(&template), &mut ns, &RunArgs::default()).unwrap();

        assert_eq!(read_all(&catalog.source("in").unwrap()), vec![Item::from("template")]);
    }

    #[test]
    fn test_non_list_namespace_value_is_a_type_error() {
        let mut ns = Namespace::new();
        ns.bind_value("in", "not a list");
        let template = Catalog::new().with_source("in", template_source());

        let result = LocalCatalog::from_template(Some(&template), &mut ns, &RunArgs::default());

        match result {
            Err(LensError::Type(message)) => assert!(message.contains("\"in\" does not represent a list")),
            other => panic!("expected a type error, got {:?}", other),
        }
    }

    #[test]
    fn test_factory_invoked_with_run_args() {
        let seen = Arc::new(Mutex::new(None));
        let seen_by_factory = seen.clone();
        let template = Catalog::new().with_source_factory("in", move |args: &RunArgs| {
            *seen_by_factory.lock() = args.get("path").map(str::to_string);
            Ok(template_source())
        });
        let args = RunArgs::default().with("path", "/data/in.txt");

        let mut ns = Namespace::new();
        ns.bind_list("in", vec![Item::Int(9)]);
        let catalog = LocalCatalog::from_template(Some(&template), &mut ns, &args).unwrap();

        assert_eq!(seen.lock().as_deref(), Some("/data/in.txt"));
        assert_eq!(read_all(&catalog.source("in").unwrap()), vec![Item::Int(9)]);
    }

    #[test]
    fn test_missing_source_without_fallback() {
        let ns = Namespace::new();
        let mut catalog = LocalCatalog::new();
        let result = catalog.add_source("in", None, &ns);
        assert!(matches!(result, Err(LensError::Configuration(_))));
    }

    #[test]
    fn test_no_template_yields_empty_catalog() {
        let mut ns = Namespace::new();
        let catalog = LocalCatalog::from_template(None, &mut ns, &RunArgs::default()).unwrap();
        assert_eq!(catalog.source_names().count(), 0);
        assert!(catalog.sink("out").is_err());
    }
}
