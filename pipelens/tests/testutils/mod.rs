//! Shared fixtures for integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

use pipelens::catalog::ListSource;
use pipelens::pipeline::{FlatMap, GroupByKey, Map, PTransform, PValue, Pipeline, PipelineError};
use pipelens::{ArgSpec, Catalog, DataflowModule, Item, LensError, PipelineEntry, SharedList};

/// Error stream whose contents tests can inspect
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Composite doubling every integer
pub struct Double {
    label: String,
}

impl Double {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

impl PTransform for Double {
    fn label(&self) -> &str {
        &self.label
    }

    fn expand(&self, pipeline: &mut Pipeline, inputs: &[PValue]) -> Result<PValue, PipelineError> {
        pipeline.apply(
            &inputs[0],
            &Map::new("Multiply", |item| {
                item.as_i64()
                    .map(|n| Item::Int(n * 2))
                    .ok_or_else(|| format!("cannot double {}", item))
            }),
        )
    }
}

/// Composite "A" with leaves "x" and "y", where "y" consumes "x"
pub struct Nested;

impl PTransform for Nested {
    fn label(&self) -> &str {
        "A"
    }

    fn expand(&self, pipeline: &mut Pipeline, inputs: &[PValue]) -> Result<PValue, PipelineError> {
        let x = pipeline.apply(&inputs[0], &Map::new("x", |item| Ok(item.clone())))?;
        pipeline.apply(&x, &Map::new("y", |item| Ok(item.clone())))
    }
}

/// Split lines into words and count them
pub struct CountWords;

impl PTransform for CountWords {
    fn label(&self) -> &str {
        "CountWords"
    }

    fn expand(&self, pipeline: &mut Pipeline, inputs: &[PValue]) -> Result<PValue, PipelineError> {
        let words = pipeline.apply(
            &inputs[0],
            &FlatMap::new("Split", |line| {
                let line = line.as_str().ok_or("lines must be strings")?;
                Ok(line.split_whitespace().map(|w| Item::pair(w, 1)).collect())
            }),
        )?;
        let grouped = pipeline.apply(&words, &GroupByKey::new("Group"))?;
        pipeline.apply(
            &grouped,
            &Map::new("Sum", |pair| {
                let (word, ones) = pair.as_pair().ok_or("expected a grouped pair")?;
                let total = ones.as_list().map(<[Item]>::len).unwrap_or(0) as i64;
                Ok(Item::pair(word.clone(), total))
            }),
        )
    }
}

/// Module whose pipeline counts words from the `lines` source into `counts`
pub fn word_count_module() -> DataflowModule {
    let template_lines = SharedList::from_items(vec![Item::from("to be or not to be")]);
    let catalog = Catalog::new()
        .with_source("lines", Arc::new(ListSource::new(template_lines)))
        .with_sink("counts");

    let entry = PipelineEntry::new(|pipeline, catalog, args| {
        let lines = pipeline.read("ReadLines", catalog.source("lines")?)?;
        let counts = pipeline.apply(&lines, &CountWords)?;
        let min_count: i64 = args
            .get("min-count")
            .unwrap_or("1")
            .parse()
            .map_err(|_| LensError::Configuration("min-count must be an integer".to_string()))?;
        let frequent = pipeline.apply(
            &counts,
            &pipelens::pipeline::Filter::new("Frequent", move |pair| {
                pair.as_pair()
                    .and_then(|(_, count)| count.as_i64())
                    .is_some_and(|count| count >= min_count)
            }),
        )?;
        pipeline.write(&frequent, "WriteCounts", catalog.sink("counts")?)?;
        Ok(())
    })
    .with_catalog(catalog)
    .with_arg(ArgSpec::new("min-count", "smallest count written").default_value("1"));

    DataflowModule::new()
        .with_pipeline("dataflow", entry)
        .with_transform("Double", |label| Box::new(Double::new(label)) as Box<dyn PTransform>)
        .with_value("VERSION", "1.0")
}

pub fn ints(values: &[i64]) -> Vec<Item> {
    values.iter().copied().map(Item::Int).collect()
}
