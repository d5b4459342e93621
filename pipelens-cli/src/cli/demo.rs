// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Bundled demo module
//!
//! The console and the `run` command load this module as the session's
//! `dataflow` module: a word-count pipeline over a `lines` source writing a
//! `counts` sink, and a few transforms that can be run on their own.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pipelens::catalog::ListSource;
use pipelens::pipeline::{
    Filter, FlatMap, GroupByKey, IntervalWindow, Map, PTransform, PValue, PipelineError, Source, SourceReader,
    Window,
};
use pipelens::{
    ArgSpec, Catalog, DataflowModule, Item, LensError, LocalCatalog, Pipeline, PipelineEntry, Result, RunArgs,
    SharedList,
};

/// Lines read when no `--input-path` is given
pub const SAMPLE_LINES: [&str; 3] = [
    "The quick brown fox",
    "jumps over the lazy dog.",
    "The dog sleeps",
];

const WINDOW_SECS: i64 = 60;

/// Text file read line by line
#[derive(Debug, Clone)]
pub struct TextFileSource {
    path: PathBuf,
}

impl TextFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Source for TextFileSource {
    fn reader(&self) -> std::result::Result<Box<dyn SourceReader + '_>, PipelineError> {
        let file = File::open(&self.path).map_err(|e| PipelineError::Read {
            label: self.describe(),
            message: e.to_string(),
        })?;
        Ok(Box::new(TextFileReader {
            path: &self.path,
            lines: BufReader::new(file).lines(),
        }))
    }

    fn describe(&self) -> String {
        format!("text file {}", self.path.display())
    }
}

struct TextFileReader<'a> {
    path: &'a Path,
    lines: Lines<BufReader<File>>,
}

impl Iterator for TextFileReader<'_> {
    type Item = std::result::Result<Item, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        Some(line.map(Item::from).map_err(|e| PipelineError::Read {
            label: self.path.display().to_string(),
            message: e.to_string(),
        }))
    }
}

impl SourceReader for TextFileReader<'_> {}

/// Multiply every number by two
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

    fn expand(&self, pipeline: &mut Pipeline, inputs: &[PValue]) -> std::result::Result<PValue, PipelineError> {
        pipeline.apply(&inputs[0], &Map::new("Multiply", |item| scale(item, 2)))
    }
}

/// Square every number
pub struct Square {
    label: String,
}

impl Square {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

impl PTransform for Square {
    fn label(&self) -> &str {
        &self.label
    }

    fn expand(&self, pipeline: &mut Pipeline, inputs: &[PValue]) -> std::result::Result<PValue, PipelineError> {
        pipeline.apply(
            &inputs[0],
            &Map::new("Square", |item| match item {
                Item::Int(n) => n
                    .checked_mul(*n)
                    .map(Item::Int)
                    .ok_or_else(|| format!("{} overflows when squared", n)),
                Item::Float(x) => Ok(Item::Float(x * x)),
                other => Err(format!("cannot square {}", other)),
            }),
        )
    }
}

fn scale(item: &Item, factor: i64) -> std::result::Result<Item, String> {
    match item {
        Item::Int(n) => n
            .checked_mul(factor)
            .map(Item::Int)
            .ok_or_else(|| format!("{} overflows when multiplied by {}", n, factor)),
        Item::Float(x) => Ok(Item::Float(x * factor as f64)),
        other => Err(format!("cannot multiply {}", other)),
    }
}

/// Split lines into lowercase words, dropping punctuation
pub struct Tokenize {
    label: String,
}

impl Tokenize {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

impl PTransform for Tokenize {
    fn label(&self) -> &str {
        &self.label
    }

    fn expand(&self, pipeline: &mut Pipeline, inputs: &[PValue]) -> std::result::Result<PValue, PipelineError> {
        let words = pipeline.apply(
            &inputs[0],
            &FlatMap::new("Split", |line| {
                let line = line.as_str().ok_or_else(|| format!("expected a line of text, found {}", line))?;
                Ok(line.split_whitespace().map(Item::from).collect())
            }),
        )?;
        let normalized = pipeline.apply(
            &words,
            &Map::new("Normalize", |word| {
                let word = word.as_str().unwrap_or_default();
                Ok(Item::from(
                    word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase(),
                ))
            }),
        )?;
        pipeline.apply(
            &normalized,
            &Filter::new("DropEmpty", |word| word.as_str().is_some_and(|w| !w.is_empty())),
        )
    }
}

/// Assign `[timestamp, value]` pairs to one-minute windows
pub struct WindowByMinute {
    label: String,
}

impl WindowByMinute {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

impl PTransform for WindowByMinute {
    fn label(&self) -> &str {
        &self.label
    }

    fn expand(&self, pipeline: &mut Pipeline, inputs: &[PValue]) -> std::result::Result<PValue, PipelineError> {
        pipeline.apply(
            &inputs[0],
            &Map::new("AssignWindow", |item| {
                let (timestamp, value) = item
                    .as_pair()
                    .ok_or_else(|| format!("expected a [timestamp, value] pair, found {}", item))?;
                let timestamp = timestamp
                    .as_i64()
                    .ok_or_else(|| format!("expected a timestamp in seconds, found {}", timestamp))?;
                let window = IntervalWindow::containing(timestamp, WINDOW_SECS)
                    .ok_or_else(|| format!("timestamp {} is out of range", timestamp))?;
                Ok(Item::pair(Window::Interval(window), value.clone()))
            }),
        )
    }
}

/// The word-count pipeline callback
fn word_count(pipeline: &mut Pipeline, catalog: &LocalCatalog, args: &RunArgs) -> Result<()> {
    let min_length: usize = match args.get("min-length") {
        Some(value) => value.parse().map_err(|_| {
            LensError::Configuration(format!("Invalid value \"{}\" for argument \"min-length\"", value))
        })?,
        None => 1,
    };

    let lines = pipeline.read("ReadLines", catalog.source("lines")?)?;
    let words = pipeline.apply(&lines, &Tokenize::new("Tokenize"))?;
    let kept = pipeline.apply(
        &words,
        &Filter::new("MinLength", move |word| {
            word.as_str().is_some_and(|w| w.chars().count() >= min_length)
        }),
    )?;
    let pairs = pipeline.apply(&kept, &Map::new("PairWithOne", |word| Ok(Item::pair(word.clone(), 1))))?;
    let grouped = pipeline.apply(&pairs, &GroupByKey::new("GroupWords"))?;
    let counts = pipeline.apply(
        &grouped,
        &Map::new("CountWords", |group| {
            let (word, ones) = group.as_pair().ok_or("expected a grouped pair")?;
            let count = ones.as_list().map(<[Item]>::len).unwrap_or(0);
            Ok(Item::pair(word.clone(), count as i64))
        }),
    )?;
    pipeline.write(&counts, "WriteCounts", catalog.sink("counts")?)?;
    Ok(())
}

fn lines_source(args: &RunArgs) -> Result<Arc<dyn Source>> {
    Ok(match args.get("input-path") {
        Some(path) => Arc::new(TextFileSource::new(path)) as Arc<dyn Source>,
        None => Arc::new(ListSource::new(SharedList::from_items(
            SAMPLE_LINES.iter().copied().map(Item::from).collect(),
        ))),
    })
}

/// The module loaded as `dataflow` in every session
pub fn demo_module() -> DataflowModule {
    let catalog = Catalog::new()
        .with_source_factory("lines", lines_source)
        .with_sink("counts");

    let entry = PipelineEntry::new(word_count)
        .with_catalog(catalog)
        .with_arg(ArgSpec::new("input-path", "Text file read instead of the built-in lines"))
        .with_arg(ArgSpec::new("min-length", "Shortest word counted").default_value("1"));

    DataflowModule::new()
        .with_pipeline("dataflow", entry)
        .with_transform("Double", |label| Box::new(Double::new(label)) as Box<dyn PTransform>)
        .with_transform("Square", |label| Box::new(Square::new(label)) as Box<dyn PTransform>)
        .with_transform("Tokenize", |label| Box::new(Tokenize::new(label)) as Box<dyn PTransform>)
        .with_transform("WindowByMinute", |label| {
            Box::new(WindowByMinute::new(label)) as Box<dyn PTransform>
        })
        .with_value("VERSION", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipelens::{LocalExecutor, Namespace, TransformExecutor};
    use std::io::Write;

    fn namespace() -> Namespace {
        let mut ns = Namespace::new();
        ns.bind_module(demo_module());
        ns
    }

    fn counts(ns: &Namespace) -> Vec<Item> {
        ns.list("counts").unwrap().snapshot()
    }

    #[test]
    fn test_word_count_over_sample_lines() {
        let mut ns = namespace();
        LocalExecutor::from_namespace(&mut ns)
            .unwrap()
            .run(RunArgs::default())
            .unwrap();

        let counts = counts(&ns);
        assert_eq!(counts[0], Item::pair("the", 3));
        assert!(counts.contains(&Item::pair("dog", 2)));
        assert_eq!(counts.len(), 9);
    }

    #[test]
    fn test_min_length_filters_short_words() {
        let mut ns = namespace();
        LocalExecutor::from_namespace(&mut ns)
            .unwrap()
            .run(RunArgs::default().with("min-length", "5"))
            .unwrap();

        let words: Vec<String> = counts(&ns)
            .iter()
            .filter_map(|pair| pair.as_pair()?.0.as_str().map(str::to_string))
            .collect();
        assert_eq!(words, vec!["quick", "brown", "jumps", "sleeps"]);
    }

    #[test]
    fn test_invalid_min_length() {
        let mut ns = namespace();
        let result = LocalExecutor::from_namespace(&mut ns)
            .unwrap()
            .run(RunArgs::default().with("min-length", "short"));
        assert!(matches!(result, Err(LensError::Configuration(_))));
    }

    #[test]
    fn test_input_path_reads_text_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "red green").unwrap();
        writeln!(file, "Green!").unwrap();

        let mut ns = namespace();
        let args = RunArgs::default().with("input-path", file.path().to_string_lossy());
        LocalExecutor::from_namespace(&mut ns).unwrap().run(args).unwrap();

        assert_eq!(counts(&ns), vec![Item::pair("red", 1), Item::pair("green", 2)]);
    }

    #[test]
    fn test_missing_input_file_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs::default().with("input-path", dir.path().join("absent.txt").to_string_lossy());

        let mut ns = namespace();
        let result = LocalExecutor::from_namespace(&mut ns).unwrap().run(args);
        assert!(matches!(result, Err(LensError::Execution(PipelineError::Read { .. }))));
    }

    #[test]
    fn test_namespace_lines_override_the_sample() {
        let mut ns = namespace();
        ns.bind_list("lines", vec![Item::from("b a b")]);
        LocalExecutor::from_namespace(&mut ns)
            .unwrap()
            .run(RunArgs::default())
            .unwrap();
        assert_eq!(counts(&ns), vec![Item::pair("b", 2), Item::pair("a", 1)]);
    }

    #[test]
    fn test_square_and_double() {
        let mut ns = namespace();
        ns.bind_list("xs", vec![Item::Int(3), Item::Float(1.5)]);

        TransformExecutor::from_namespace(&mut ns, "Square")
            .unwrap()
            .run("xs", Some("squares"))
            .unwrap();
        TransformExecutor::from_namespace(&mut ns, "Double")
            .unwrap()
            .run("xs", Some("doubles"))
            .unwrap();

        assert_eq!(ns.list("squares").unwrap().snapshot(), vec![Item::Int(9), Item::Float(2.25)]);
        assert_eq!(ns.list("doubles").unwrap().snapshot(), vec![Item::Int(6), Item::Float(3.0)]);
    }

    #[test]
    fn test_window_by_minute() {
        let mut ns = namespace();
        ns.bind_list("events", vec![Item::pair(125, "click")]);

        TransformExecutor::from_namespace(&mut ns, "WindowByMinute")
            .unwrap()
            .run("events", Some("windowed"))
            .unwrap();

        let expected = Window::Interval(IntervalWindow::from_secs(120, 180).unwrap());
        assert_eq!(
            ns.list("windowed").unwrap().snapshot(),
            vec![Item::pair(expected, "click")]
        );
    }

    #[test]
    fn test_window_by_minute_out_of_range_timestamp() {
        let mut ns = namespace();
        ns.bind_list("events", vec![Item::pair(i64::MAX, "x")]);

        let err = TransformExecutor::from_namespace(&mut ns, "WindowByMinute")
            .unwrap()
            .run("events", Some("windowed"))
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_version_is_not_a_transform() {
        let mut ns = namespace();
        assert!(TransformExecutor::from_namespace(&mut ns, "VERSION").is_err());
    }
}
