// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory sources and sinks backed by namespace lists

use crate::namespace::SharedList;
use crate::pipeline::{Item, PipelineError, Sink, SinkWriter, Source, SourceReader};

/// Source reading the items of a shared list
#[derive(Debug, Clone)]
pub struct ListSource {
    data: SharedList,
}

impl ListSource {
    pub fn new(data: SharedList) -> Self {
        Self { data }
    }
}

impl Source for ListSource {
    fn reader(&self) -> Result<Box<dyn SourceReader + '_>, PipelineError> {
        Ok(Box::new(ListReader {
            data: self.data.snapshot().into_iter(),
        }))
    }

    fn describe(&self) -> String {
        format!("in-memory list ({} items)", self.data.len())
    }
}

/// Forward iteration over the list contents as of `reader()`
pub struct ListReader {
    data: std::vec::IntoIter<Item>,
}

impl Iterator for ListReader {
    type Item = Result<Item, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.data.next().map(Ok)
    }
}

impl SourceReader for ListReader {}

/// Sink appending written items to a shared list
#[derive(Debug, Clone)]
pub struct ListSink {
    data: SharedList,
}

impl ListSink {
    pub fn new(data: SharedList) -> Self {
        Self { data }
    }
}

impl Sink for ListSink {
    fn writer(&self) -> Result<Box<dyn SinkWriter + '_>, PipelineError> {
        Ok(Box::new(ListWriter { data: &self.data }))
    }

    fn describe(&self) -> String {
        "in-memory list".to_string()
    }
}

pub struct ListWriter<'a> {
    data: &'a SharedList,
}

impl SinkWriter for ListWriter<'_> {
    fn write(&mut self, item: Item) -> Result<(), PipelineError> {
        self.data.push(item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_sees_snapshot_at_open() {
        let data = SharedList::from_items(vec![Item::Int(1), Item::Int(2)]);
        let source = ListSource::new(data.clone());

        let mut reader = source.reader().unwrap();
        data.push(Item::Int(3));
        let items: Vec<Item> = reader.by_ref().map(Result::unwrap).collect();
        reader.close().unwrap();

        assert_eq!(items, vec![Item::Int(1), Item::Int(2)]);
    }

    #[test]
    fn test_writer_appends_to_shared_list() {
        let data = SharedList::new();
        let sink = ListSink::new(data.clone());

        let mut writer = sink.writer().unwrap();
        writer.write(Item::from("a")).unwrap();
        writer.write(Item::from("b")).unwrap();
        writer.close().unwrap();

        assert_eq!(data.snapshot(), vec![Item::from("a"), Item::from("b")]);
    }
}
