// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Console formatting for samples and session variables

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use pipelens::viz::SampleMap;
use pipelens::{Binding, Namespace};

/// Longest sample preview shown in a table cell
const PREVIEW_CHARS: usize = 60;

pub struct OutputFormatter;

impl OutputFormatter {
    /// One row per sampled collection: label, total count, first items
    pub fn format_samples(samples: &SampleMap) -> String {
        if samples.is_empty() {
            return "No collections were materialized.".to_string();
        }

        let mut table = new_table(&["Transform", "Count", "Sample"]);
        for (label, record) in samples {
            let preview: Vec<String> = record.data.iter().map(ToString::to_string).collect();
            table.add_row(vec![
                Cell::new(label).fg(Color::Cyan),
                Cell::new(record.count),
                Cell::new(truncate(&preview.join(", "), PREVIEW_CHARS)),
            ]);
        }
        table.to_string()
    }

    /// Sorted session variables with their types
    pub fn format_bindings(ns: &Namespace) -> String {
        let mut table = new_table(&["Name", "Type", "Value"]);
        for name in ns.names() {
            if let Some(binding) = ns.get(name) {
                table.add_row(vec![
                    Cell::new(name).fg(Color::Cyan),
                    Cell::new(binding.type_name()),
                    Cell::new(truncate(&Self::format_binding(binding), PREVIEW_CHARS)),
                ]);
            }
        }
        table.to_string()
    }

    /// Plain-text rendering of one variable
    pub fn format_binding(binding: &Binding) -> String {
        match binding {
            Binding::List(list) => {
                let items: Vec<String> = list.snapshot().iter().map(ToString::to_string).collect();
                format!("[{}]", items.join(", "))
            }
            Binding::Value(item) => item.to_string(),
            Binding::Module(module) => format!("<module dataflow: {}>", module.transform_names().join(", ")),
        }
    }
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}
