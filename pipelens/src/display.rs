// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Process-wide registry of rich display formatters
//!
//! The interactive session asks this registry how to render a value before
//! falling back to plain text. Formatters are registered explicitly, per
//! type, at session setup.

use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::config::VisualizationConfig;
use crate::error::Result;

type HtmlFormatter =
    Box<dyn Fn(&dyn Any, &VisualizationConfig) -> Option<Result<String>> + Send + Sync>;

lazy_static! {
    /// Maps value type -> HTML formatter
    static ref HTML_FORMATTERS: RwLock<HashMap<TypeId, HtmlFormatter>> =
        RwLock::new(HashMap::new());
}

/// Register the HTML formatter for values of type `T`, replacing any previous one
pub fn register_html_formatter<T, F>(formatter: F)
where
    T: Any,
    F: Fn(&T, &VisualizationConfig) -> Result<String> + Send + Sync + 'static,
{
    let erased: HtmlFormatter = Box::new(move |value: &dyn Any, config: &VisualizationConfig| {
        value.downcast_ref::<T>().map(|value| formatter(value, config))
    });
    HTML_FORMATTERS.write().insert(TypeId::of::<T>(), erased);
}

/// Remove the HTML formatter for `T`
pub fn unregister_html_formatter<T: Any>() -> bool {
    HTML_FORMATTERS.write().remove(&TypeId::of::<T>()).is_some()
}

pub fn has_html_formatter<T: Any>() -> bool {
    HTML_FORMATTERS.read().contains_key(&TypeId::of::<T>())
}

/// Render `value` as HTML, or `None` when its type has no formatter
pub fn format_html(value: &dyn Any, config: &VisualizationConfig) -> Option<Result<String>> {
    let formatters = HTML_FORMATTERS.read();
    let formatter = formatters.get(&(*value).type_id())?;
    formatter(value, config)
}
