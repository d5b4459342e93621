// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Dynamic element type flowing through pipeline collections

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A single element of a collection
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Item>),
    Map(BTreeMap<String, Item>),
    /// Windowing marker attached to windowed elements
    Window(Window),
}

/// Window an element was assigned to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Window {
    Global,
    Interval(IntervalWindow),
}

/// Half-open time interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IntervalWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl IntervalWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Build a window from unix timestamps in seconds
    ///
    /// Returns `None` when either bound is out of range.
    pub fn from_secs(start: i64, end: i64) -> Option<Self> {
        Some(Self {
            start: DateTime::<Utc>::from_timestamp(start, 0)?,
            end: DateTime::<Utc>::from_timestamp(end, 0)?,
        })
    }

    /// Fixed-size window containing `timestamp`
    pub fn containing(timestamp: i64, size_secs: i64) -> Option<Self> {
        if size_secs <= 0 {
            return None;
        }
        let start = timestamp.checked_sub(timestamp.rem_euclid(size_secs))?;
        Self::from_secs(start, start.checked_add(size_secs)?)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Global => write!(f, "GlobalWindow"),
            Window::Interval(window) => write!(
                f,
                "[{}, {})",
                window.start.to_rfc3339_opts(SecondsFormat::Secs, true),
                window.end.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
        }
    }
}

impl Item {
    /// Two-element list, the shape used for keyed elements
    pub fn pair(key: impl Into<Item>, value: impl Into<Item>) -> Self {
        Item::List(vec![key.into(), value.into()])
    }

    /// Split a two-element list into key and value
    pub fn as_pair(&self) -> Option<(&Item, &Item)> {
        match self {
            Item::List(items) if items.len() == 2 => Some((&items[0], &items[1])),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Item::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Item::Int(i) => Some(*i as f64),
            Item::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Item::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Item]> {
        match self {
            Item::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Item::Null)
    }
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Item::Null => serializer.serialize_unit(),
            Item::Bool(b) => serializer.serialize_bool(*b),
            Item::Int(i) => serializer.serialize_i64(*i),
            Item::Float(f) => serializer.serialize_f64(*f),
            Item::Str(s) => serializer.serialize_str(s),
            Item::List(items) => items.serialize(serializer),
            Item::Map(entries) => entries.serialize(serializer),
            // Windows are rendered as their display string, never as structure
            Item::Window(window) => serializer.collect_str(window),
        }
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Item::from)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl From<serde_json::Value> for Item {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Item::Null,
            Value::Bool(b) => Item::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Item::Int(i),
                None => Item::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Item::Str(s),
            Value::Array(items) => Item::List(items.into_iter().map(Item::from).collect()),
            Value::Object(entries) => Item::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Item::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Item {
    fn from(b: bool) -> Self {
        Item::Bool(b)
    }
}

impl From<i64> for Item {
    fn from(i: i64) -> Self {
        Item::Int(i)
    }
}

impl From<i32> for Item {
    fn from(i: i32) -> Self {
        Item::Int(i as i64)
    }
}

impl From<f64> for Item {
    fn from(f: f64) -> Self {
        Item::Float(f)
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::Str(s.to_string())
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Item::Str(s)
    }
}

impl From<Window> for Item {
    fn from(window: Window) -> Self {
        Item::Window(window)
    }
}

impl<T: Into<Item>> From<Vec<T>> for Item {
    fn from(items: Vec<T>) -> Self {
        Item::List(items.into_iter().map(Into::into).collect())
    }
}
