// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Run arguments shared by the command surface, catalogs and pipelines

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{LensError, Result};

/// Where a full pipeline run should execute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Local,
    Remote,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Local => "local",
            ExecutionMode::Remote => "remote",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(ExecutionMode::Local),
            "remote" => Ok(ExecutionMode::Remote),
            _ => Err(format!("Unknown execution mode: {}", s)),
        }
    }
}

/// Extra argument declared by a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: String,
    pub help: String,
    pub default: Option<String>,
    pub required: bool,
    pub choices: Vec<String>,
}

impl ArgSpec {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            default: None,
            required: false,
            choices: Vec::new(),
        }
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }
}

/// Flat set of parsed run arguments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunArgs {
    execution: ExecutionMode,
    values: BTreeMap<String, String>,
}

impl RunArgs {
    pub fn new(execution: ExecutionMode) -> Self {
        Self {
            execution,
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn execution(&self) -> ExecutionMode {
        self.execution
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fill defaults and check required arguments and choices
    pub fn resolve(mut self, specs: &[ArgSpec]) -> Result<Self> {
        for spec in specs {
            match self.values.get(&spec.name) {
                Some(value) => {
                    if !spec.choices.is_empty() && !spec.choices.contains(value) {
                        return Err(LensError::Configuration(format!(
                            "Invalid value \"{}\" for argument \"{}\" (choose from {})",
                            value,
                            spec.name,
                            spec.choices.join(", ")
                        )));
                    }
                }
                None => match &spec.default {
                    Some(default) => {
                        self.values.insert(spec.name.clone(), default.clone());
                    }
                    None if spec.required => {
                        return Err(LensError::Configuration(format!(
                            "Missing required argument \"{}\"",
                            spec.name
                        )))
                    }
                    None => {}
                },
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_applies_defaults() {
        let specs = vec![ArgSpec::new("min-length", "shortest word kept").default_value("3")];
        let args = RunArgs::default().resolve(&specs).unwrap();
        assert_eq!(args.get("min-length"), Some("3"));
        assert_eq!(args.execution(), ExecutionMode::Local);
    }

    #[test]
    fn test_resolve_rejects_missing_required() {
        let specs = vec![ArgSpec::new("project", "billing project").required()];
        assert!(matches!(
            RunArgs::default().resolve(&specs),
            Err(LensError::Configuration(_))
        ));
    }

    #[test]
    fn test_resolve_checks_choices() {
        let specs = vec![ArgSpec::new("format", "output format").choices(["csv", "json"])];
        let args = RunArgs::default().with("format", "xml");
        assert!(args.resolve(&specs).is_err());
    }

    #[test]
    fn test_execution_mode_parsing() {
        assert_eq!("REMOTE".parse::<ExecutionMode>(), Ok(ExecutionMode::Remote));
        assert!("cluster".parse::<ExecutionMode>().is_err());
    }
}
