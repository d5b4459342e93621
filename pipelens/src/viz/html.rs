// Copyright (c) 2025 Pipelens Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Self-contained HTML fragments with script dependencies

use uuid::Uuid;

/// Markup plus the client-side modules and script it needs
#[derive(Debug, Clone)]
pub struct Html {
    id: String,
    markup: String,
    classes: Vec<String>,
    dependencies: Vec<(String, String)>,
    scripts: Vec<String>,
}

impl Html {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            id: format!("html_{}", Uuid::new_v4().simple()),
            markup: markup.into(),
            classes: Vec::new(),
            dependencies: Vec::new(),
            scripts: Vec::new(),
        }
    }

    /// Element id of the wrapping `<div>`
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn add_class(&mut self, class: impl Into<String>) {
        self.classes.push(class.into());
    }

    /// Require `path`, exposing it to scripts as `name`
    pub fn add_dependency(&mut self, path: impl Into<String>, name: impl Into<String>) {
        self.dependencies.push((path.into(), name.into()));
    }

    /// Add a script body; it can refer to the wrapper element as `dom`
    pub fn add_script(&mut self, script: impl Into<String>) {
        self.scripts.push(script.into());
    }

    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<div class=\"{}\" id=\"{}\">{}</div>",
            self.classes.join(" "),
            self.id,
            self.markup
        );
        if self.scripts.is_empty() {
            return html;
        }

        let paths: Vec<String> = self
            .dependencies
            .iter()
            .map(|(path, _)| format!("'{}'", path))
            .collect();
        let names: Vec<&str> = self.dependencies.iter().map(|(_, name)| name.as_str()).collect();

        html.push_str(&format!(
            "\n<script>\nrequire([{}], function({}) {{\n  var dom = document.getElementById('{}');\n",
            paths.join(", "),
            names.join(", "),
            self.id
        ));
        for script in &self.scripts {
            html.push_str("  ");
            html.push_str(&escape_script(script));
            html.push_str(";\n");
        }
        html.push_str("});\n</script>");
        html
    }
}

/// Keep embedded text from closing the surrounding `<script>` element
pub fn escape_script(script: &str) -> String {
    script.replace("</", "<\\/")
}
