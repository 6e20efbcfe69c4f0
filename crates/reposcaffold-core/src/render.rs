//! Template rendering with `[[ ]]` delimiters.
//!
//! Templates reference context fields as `[[ .AppName ]]`, `[[ .ImageRepo ]]`,
//! `[[ .Repo.Name ]]` and `[[ .Repo.Owner ]]`. The square-bracket delimiters keep
//! the renderer out of the way of `{{ }}` and `${ }` syntax that shell scripts
//! and CI workflows in the template tree carry verbatim.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::error::RenderError;
use crate::types::RenderContext;

const OPEN: &str = "[[";
const CLOSE: &str = "]]";

static FIELD_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)$")
        .expect("field reference regex is valid")
});

/// Renders template bodies against a [`RenderContext`]
#[derive(Debug)]
pub struct TemplateRenderer {
    context: Value,
}

impl TemplateRenderer {
    /// Create a renderer for one run
    pub fn new(context: &RenderContext) -> Self {
        Self {
            // A struct of strings always serializes
            context: serde_json::to_value(context).unwrap_or(Value::Null),
        }
    }

    /// Render raw template bytes
    pub fn render(&self, template: &[u8]) -> Result<Vec<u8>, RenderError> {
        let text = std::str::from_utf8(template).map_err(|_| RenderError::InvalidUtf8)?;
        self.render_str(text).map(String::into_bytes)
    }

    /// Render a template string
    pub fn render_str(&self, template: &str) -> Result<String, RenderError> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        let mut consumed = 0usize;

        while let Some(start) = rest.find(OPEN) {
            out.push_str(&rest[..start]);
            let line = line_of(template, consumed + start);

            let after_open = &rest[start + OPEN.len()..];
            let end = after_open
                .find(CLOSE)
                .ok_or(RenderError::UnclosedAction { line })?;

            let action = after_open[..end].trim();
            out.push_str(&self.resolve(action, line)?);

            let advance = start + OPEN.len() + end + CLOSE.len();
            consumed += advance;
            rest = &rest[advance..];
        }

        out.push_str(rest);
        Ok(out)
    }

    fn resolve(&self, action: &str, line: usize) -> Result<String, RenderError> {
        let caps = FIELD_REF
            .captures(action)
            .ok_or_else(|| RenderError::UnsupportedAction {
                action: action.to_string(),
                line,
            })?;
        let path = &caps[1];

        let mut value = &self.context;
        for segment in path.split('.') {
            value = value.get(segment).ok_or_else(|| RenderError::UnknownField {
                field: path.to_string(),
                line,
            })?;
        }

        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(RenderError::UnsupportedAction {
                action: action.to_string(),
                line,
            }),
        }
    }
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}
