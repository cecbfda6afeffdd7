//! Rendering of registered keys for the snapshot review.

use std::sync::Arc;

use metarev_core::{KeyRegistry, MetaValue};
use serde::Serialize;
use serde_json::Value;

/// Shown for keys that have no value on the reviewed snapshot.
pub const EMPTY_PLACEHOLDER: &str = "*empty metadata value*";

/// Post-processes the escaped default rendering: `(escaped, key, raw) -> html`.
pub type DisplayFilter = Arc<dyn Fn(String, &str, &MetaValue) -> String + Send + Sync>;

/// Where a rendered value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderSource {
    Placeholder,
    /// The key's registered formatter; output is trusted and unescaped.
    Formatter,
    /// Escaped human-readable text, after the display filter.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedField {
    pub key: String,
    pub html: String,
    pub source: RenderSource,
}

/// Renders raw values for review. Has no side effects.
#[derive(Clone)]
pub struct DisplayAdapter {
    registry: Arc<KeyRegistry>,
    filter: Option<DisplayFilter>,
}

impl DisplayAdapter {
    pub fn new(registry: Arc<KeyRegistry>) -> Self {
        Self {
            registry,
            filter: None,
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: DisplayFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn render(&self, key: &str, raw: Option<&MetaValue>) -> RenderedField {
        let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
            return RenderedField {
                key: key.to_string(),
                html: EMPTY_PLACEHOLDER.to_string(),
                source: RenderSource::Placeholder,
            };
        };

        if let Some(formatter) = self.registry.formatter(key) {
            return RenderedField {
                key: key.to_string(),
                html: formatter(raw),
                source: RenderSource::Formatter,
            };
        }

        let escaped = escape_html(&human_readable(raw));
        let html = match &self.filter {
            Some(filter) => filter(escaped, key, raw),
            None => escaped,
        };
        RenderedField {
            key: key.to_string(),
            html,
            source: RenderSource::Default,
        }
    }
}

/// Text form of a raw value. JSON objects and arrays are pretty-printed;
/// everything else is shown as (lossy) UTF-8 text.
pub fn human_readable(raw: &MetaValue) -> String {
    if let Ok(value @ (Value::Object(_) | Value::Array(_))) =
        serde_json::from_slice::<Value>(raw.as_bytes())
    {
        if let Ok(pretty) = serde_json::to_string_pretty(&value) {
            return pretty;
        }
    }
    String::from_utf8_lossy(raw.as_bytes()).into_owned()
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}
