//! Result artifacts returned to the host.
//!
//! Every invocation produces exactly one `Artifact`. Serialization follows the
//! host's entry layout (`Type`, `ContentsFormat`, `Contents`, ...).

use serde::Serialize;
use serde_json::{Map, Value};

const ENTRY_TYPE_NOTE: u8 = 1;
const ENTRY_TYPE_ERROR: u8 = 4;

const FORMAT_TEXT: &str = "text";
const FORMAT_JSON: &str = "json";
const FORMAT_MARKDOWN: &str = "markdown";

#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Note(Note),
    Error(String),
}

/// Successful command output.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// Markdown / plain text report
    pub human_readable: String,
    /// Raw payload; the report text stands in when absent
    pub contents: Option<Value>,
    /// Structured output keyed by dotted namespace (e.g. `LIFX.Light`)
    pub context: Option<Map<String, Value>>,
}

impl Artifact {
    /// Note whose contents and context carry the same payload under `key`.
    pub fn note(human_readable: impl Into<String>, key: &str, payload: Value) -> Self {
        let mut context = Map::new();
        context.insert(key.to_string(), payload.clone());
        Artifact::Note(Note {
            human_readable: human_readable.into(),
            contents: Some(payload),
            context: Some(context),
        })
    }

    /// Plain-text note without contents or context.
    pub fn text(human_readable: impl Into<String>) -> Self {
        Artifact::Note(Note {
            human_readable: human_readable.into(),
            contents: None,
            context: None,
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Artifact::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Artifact::Error(_))
    }

    pub fn human_readable(&self) -> &str {
        match self {
            Artifact::Note(n) => &n.human_readable,
            Artifact::Error(m) => m,
        }
    }

    /// Context value under `key`, if this is a note carrying one.
    #[cfg(test)]
    pub fn context(&self, key: &str) -> Option<&Value> {
        match self {
            Artifact::Note(n) => n.context.as_ref()?.get(key),
            Artifact::Error(_) => None,
        }
    }

    /// Host entry representation.
    pub fn to_entry(&self) -> Entry<'_> {
        match self {
            Artifact::Note(n) => {
                let contents = n
                    .contents
                    .clone()
                    .unwrap_or_else(|| Value::String(n.human_readable.clone()));
                let contents_format = if contents.is_object() || contents.is_array() {
                    FORMAT_JSON
                } else {
                    FORMAT_TEXT
                };
                Entry {
                    entry_type: ENTRY_TYPE_NOTE,
                    contents_format,
                    contents,
                    readable_contents_format: FORMAT_MARKDOWN,
                    human_readable: &n.human_readable,
                    entry_context: n.context.as_ref(),
                }
            }
            Artifact::Error(message) => Entry {
                entry_type: ENTRY_TYPE_ERROR,
                contents_format: FORMAT_TEXT,
                contents: Value::String(message.clone()),
                readable_contents_format: FORMAT_TEXT,
                human_readable: message,
                entry_context: None,
            },
        }
    }
}

/// Serialized shape of an artifact.
#[derive(Debug, Serialize)]
pub struct Entry<'a> {
    #[serde(rename = "Type")]
    pub entry_type: u8,
    #[serde(rename = "ContentsFormat")]
    pub contents_format: &'static str,
    #[serde(rename = "Contents")]
    pub contents: Value,
    #[serde(rename = "ReadableContentsFormat")]
    pub readable_contents_format: &'static str,
    #[serde(rename = "HumanReadable")]
    pub human_readable: &'a str,
    #[serde(rename = "EntryContext", skip_serializing_if = "Option::is_none")]
    pub entry_context: Option<&'a Map<String, Value>>,
}
