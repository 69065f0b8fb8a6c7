//! Nested-tree formats flattened to dotted-path keys
//!
//! Handles plain text trees (YAML/JSON) and the structured container
//! variant whose document head is a tagged tree followed by out-of-band
//! payload blocks. Leaves stringify; anything that is not a scalar or a
//! sequence is replaced by a sentinel so large payloads never reach a
//! header.

use std::fs;
use std::path::Path;

use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::extract::{key_needed, upper_keys, Extract};
use crate::format::FormatKind;
use crate::header::RawHeader;

/// Terminator line ending the document head of a structured container.
const DOCUMENT_END: &str = "...";

/// Extractor for nested-tree header containers.
#[derive(Debug)]
pub struct TreeExtractor {
    kind: FormatKind,
}

impl TreeExtractor {
    /// Structured container: tagged tree head, payload blocks ignored.
    pub fn structured() -> Self {
        Self {
            kind: FormatKind::StructuredTree,
        }
    }

    /// Plain text tree (YAML or JSON document).
    pub fn plain_text() -> Self {
        Self {
            kind: FormatKind::PlainTextTree,
        }
    }

    /// Flatten a parsed tree into dotted uppercase path keys.
    pub fn flatten(tree: &Value, needed_keys: &[&str]) -> Result<RawHeader> {
        let needed = upper_keys(needed_keys);
        let mut raw = RawHeader::default();
        match untagged(tree) {
            Value::Mapping(map) => {
                for (key, value) in map {
                    flatten_into(&key_text(key), value, &needed, &mut raw);
                }
                Ok(raw)
            }
            other => Err(Error::format(
                "<tree>",
                "tree",
                format!("top level is {}, not a mapping", type_name(other)),
            )),
        }
    }

    /// Decode file bytes to text.
    ///
    /// A structured container is UTF-8 only up to its payload blocks, so
    /// decoding stops at the first invalid byte and the head survives; a
    /// plain text tree must decode in full.
    fn decode<'a>(&self, path: &Path, bytes: &'a [u8]) -> Result<std::borrow::Cow<'a, str>> {
        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.into()),
            Err(err) if self.kind == FormatKind::StructuredTree => {
                Ok(String::from_utf8_lossy(&bytes[..err.valid_up_to()]))
            }
            Err(_) => Err(Error::format(path, "tree", "file is not valid UTF-8")),
        }
    }

    /// Strip container framing down to the parseable document head.
    fn document_head<'a>(&self, text: &'a str) -> std::borrow::Cow<'a, str> {
        match self.kind {
            FormatKind::StructuredTree => text
                .lines()
                .take_while(|line| line.trim_end() != DOCUMENT_END)
                .filter(|line| !line.starts_with('#') && !line.starts_with('%'))
                .collect::<Vec<_>>()
                .join("\n")
                .into(),
            _ => text.into(),
        }
    }
}

impl Extract for TreeExtractor {
    fn kind(&self) -> FormatKind {
        self.kind
    }

    fn raw_header(&self, path: &Path, needed_keys: &[&str]) -> Result<RawHeader> {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        let text = self.decode(path, &bytes)?;
        let head = self.document_head(&text);
        let tree: Value = serde_yaml::from_str(&head)
            .map_err(|e| Error::format(path, "tree", e.to_string()))?;
        Self::flatten(&tree, needed_keys)
    }
}

fn flatten_into(prefix: &str, value: &Value, needed: &[String], raw: &mut RawHeader) {
    match untagged(value) {
        Value::Mapping(map) => {
            for (key, nested) in map {
                let path = format!("{}.{}", prefix.to_uppercase(), key_text(key).to_uppercase());
                flatten_into(&path, nested, needed, raw);
            }
        }
        leaf_value => {
            let key = prefix.to_uppercase();
            if key_needed(needed, &key) {
                raw.push(key, leaf(leaf_value));
            }
        }
    }
}

/// Textual rendering of a leaf node.
pub(crate) fn leaf(value: &Value) -> String {
    match untagged(value) {
        Value::Null => "NONE".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => {
            let rendered: Vec<String> = items.iter().map(|v| format!("'{}'", leaf(v))).collect();
            format!("({})", rendered.join(", "))
        }
        other => format!("SUPPRESSED_NONSTD_TYPE: '{}'", type_name(other)),
    }
}

/// Tagged nodes are transparent wrappers around their value.
fn untagged(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untagged(&tagged.value),
        other => other,
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => leaf(other),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}
