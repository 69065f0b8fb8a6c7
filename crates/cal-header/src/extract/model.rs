//! Externally flattened model mappings
//!
//! The model service hands over an already-flat mapping of dotted keys.
//! Two compatibility shims apply: the legacy fixed-grid dual-array pairs
//! (`...HEADER.<n>.0` carries a keyword name, `...HEADER.<n>.1` its
//! value) are re-keyed, and an instrument type keyword is synthesized
//! from the instrument name when the model predates the type keyword.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::extract::{key_needed, tree, upper_keys, Extract};
use crate::format::FormatKind;
use crate::header::RawHeader;

/// Prefix of the legacy fixed-grid passthrough keys.
const FIXED_GRID_PREFIX: &str = "EXTRA_FITS.PRIMARY.HEADER.";

const INSTRUMENT_NAME_KEY: &str = "META.INSTRUMENT.NAME";
const INSTRUMENT_TYPE_KEY: &str = "META.INSTRUMENT.TYPE";

/// Extractor for externally supplied flat model mappings.
#[derive(Debug, Default)]
pub struct ModelExtractor;

impl ModelExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Sanitize an ordered flat mapping into raw pairs.
    pub fn sanitize(
        flat: impl IntoIterator<Item = (String, String)>,
        needed_keys: &[&str],
    ) -> RawHeader {
        let needed = upper_keys(needed_keys);
        let entries: Vec<(String, String)> = flat.into_iter().collect();
        let by_key: HashMap<String, String> = entries.iter().cloned().collect();

        let mut cleaned: Vec<(String, String)> = Vec::with_capacity(entries.len());
        for (key, value) in &entries {
            let upper = key.to_uppercase();
            if upper.starts_with(FIXED_GRID_PREFIX) {
                if let Some(base) = key.strip_suffix(".0") {
                    // The `.0` slot names the keyword, `.1` holds its value.
                    let Some(grid_value) = by_key.get(&format!("{base}.1")) else {
                        continue;
                    };
                    cleaned.push((value.to_uppercase(), grid_value.clone()));
                    continue;
                }
            }
            cleaned.push((upper, value.clone()));
        }

        let has_type = cleaned.iter().any(|(k, _)| k == INSTRUMENT_TYPE_KEY);
        if !has_type {
            let name = cleaned
                .iter()
                .find(|(k, _)| k == INSTRUMENT_NAME_KEY)
                .map(|(_, v)| v.clone());
            if let Some(name) = name {
                cleaned.push((INSTRUMENT_TYPE_KEY.to_string(), name));
            }
        }

        let mut raw = RawHeader::default();
        for (key, value) in cleaned {
            if key_needed(&needed, &key) {
                raw.push(key, value);
            }
        }
        raw
    }
}

impl Extract for ModelExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::ExternalModel
    }

    /// A staged model file is a single-level mapping document; values are
    /// rendered the same way tree leaves are.
    fn raw_header(&self, path: &Path, needed_keys: &[&str]) -> Result<RawHeader> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let doc: Value = serde_yaml::from_str(&text)
            .map_err(|e| Error::format(path, "model", e.to_string()))?;
        let Value::Mapping(map) = doc else {
            return Err(Error::format(
                path,
                "model",
                "model document is not a flat mapping".to_string(),
            ));
        };
        let flat = map.iter().map(|(key, value)| {
            let key = match key {
                Value::String(s) => s.clone(),
                other => tree::leaf(other),
            };
            (key, tree::leaf(value))
        });
        Ok(Self::sanitize(flat, needed_keys))
    }
}
