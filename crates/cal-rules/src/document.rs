//! Versioned rule document model
//!
//! A rule document carries three list-valued mappings (exposure type →
//! pipelines, pipeline → steps, step → reference types) plus an optional
//! exceptions table keyed by a conditioning header field. References that
//! dangle between tables are integrity failures at resolution time, never
//! silently empty results.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Table mapping a pipeline name to its replacement when the conditioning
/// field is truthy.
pub type SubstitutionTable = BTreeMap<String, String>;

/// A loaded rule document.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDocument {
    #[serde(default)]
    pub exptypes_to_pipelines: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub pipelines_to_steps: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub steps_to_reftypes: BTreeMap<String, Vec<String>>,
    /// Conditioning header field -> {pipeline -> substitute pipeline}.
    #[serde(default)]
    pub pipeline_exceptions: BTreeMap<String, SubstitutionTable>,
}

impl RuleDocument {
    pub fn from_yaml(document: &str, text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::parse(document, e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml(&path.display().to_string(), &text)
    }

    /// Every exposure type the document covers.
    pub fn exptypes(&self) -> impl Iterator<Item = &str> {
        self.exptypes_to_pipelines.keys().map(String::as_str)
    }

    /// Pipelines for `exp_type`; absence is a lookup failure, the caller
    /// may have asked about an exposure type this generation predates.
    pub fn pipelines(&self, document: &str, exp_type: &str) -> Result<&[String]> {
        self.exptypes_to_pipelines
            .get(exp_type)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::Lookup {
                document: document.to_string(),
                table: "exptypes_to_pipelines",
                key: exp_type.to_string(),
            })
    }

    /// Steps of `pipeline`; absence means the document references a
    /// pipeline it never defines.
    pub fn steps(&self, document: &str, pipeline: &str) -> Result<&[String]> {
        self.pipelines_to_steps
            .get(pipeline)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::Integrity {
                document: document.to_string(),
                kind: "pipeline",
                name: pipeline.to_string(),
            })
    }

    /// Reference types of `step`; absence means a dangling step name.
    pub fn reftypes(&self, document: &str, step: &str) -> Result<&[String]> {
        self.steps_to_reftypes
            .get(step)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::Integrity {
                document: document.to_string(),
                kind: "step",
                name: step.to_string(),
            })
    }
}

/// Invert a mapping of lists so every listed value becomes a key pointing
/// back at the sorted set of original keys that listed it.
pub fn invert_list_mapping(mapping: &BTreeMap<String, Vec<String>>) -> BTreeMap<String, Vec<String>> {
    let mut inverted: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (key, values) in mapping {
        for value in values {
            inverted.entry(value.clone()).or_default().insert(key.clone());
        }
    }
    inverted
        .into_iter()
        .map(|(key, values)| (key, values.into_iter().collect()))
        .collect()
}
