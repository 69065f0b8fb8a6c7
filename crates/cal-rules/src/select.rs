//! Version-keyed rule document selection
//!
//! A built-in ascending index maps software-version thresholds to bundled
//! rule documents, with a latest backstop for anything newer than all
//! known entries. The static pick is only a fallback: when a live rule
//! distribution source is injected, it gets the first attempt, and every
//! live-path failure degrades to the static choice with a logged note.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::document::RuleDocument;
use crate::error::Result;
use crate::version::versions_lt;

/// Context sentinel naming the operational rule-set generation.
pub const OPERATIONAL_CONTEXT: &str = "operational";

/// One bundled rule document and the software version it starts at.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinDocument {
    pub version: &'static str,
    pub name: &'static str,
    pub text: &'static str,
}

// The backstop entry shares this text so edits to the latest generation
// cannot diverge from it.
const LATEST_RULES: &str = include_str!("../data/calcfg_b7.3.yaml");

/// Ascending index of bundled documents; the final entry is the latest
/// backstop clamping every newer software version.
pub const RULE_INDEX: &[BuiltinDocument] = &[
    BuiltinDocument {
        version: "0.7.7",
        name: "calcfg_b7.yaml",
        text: include_str!("../data/calcfg_b7.yaml"),
    },
    BuiltinDocument {
        version: "0.9.3",
        name: "calcfg_b7.1.3.yaml",
        text: include_str!("../data/calcfg_b7.1.3.yaml"),
    },
    BuiltinDocument {
        version: "0.10.0",
        name: "calcfg_b7.2.yaml",
        text: include_str!("../data/calcfg_b7.2.yaml"),
    },
    BuiltinDocument {
        version: "0.13.0",
        name: "calcfg_b7.3.yaml",
        text: LATEST_RULES,
    },
    BuiltinDocument {
        version: "999.0.0",
        name: "calcfg_b7.3.yaml",
        text: LATEST_RULES,
    },
];

/// Boundary to the external rule-distribution mechanism.
///
/// Implementations locate the rule document applicable to a (context,
/// software version) pair and materialize it on local storage. A single
/// attempt per selection; retries belong to the caller's side of the
/// boundary.
pub trait RuleSource: Send + Sync {
    fn locate(
        &self,
        context: &str,
        cal_ver: &str,
    ) -> std::result::Result<PathBuf, Box<dyn std::error::Error + Send + Sync>>;
}

/// Where a selected rule document comes from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Builtin(&'static BuiltinDocument),
    File(PathBuf),
}

impl DocumentSource {
    pub fn name(&self) -> String {
        match self {
            Self::Builtin(builtin) => builtin.name.to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    pub fn load(&self) -> Result<RuleDocument> {
        match self {
            Self::Builtin(builtin) => RuleDocument::from_yaml(builtin.name, builtin.text),
            Self::File(path) => RuleDocument::load(path),
        }
    }
}

/// Selects the applicable rule document for (context, software version).
#[derive(Default)]
pub struct VersionSelector {
    live: Option<Box<dyn RuleSource>>,
}

impl VersionSelector {
    /// Selector using only the built-in index.
    pub fn new() -> Self {
        Self { live: None }
    }

    /// Selector that consults `source` before falling back to the index.
    pub fn with_live(source: Box<dyn RuleSource>) -> Self {
        Self { live: Some(source) }
    }

    /// Static selection from the built-in index: the last entry whose
    /// version is not greater than `cal_ver`, clamped at both ends.
    pub fn select_builtin(cal_ver: &str) -> &'static BuiltinDocument {
        let mut i = 0;
        while i < RULE_INDEX.len() - 1 && !versions_lt(cal_ver, RULE_INDEX[i + 1].version) {
            i += 1;
        }
        &RULE_INDEX[i]
    }

    /// Select and load the rule document for (`context`, `cal_ver`).
    ///
    /// Any failure on the live path is non-fatal: it is logged and the
    /// static built-in choice is substituted.
    pub fn resolve(&self, context: &str, cal_ver: &str) -> Result<(String, RuleDocument)> {
        if let Some(live) = &self.live {
            match live
                .locate(context, cal_ver)
                .map_err(|e| e.to_string())
                .and_then(|path| {
                    let source = DocumentSource::File(path);
                    source
                        .load()
                        .map(|doc| (source.name(), doc))
                        .map_err(|e| e.to_string())
                }) {
                Ok(loaded) => return Ok(loaded),
                Err(error) => {
                    warn!(
                        context,
                        cal_ver,
                        error,
                        "live rule lookup failed, using built-in rules"
                    );
                }
            }
        }
        let builtin = Self::select_builtin(cal_ver);
        debug!(
            context,
            cal_ver,
            document = builtin.name,
            "selected built-in rule document"
        );
        let source = DocumentSource::Builtin(builtin);
        Ok((source.name(), source.load()?))
    }
}
