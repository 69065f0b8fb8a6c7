//! Canonical header model and raw extractor output

use std::collections::BTreeMap;

/// Sentinel value for keywords that are requested but absent.
pub const UNDEFINED: &str = "UNDEFINED";

/// Reserved keyword whose value is an ordered list of lines, not a scalar.
pub const HISTORY_KEY: &str = "HISTORY";

/// Canonical flat metadata record for one observation file.
///
/// Keys are uppercase strings mapping to scalar string values; the one
/// reserved multi-line keyword (`HISTORY`) lives beside the scalar map as
/// an ordered list. Headers are immutable once built by reduction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    values: BTreeMap<String, String>,
    history: Vec<String>,
}

impl Header {
    pub(crate) fn new(values: BTreeMap<String, String>, history: Vec<String>) -> Self {
        Self { values, history }
    }

    /// Assemble a header directly from already-canonical key/value pairs.
    ///
    /// Keys are uppercased; no duplicate resolution or default filling is
    /// applied. Use [`crate::reduce::reduce`] for raw extractor output.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into().to_uppercase(), v.into()))
            .collect();
        Self {
            values,
            history: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Scalar value for `key`, or `default` when the key is absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The ordered multi-line list accumulated under [`HISTORY_KEY`].
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.history.is_empty()
    }
}

/// Unreduced extractor output: ordered `(key, value)` emissions plus any
/// accumulated multi-line list. Duplicate keys are expected here; the
/// reducer resolves them.
#[derive(Debug, Clone, Default)]
pub struct RawHeader {
    pub pairs: Vec<(String, String)>,
    pub history: Vec<String>,
}

impl RawHeader {
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }
}
