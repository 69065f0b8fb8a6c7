//! Reduction of raw extractor output into a canonical header
//!
//! Reduction is deterministic given pair order, and extractors preserve
//! source order, so "first occurrence wins" is reproducible.

use std::collections::BTreeMap;

use tracing::warn;

use crate::header::{Header, RawHeader, HISTORY_KEY, UNDEFINED};

/// Keywords that are inherently multi-valued and therefore excluded from
/// scalar reduction; extractors handle them directly.
pub const MULTI_VALUED_KEYS: &[&str] = &["COMMENT", "HISTORY", "NAXIS"];

/// Reduce `raw` pairs to a canonical [`Header`].
///
/// Keys are uppercased and values kept as strings. Keys in
/// [`MULTI_VALUED_KEYS`] are skipped. When `needed_keys` is non-empty,
/// other keys are dropped. The first occurrence of a key wins: a repeat
/// with a differing value is discarded with a logged conflict. Afterwards
/// every needed key still missing (or literally [`UNDEFINED`]) is filled
/// with [`UNDEFINED`]. `source` names the origin of the pairs in logs.
pub fn reduce(source: &str, raw: &RawHeader, needed_keys: &[&str]) -> Header {
    let needed: Vec<String> = needed_keys.iter().map(|k| k.to_uppercase()).collect();
    let mut values: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in &raw.pairs {
        let key = key.to_uppercase();
        if MULTI_VALUED_KEYS.contains(&key.as_str()) {
            continue;
        }
        if !needed.is_empty() && !needed.iter().any(|k| k == &key) {
            continue;
        }
        match values.get(&key) {
            Some(first) if first != value => {
                warn!(
                    source,
                    key,
                    kept = %first,
                    dropped = %value,
                    "duplicate keyword with differing value, keeping first"
                );
            }
            Some(_) => {}
            None => {
                values.insert(key, value.clone());
            }
        }
    }
    for key in &needed {
        if key == HISTORY_KEY {
            continue;
        }
        let missing = values.get(key).is_none_or(|v| v == UNDEFINED);
        if missing {
            values.insert(key.clone(), UNDEFINED.to_string());
        }
    }
    Header::new(values, raw.history.clone())
}

/// Re-default needed keys on an already-reduced header.
///
/// Any key of `needed_keys` that is missing or holds [`UNDEFINED`] is set
/// to `define_as` (for example `"N/A"`); everything else is unchanged.
pub fn ensure_keys_defined(header: &Header, needed_keys: &[&str], define_as: &str) -> Header {
    let mut values: BTreeMap<String, String> = header
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    for key in needed_keys {
        let key = key.to_uppercase();
        let missing = values.get(&key).is_none_or(|v| v == UNDEFINED);
        if missing {
            values.insert(key, define_as.to_string());
        }
    }
    Header::new(values, header.history().to_vec())
}
