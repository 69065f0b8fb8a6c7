//! Header extraction and normalization for observation data files.
//!
//! Reconciles the supported on-disk header representations (legacy
//! fixed-column pairs, structured trees, multi-section tabular containers,
//! and externally flattened model mappings) into one canonical flat
//! key/value [`Header`] with deterministic duplicate and missing-key
//! handling.

pub mod error;
pub mod extract;
pub mod format;
pub mod header;
pub mod reduce;

pub use error::{Error, Result};
pub use format::FormatKind;
pub use header::{Header, RawHeader, HISTORY_KEY, UNDEFINED};
pub use reduce::{ensure_keys_defined, reduce};

use std::path::Path;

/// Extract and reduce the header of the file at `path`.
///
/// `needed_keys` limits the result to the listed keywords (empty means
/// all); keys that remain missing after extraction come back as
/// [`UNDEFINED`]. `original_name`, when given, is used only to classify
/// the format of a file whose physical path is an opaque staging name.
pub fn header(path: &Path, needed_keys: &[&str], original_name: Option<&str>) -> Result<Header> {
    let raw = extract::raw_header(path, needed_keys, original_name)?;
    Ok(reduce::reduce(&path.display().to_string(), &raw, needed_keys))
}

/// Return a single keyword value from the file at `path`.
///
/// The value is reduced the same way [`header`] reduces it, so a keyword
/// absent from the file comes back as [`UNDEFINED`] rather than an error.
pub fn value_of(path: &Path, key: &str) -> Result<String> {
    let reduced = header(path, &[key], None)?;
    Ok(reduced
        .get(&key.to_uppercase())
        .unwrap_or(UNDEFINED)
        .to_string())
}
