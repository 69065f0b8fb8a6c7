//! Per-format header extraction strategies
//!
//! Each format implements [`Extract`]: read one file, emit ordered raw
//! pairs plus any accumulated multi-line list. Extraction never merges or
//! defaults values; that is the reducer's job, identical for every format.

mod fixed;
mod model;
mod table;
mod tree;

pub use fixed::FixedColumnExtractor;
pub use model::ModelExtractor;
pub use table::TableExtractor;
pub use tree::TreeExtractor;

use std::path::Path;

use crate::error::Result;
use crate::format::FormatKind;
use crate::header::RawHeader;

/// Capability shared by all format extractors.
pub trait Extract: Send + Sync {
    /// Format this extractor understands.
    fn kind(&self) -> FormatKind;

    /// Read `path` and emit raw pairs in source order.
    ///
    /// `needed_keys` limits emission to the listed keywords; an empty
    /// slice means all keys. The file handle is owned for the duration of
    /// the call and released on every exit path.
    fn raw_header(&self, path: &Path, needed_keys: &[&str]) -> Result<RawHeader>;
}

/// Select the extractor for a classified format.
pub fn extractor_for(kind: FormatKind) -> Box<dyn Extract> {
    match kind {
        FormatKind::FixedColumn => Box::new(FixedColumnExtractor::new()),
        FormatKind::StructuredTree => Box::new(TreeExtractor::structured()),
        FormatKind::PlainTextTree => Box::new(TreeExtractor::plain_text()),
        FormatKind::TabularMultiSection => Box::new(TableExtractor::new()),
        FormatKind::ExternalModel => Box::new(ModelExtractor::new()),
    }
}

/// Classify and extract in one step.
///
/// `original_name` overrides `path` for classification only; `path` must
/// be the readable file.
pub fn raw_header(path: &Path, needed_keys: &[&str], original_name: Option<&str>) -> Result<RawHeader> {
    let name = original_name
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string());
    let extractor = extractor_for(FormatKind::classify(&name));
    tracing::debug!(path = %path.display(), kind = ?extractor.kind(), "extracting header");
    extractor.raw_header(path, needed_keys)
}

/// True when `key` passes the needed-key filter (`needed` is uppercase).
pub(crate) fn key_needed(needed: &[String], key: &str) -> bool {
    needed.is_empty() || needed.iter().any(|k| k.eq_ignore_ascii_case(key))
}

pub(crate) fn upper_keys(needed_keys: &[&str]) -> Vec<String> {
    needed_keys.iter().map(|k| k.to_uppercase()).collect()
}
