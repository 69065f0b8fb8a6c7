//! Format classification by filename pattern
//!
//! Classification never opens the file: a declared original name is enough
//! to pick an extraction strategy, which matters for web-staged uploads
//! whose physical path is an opaque temporary name.

use crate::header::Header;

/// Supported header container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// Legacy fixed-column `KEY = value / comment` line format with a
    /// paired header/data file naming scheme.
    FixedColumn,
    /// Nested-tree container with a structured (tagged) document head.
    StructuredTree,
    /// Self-describing tabular container made of fixed-width card
    /// sections, each followed by an optional data payload.
    TabularMultiSection,
    /// Flat mapping produced by an external model service.
    ExternalModel,
    /// Plain nested mapping in a text serialization.
    PlainTextTree,
}

impl FormatKind {
    /// Classify `name` by suffix/pattern alone.
    pub fn classify(name: &str) -> Self {
        let base = base_name(name);
        if fixed_column_tail(base).is_some() {
            return Self::FixedColumn;
        }
        match extension(base) {
            Some("asdf") => Self::StructuredTree,
            Some("fits") => Self::TabularMultiSection,
            Some("yaml" | "yml" | "json" | "txt" | "text") => Self::PlainTextTree,
            _ => Self::ExternalModel,
        }
    }
}

/// True if `name` classifies as an observation dataset file.
pub fn is_dataset(name: &str) -> bool {
    matches!(
        FormatKind::classify(name),
        FormatKind::FixedColumn | FormatKind::StructuredTree | FormatKind::TabularMultiSection
    )
}

/// True if `name` is a fixed-column **header** file (`...r<digit>h`).
pub fn is_fixed_header(name: &str) -> bool {
    matches!(fixed_column_tail(base_name(name)), Some((_, b'h')))
}

/// True if `name` is a fixed-column **data** file (`...r<digit>d`).
pub fn is_fixed_data(name: &str) -> bool {
    matches!(fixed_column_tail(base_name(name)), Some((_, b'd')))
}

/// Return the twin of a fixed-column pair member: the data file for a
/// header name, the header file for a data name, `None` for anything else.
pub fn conjugate(name: &str) -> Option<String> {
    if is_fixed_data(name) {
        Some(format!("{}h", &name[..name.len() - 1]))
    } else if is_fixed_header(name) {
        Some(format!("{}d", &name[..name.len() - 1]))
    } else {
        None
    }
}

/// Infer the observatory tag for a file.
///
/// `original_name` takes precedence over `path` for name-based inference;
/// for tabular containers the extracted `header` decides via its TELESCOP
/// keyword when one is supplied.
pub fn observatory(path: &str, original_name: Option<&str>, header: Option<&Header>) -> String {
    let name = original_name.unwrap_or(path);
    if name.contains("jwst") {
        return "jwst".to_string();
    }
    if name.contains("hst") {
        return "hst".to_string();
    }
    match FormatKind::classify(name) {
        FormatKind::TabularMultiSection => header
            .and_then(|h| h.get("TELESCOP"))
            .map(|t| t.to_lowercase())
            .unwrap_or_else(|| "hst".to_string()),
        FormatKind::StructuredTree | FormatKind::PlainTextTree | FormatKind::ExternalModel => {
            "jwst".to_string()
        }
        FormatKind::FixedColumn => "hst".to_string(),
    }
}

fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

fn extension(base: &str) -> Option<&str> {
    base.rsplit_once('.').map(|(_, ext)| ext)
}

/// The `(digit, discriminator)` tail of a fixed-column pair name, if any.
fn fixed_column_tail(base: &str) -> Option<(u8, u8)> {
    let tail = base.as_bytes();
    if tail.len() < 3 {
        return None;
    }
    let tail = &tail[tail.len() - 3..];
    (tail[0] == b'r' && tail[1].is_ascii_digit() && matches!(tail[2], b'h' | b'd'))
        .then_some((tail[1], tail[2]))
}
