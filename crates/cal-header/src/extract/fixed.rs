//! Legacy fixed-column line format
//!
//! Lines carry `KEY = value / comment` with the comment delimiter at a
//! fixed column. The reserved multi-line keyword accumulates into an
//! ordered list instead of being parsed as a pair. A data-file name is
//! redirected to its header twin before reading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::extract::{key_needed, upper_keys, Extract};
use crate::format::{self, FormatKind};
use crate::header::{RawHeader, HISTORY_KEY};

/// Column at which the comment delimiter sits when present.
const COMMENT_COLUMN: usize = 31;

/// Extractor for the legacy fixed-column header format.
#[derive(Debug, Default)]
pub struct FixedColumnExtractor;

impl FixedColumnExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Parse an in-memory line sequence.
    ///
    /// The accumulated multi-line list is attached only when
    /// `needed_keys` is empty or names the reserved keyword.
    pub fn parse_lines<'a>(
        lines: impl IntoIterator<Item = &'a str>,
        needed_keys: &[&str],
    ) -> RawHeader {
        let needed = upper_keys(needed_keys);
        let mut raw = RawHeader::default();
        for mut line in lines {
            // Comment delimiter at the fixed column truncates the line.
            if line
                .get(COMMENT_COLUMN..)
                .is_some_and(|rest| rest.starts_with('/'))
            {
                line = &line[..COMMENT_COLUMN];
            }

            if let Some(rest) = line.strip_prefix(HISTORY_KEY) {
                raw.history.push(rest.trim().to_string());
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();

            if !key_needed(&needed, key) {
                continue;
            }

            let mut value = value.trim();
            if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
                value = value[1..value.len() - 1].trim();
            }
            raw.push(key, value);
        }
        if !needed.is_empty() && !needed.iter().any(|k| k == HISTORY_KEY) {
            raw.history.clear();
        }
        raw
    }
}

impl Extract for FixedColumnExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::FixedColumn
    }

    fn raw_header(&self, path: &Path, needed_keys: &[&str]) -> Result<RawHeader> {
        let name = path.display().to_string();
        let path: PathBuf = if format::is_fixed_data(&name) {
            // The header twin holds the keywords.
            format::conjugate(&name)
                .map(PathBuf::from)
                .unwrap_or_else(|| path.to_path_buf())
        } else {
            path.to_path_buf()
        };
        let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        Ok(Self::parse_lines(text.lines(), needed_keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
SIMPLE  =                    F /
BITPIX  =                   16 /
DATATYPE= 'INTEGER*2'          /
NAXIS   =                    1 /
NAXIS1  =                  800 /
PTYPE1  = 'CRVAL1  '           /right ascension of reference pixel
INSTRUME= 'WFPC2   '           / instrument in use
FILTNAM1= '        '           / first filter name
PEDIGREE= 'INFLIGHT 01/01/1994 - 15/05/1995'
DESCRIP = 'STATIC MASK - INCLUDES CHARGE TRANSFER TRAPS'
HISTORY This file was edited by Michael S. Wiggs, August 1995
HISTORY
HISTORY e2112084u.r0h was edited to include values of 256
END";

    fn pairs(raw: &RawHeader) -> Vec<(&str, &str)> {
        raw.pairs
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn scalar_fields_parse_with_quotes_stripped() {
        let raw = FixedColumnExtractor::parse_lines(SAMPLE.lines(), &[]);
        let pairs = pairs(&raw);
        assert!(pairs.contains(&("BITPIX", "16")));
        assert!(pairs.contains(&("DATATYPE", "INTEGER*2")));
        assert!(pairs.contains(&("INSTRUME", "WFPC2")));
        assert!(pairs.contains(&("FILTNAM1", "")));
    }

    #[test]
    fn comment_column_is_truncated() {
        let raw = FixedColumnExtractor::parse_lines(SAMPLE.lines(), &[]);
        let pairs = pairs(&raw);
        assert!(pairs.contains(&("PTYPE1", "CRVAL1")));
    }

    #[test]
    fn values_past_the_comment_column_survive() {
        let raw = FixedColumnExtractor::parse_lines(SAMPLE.lines(), &[]);
        let pairs = pairs(&raw);
        assert!(pairs.contains(&("PEDIGREE", "INFLIGHT 01/01/1994 - 15/05/1995")));
    }

    #[test]
    fn history_lines_accumulate_in_order() {
        let raw = FixedColumnExtractor::parse_lines(SAMPLE.lines(), &[]);
        assert_eq!(
            raw.history,
            vec![
                "This file was edited by Michael S. Wiggs, August 1995",
                "",
                "e2112084u.r0h was edited to include values of 256",
            ]
        );
    }

    #[test]
    fn needed_keys_filter_lines() {
        let raw = FixedColumnExtractor::parse_lines(SAMPLE.lines(), &["BITPIX"]);
        assert_eq!(pairs(&raw), vec![("BITPIX", "16")]);
        assert!(raw.history.is_empty());
    }

    #[test]
    fn history_kept_when_requested() {
        let raw = FixedColumnExtractor::parse_lines(SAMPLE.lines(), &["HISTORY"]);
        assert!(raw.pairs.is_empty());
        assert_eq!(raw.history.len(), 3);
    }

    #[test]
    fn quoted_padding_strips_on_both_ends() {
        let raw = FixedColumnExtractor::parse_lines(["TARGNAME= '  NGC 104 '"], &[]);
        assert_eq!(pairs(&raw), vec![("TARGNAME", "NGC 104")]);
    }

    #[test]
    fn lines_without_equals_are_skipped() {
        let raw = FixedColumnExtractor::parse_lines(["END", "", "no delimiter here"], &[]);
        assert!(raw.pairs.is_empty());
    }

    #[test]
    fn value_with_embedded_equals_is_recombined() {
        let raw = FixedColumnExtractor::parse_lines(["EXPR    = 'a=b'"], &[]);
        assert_eq!(pairs(&raw), vec![("EXPR", "a=b")]);
    }
}
