//! Multi-section tabular container format
//!
//! The container is a sequence of sections. Each section starts with a
//! header of fixed 80-byte keyword cards packed into 2880-byte records
//! and terminated by an `END` card; the header declares the geometry of
//! an optional data payload which is skipped, record-aligned, to reach
//! the next section. The extracted header is the union of all section
//! headers in section order; a key already seen in an earlier section
//! wins and the later emission is dropped with a logged note.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::extract::{key_needed, upper_keys, Extract};
use crate::format::FormatKind;
use crate::header::{RawHeader, HISTORY_KEY};

const RECORD_LEN: usize = 2880;
const CARD_LEN: usize = 80;
const CARDS_PER_RECORD: usize = RECORD_LEN / CARD_LEN;

/// Extractor for the multi-section tabular container format.
#[derive(Debug, Default)]
pub struct TableExtractor;

impl TableExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Parse an in-memory container image.
    pub fn parse_bytes(label: &str, data: &[u8], needed_keys: &[&str]) -> Result<RawHeader> {
        let needed = upper_keys(needed_keys);
        let mut raw = RawHeader::default();
        let mut seen: HashMap<String, String> = HashMap::new();
        let mut offset = 0;
        let mut section = 0;

        while offset < data.len() {
            let header = SectionHeader::parse(label, data, &mut offset, section)?;
            for (key, value) in header.cards {
                if key.is_empty() {
                    continue;
                }
                if key == HISTORY_KEY {
                    raw.history.push(value);
                    continue;
                }
                if let Some(first) = seen.get(&key) {
                    debug!(
                        label,
                        section,
                        key,
                        kept = %first,
                        "keyword repeated in a later section, keeping the earlier value"
                    );
                    continue;
                }
                seen.insert(key.clone(), value.clone());
                if key_needed(&needed, &key) {
                    raw.push(key, value);
                }
            }
            offset += header.data_records * RECORD_LEN;
            section += 1;
        }

        if !needed.is_empty() && !needed.iter().any(|k| k == HISTORY_KEY) {
            raw.history.clear();
        }
        Ok(raw)
    }
}

impl Extract for TableExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::TabularMultiSection
    }

    fn raw_header(&self, path: &Path, needed_keys: &[&str]) -> Result<RawHeader> {
        let data = fs::read(path).map_err(|e| Error::io(path, e))?;
        Self::parse_bytes(&path.display().to_string(), &data, needed_keys)
    }
}

/// One parsed section header plus the record count of its data payload.
struct SectionHeader {
    cards: Vec<(String, String)>,
    data_records: usize,
}

impl SectionHeader {
    /// Parse records starting at `*offset` until the `END` card,
    /// advancing `*offset` past the last header record.
    fn parse(label: &str, data: &[u8], offset: &mut usize, section: usize) -> Result<Self> {
        let mut cards = Vec::new();
        let mut geometry = Geometry::default();
        let mut ended = false;

        while !ended {
            let record = data
                .get(*offset..*offset + RECORD_LEN)
                .ok_or_else(|| Error::format(label, "tabular", truncated(section, *offset)))?;
            *offset += RECORD_LEN;

            for i in 0..CARDS_PER_RECORD {
                let card = &record[i * CARD_LEN..(i + 1) * CARD_LEN];
                let (key, value) = parse_card(label, card)?;
                if key == "END" {
                    ended = true;
                    break;
                }
                if cards.is_empty() && key.is_empty() {
                    continue;
                }
                if cards.is_empty() && !matches!(key.as_str(), "SIMPLE" | "XTENSION") {
                    return Err(Error::format(
                        label,
                        "tabular",
                        format!("section {section} does not begin with SIMPLE or XTENSION"),
                    ));
                }
                geometry.observe(label, &key, &value)?;
                cards.push((key, value));
            }
        }

        Ok(Self {
            cards,
            data_records: geometry.data_records(),
        })
    }
}

/// Data payload geometry declared by a section header.
#[derive(Debug, Default)]
struct Geometry {
    bitpix: i64,
    axes: Vec<u64>,
    pcount: u64,
    gcount: u64,
}

impl Geometry {
    fn observe(&mut self, label: &str, key: &str, value: &str) -> Result<()> {
        let numeric = |value: &str| -> Result<i64> {
            value.parse().map_err(|_| {
                Error::format(label, "tabular", format!("non-numeric {key}: {value:?}"))
            })
        };
        match key {
            "BITPIX" => self.bitpix = numeric(value)?,
            "NAXIS" => self.axes = vec![0; numeric(value)?.max(0) as usize],
            "PCOUNT" => self.pcount = numeric(value)?.max(0) as u64,
            "GCOUNT" => self.gcount = numeric(value)?.max(0) as u64,
            _ => {
                if let Some(n) = key.strip_prefix("NAXIS").and_then(|n| n.parse::<usize>().ok()) {
                    if n >= 1 && n <= self.axes.len() {
                        self.axes[n - 1] = numeric(value)?.max(0) as u64;
                    }
                }
            }
        }
        Ok(())
    }

    fn data_records(&self) -> usize {
        if self.axes.is_empty() || self.axes.contains(&0) {
            return 0;
        }
        let elements: u64 = self.axes.iter().product();
        let gcount = self.gcount.max(1);
        let bytes = (self.bitpix.unsigned_abs() / 8) * gcount * (self.pcount + elements);
        (bytes as usize).div_ceil(RECORD_LEN)
    }
}

/// Split one 80-byte card into its keyword and value text.
fn parse_card(label: &str, card: &[u8]) -> Result<(String, String)> {
    let text = match std::str::from_utf8(card) {
        Ok(text) if text.is_ascii() => text,
        _ => return Err(Error::format(label, "tabular", "non-ASCII card".to_string())),
    };
    let key = text[..8.min(text.len())].trim().to_uppercase();
    let rest = text.get(8..).unwrap_or("");

    // "= " marks a value card; anything else is commentary text.
    let Some(value) = rest.strip_prefix("= ") else {
        return Ok((key, rest.trim().to_string()));
    };

    let value = value.trim_start();
    if let Some(quoted) = value.strip_prefix('\'') {
        let mut out = String::new();
        let mut chars = quoted.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    out.push('\'');
                    continue;
                }
                return Ok((key, out.trim_end().to_string()));
            }
            out.push(c);
        }
        Err(Error::format(label, "tabular", format!("unterminated string in {key} card")))
    } else {
        let token = value.split('/').next().unwrap_or("").trim();
        Ok((key, token.to_string()))
    }
}

fn truncated(section: usize, offset: usize) -> String {
    format!("truncated record in section {section} at byte {offset}")
}
