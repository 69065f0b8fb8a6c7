//! Calibration software version ordering
//!
//! Versions here are dotted numeric segments where a segment may carry a
//! trailing pre-release/dev tag (`0.10.1dev20000`). That grammar is wider
//! than semver, so ordering is implemented directly: numeric prefixes
//! compare as integers, a tagged segment ranks below its untagged
//! counterpart, and missing trailing segments count as zero.

use std::cmp::Ordering;
use std::fmt;

/// A parsed, totally ordered calibration software version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CalVersion {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Segment {
    number: u64,
    tag: Tag,
}

/// Pre-release tags order before the final release of the same number;
/// variant order here is load-bearing for the derived `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Tag {
    Pre(String),
    Release,
}

impl CalVersion {
    /// Parse is total: any string yields a comparable version.
    pub fn parse(text: &str) -> Self {
        let mut segments: Vec<Segment> = text
            .split('.')
            .map(|part| {
                let digits = part.chars().take_while(char::is_ascii_digit).count();
                let number = part[..digits].parse().unwrap_or(0);
                let suffix = &part[digits..];
                let tag = if suffix.is_empty() {
                    Tag::Release
                } else {
                    Tag::Pre(suffix.to_string())
                };
                Segment { number, tag }
            })
            .collect();
        // Trailing zero segments are insignificant: "1.0" == "1".
        while segments
            .last()
            .is_some_and(|s| s.number == 0 && s.tag == Tag::Release)
        {
            segments.pop();
        }
        Self { segments }
    }
}

impl Ord for CalVersion {
    /// Missing trailing segments compare as zero, so `"1" == "1.0"` and
    /// `"1" > "1.0a1"` (a pre-release of `.0` ranks below its release).
    fn cmp(&self, other: &Self) -> Ordering {
        let zero = Segment {
            number: 0,
            tag: Tag::Release,
        };
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let left = self.segments.get(i).unwrap_or(&zero);
            let right = other.segments.get(i).unwrap_or(&zero);
            match left.cmp(right) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for CalVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CalVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment.number)?;
            if let Tag::Pre(suffix) = &segment.tag {
                write!(f, "{suffix}")?;
            }
        }
        Ok(())
    }
}

/// True IFF version `v1` orders strictly before `v2`.
pub fn versions_lt(v1: &str, v2: &str) -> bool {
    CalVersion::parse(v1) < CalVersion::parse(v2)
}
