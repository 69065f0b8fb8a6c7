//! Versioned calibration rule selection and resolution.
//!
//! Given an exposure's canonical header and the version of the
//! calibration software that will process it, this crate selects the
//! applicable rule document (live distribution first, bundled documents
//! as the deterministic fallback) and walks it to answer which reference
//! types and pipeline steps apply.

pub mod cache;
pub mod document;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod select;
pub mod version;

pub use cache::ResolverCache;
pub use document::{invert_list_mapping, RuleDocument};
pub use engine::{RulesEngine, CALVER_KEYS, EXPTYPE_KEYS};
pub use error::{Error, Result};
pub use resolver::{ConfigResolver, FALSY_VALUES};
pub use select::{
    BuiltinDocument, DocumentSource, RuleSource, VersionSelector, OPERATIONAL_CONTEXT, RULE_INDEX,
};
pub use version::{versions_lt, CalVersion};
