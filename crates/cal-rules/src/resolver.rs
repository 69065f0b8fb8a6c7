//! Rule resolution for one loaded document
//!
//! A resolver answers exposure-type → reference types, exposure-type →
//! pipelines (with conditional substitution), and reference-type →
//! pipelines, for a single (context, software version) identity.

use std::collections::BTreeSet;

use cal_header::Header;
use tracing::debug;

use crate::document::{invert_list_mapping, RuleDocument};
use crate::error::{Error, Result};

/// Header values treated as "off" when testing an exception condition.
pub const FALSY_VALUES: &[&str] = &["F", "FALSE", "NONE", "OFF"];

/// Resolver over one rule document.
#[derive(Debug)]
pub struct ConfigResolver {
    context: String,
    cal_ver: String,
    /// Display name of the loaded document, used in logs and errors.
    document: String,
    doc: RuleDocument,
}

impl ConfigResolver {
    pub fn new(
        context: impl Into<String>,
        cal_ver: impl Into<String>,
        document: impl Into<String>,
        doc: RuleDocument,
    ) -> Self {
        Self {
            context: context.into(),
            cal_ver: cal_ver.into(),
            document: document.into(),
            doc,
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn cal_ver(&self) -> &str {
        &self.cal_ver
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn rules(&self) -> &RuleDocument {
        &self.doc
    }

    /// Sorted reference types needed to process `exp_type` through every
    /// step of every pipeline nominally associated with it.
    pub fn reftypes_for(&self, exp_type: &str) -> Result<Vec<String>> {
        let pipelines = self.doc.pipelines(&self.document, exp_type)?;
        let reftypes = self.reftypes_for_pipelines(pipelines)?;
        debug!(
            exp_type,
            document = %self.document,
            ?reftypes,
            "applicable reftypes"
        );
        Ok(reftypes)
    }

    /// Sorted dedup union of reference types across `pipelines`.
    pub fn reftypes_for_pipelines(&self, pipelines: &[String]) -> Result<Vec<String>> {
        let mut reftypes = BTreeSet::new();
        for pipeline in pipelines {
            for step in self.doc.steps(&self.document, pipeline)? {
                reftypes.extend(self.doc.reftypes(&self.document, step)?.iter().cloned());
            }
        }
        Ok(reftypes.into_iter().collect())
    }

    /// Ordered pipelines for `exp_type`, with exception substitutions
    /// applied from the conditioning fields of `header`.
    pub fn pipelines_for(&self, exp_type: &str, header: &Header) -> Result<Vec<String>> {
        let mut pipelines: Vec<String> = self
            .doc
            .pipelines(&self.document, exp_type)?
            .to_vec();
        if !self.doc.pipeline_exceptions.is_empty() {
            for pipeline in &mut pipelines {
                for (field, substitutions) in &self.doc.pipeline_exceptions {
                    let value = header.get_or(&field.to_uppercase(), "F").to_uppercase();
                    if FALSY_VALUES.contains(&value.as_str()) {
                        continue;
                    }
                    if let Some(substitute) = substitutions.get(pipeline.as_str()) {
                        *pipeline = substitute.clone();
                    }
                }
            }
        }
        debug!(exp_type, ?pipelines, "applicable pipelines");
        Ok(pipelines)
    }

    /// Sorted pipelines reachable from every step that lists `reftype`.
    pub fn pipelines_for_reftype(&self, reftype: &str) -> Result<Vec<String>> {
        let reftypes_to_steps = invert_list_mapping(&self.doc.steps_to_reftypes);
        let steps_to_pipelines = invert_list_mapping(&self.doc.pipelines_to_steps);
        let steps = reftypes_to_steps.get(reftype).ok_or_else(|| Error::Lookup {
            document: self.document.clone(),
            table: "steps_to_reftypes",
            key: reftype.to_string(),
        })?;
        let mut pipelines = BTreeSet::new();
        for step in steps {
            if let Some(step_pipelines) = steps_to_pipelines.get(step) {
                pipelines.extend(step_pipelines.iter().cloned());
            }
        }
        Ok(pipelines.into_iter().collect())
    }
}
