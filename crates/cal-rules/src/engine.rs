//! Top-level orchestration: header in, reftypes/pipelines out
//!
//! The engine owns the selector, the resolver cache, and the defaults for
//! the installed software version and the operational context. Nested
//! failures are wrapped with the exposure-type/version pair they were
//! resolving, so callers can report the failing exposure without losing
//! the root cause.

use std::sync::Arc;

use cal_header::{Header, UNDEFINED};

use crate::cache::ResolverCache;
use crate::error::{Error, Result};
use crate::resolver::ConfigResolver;
use crate::select::{RuleSource, VersionSelector, OPERATIONAL_CONTEXT, RULE_INDEX};

/// Header keys consulted for the exposure type, in priority order.
pub const EXPTYPE_KEYS: &[&str] = &["META.EXPOSURE.TYPE", "EXP_TYPE"];

/// Header keys consulted for the software version, in priority order.
pub const CALVER_KEYS: &[&str] = &["META.CALIBRATION_SOFTWARE_VERSION", "CAL_VER"];

/// Rule engine bound to one installed software version.
pub struct RulesEngine {
    selector: VersionSelector,
    cache: ResolverCache,
    installed_version: String,
    default_context: String,
}

impl RulesEngine {
    /// Engine for the given installed calibration software version,
    /// using only built-in rule documents.
    pub fn new(installed_version: impl Into<String>) -> Self {
        Self {
            selector: VersionSelector::new(),
            cache: ResolverCache::new(),
            installed_version: installed_version.into(),
            default_context: OPERATIONAL_CONTEXT.to_string(),
        }
    }

    /// Consult `source` for live rule documents before the built-ins.
    pub fn with_live(mut self, source: Box<dyn RuleSource>) -> Self {
        self.selector = VersionSelector::with_live(source);
        self
    }

    /// Replace the resolver cache, e.g. to share one across engines.
    pub fn with_cache(mut self, cache: ResolverCache) -> Self {
        self.cache = cache;
        self
    }

    /// The cache, exposed so tests can reset it between cases.
    pub fn cache(&self) -> &ResolverCache {
        &self.cache
    }

    pub fn installed_version(&self) -> &str {
        &self.installed_version
    }

    /// Sorted reference types needed to process the exposure `header`
    /// describes, with pipeline exceptions applied.
    pub fn reftypes_for_header(&self, header: &Header, context: Option<&str>) -> Result<Vec<String>> {
        let (exp_type, cal_ver) = self.exptype_calver(header);
        self.try_reftypes(header, context, &exp_type, &cal_ver)
            .map_err(|e| Error::resolve(exp_type, cal_ver, e))
    }

    /// Ordered pipelines for the exposure `header` describes, with
    /// exceptions applied.
    pub fn pipelines_for_header(&self, header: &Header, context: Option<&str>) -> Result<Vec<String>> {
        let (exp_type, cal_ver) = self.exptype_calver(header);
        self.resolver(context, Some(&cal_ver))
            .and_then(|resolver| resolver.pipelines_for(&exp_type, header))
            .map_err(|e| Error::resolve(exp_type, cal_ver, e))
    }

    /// Sorted reference types for a bare exposure type, without header
    /// conditioning.
    pub fn reftypes_for_exptype(
        &self,
        exp_type: &str,
        cal_ver: Option<&str>,
        context: Option<&str>,
    ) -> Result<Vec<String>> {
        self.resolver(context, cal_ver)?.reftypes_for(exp_type)
    }

    /// Sorted pipelines consuming `reftype` anywhere in the applicable
    /// rule document.
    pub fn pipelines_for_reftype(
        &self,
        reftype: &str,
        cal_ver: Option<&str>,
        context: Option<&str>,
    ) -> Result<Vec<String>> {
        self.resolver(context, cal_ver)?.pipelines_for_reftype(reftype)
    }

    /// Memoized resolver for (context, software version).
    pub fn resolver(
        &self,
        context: Option<&str>,
        cal_ver: Option<&str>,
    ) -> Result<Arc<ConfigResolver>> {
        let context = context.unwrap_or(&self.default_context);
        let cal_ver = cal_ver.unwrap_or(&self.installed_version);
        self.cache.get_or_load(context, cal_ver, || {
            let (document, doc) = self.selector.resolve(context, cal_ver)?;
            Ok(ConfigResolver::new(context, cal_ver, document, doc))
        })
    }

    fn try_reftypes(
        &self,
        header: &Header,
        context: Option<&str>,
        exp_type: &str,
        cal_ver: &str,
    ) -> Result<Vec<String>> {
        let resolver = self.resolver(context, Some(cal_ver))?;
        let pipelines = resolver.pipelines_for(exp_type, header)?;
        resolver.reftypes_for_pipelines(&pipelines)
    }

    /// Exposure type and software version from `header`, first matching
    /// key spelling wins, with engine defaults for absent keys.
    pub fn exptype_calver(&self, header: &Header) -> (String, String) {
        let first = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| header.get(key))
                .map(str::to_string)
        };
        let exp_type = first(EXPTYPE_KEYS).unwrap_or_else(|| UNDEFINED.to_string());
        let cal_ver = first(CALVER_KEYS).unwrap_or_else(|| self.installed_version.clone());
        (exp_type, cal_ver)
    }
}

impl Default for RulesEngine {
    /// Engine pinned to the newest non-backstop built-in generation.
    fn default() -> Self {
        let latest = RULE_INDEX[RULE_INDEX.len() - 2].version;
        Self::new(latest)
    }
}
