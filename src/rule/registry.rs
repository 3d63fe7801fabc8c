use super::{ConstructKind, RuleSpec};
use crate::error::ConfigurationError;
use std::collections::HashMap;
use tracing::{debug, trace};

/// A rule together with the bundle it was registered under.
#[derive(Debug, Clone)]
pub struct RegisteredRule {
    pub spec: RuleSpec,
    pub bundle: String,
}

/// Registration-ordered rule table.
///
/// Built once before scanning and read-only thereafter; an explicit value
/// passed by reference into matching, safe for unsynchronized concurrent
/// reads from parallel per-file scans.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<RegisteredRule>,
    // type name -> indexes into `rules`, in registration order
    by_type: HashMap<String, Vec<usize>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a rule. Configuration errors are fatal to the
    /// run; they are programmer errors in rule data, not runtime conditions.
    pub fn register(
        &mut self,
        spec: RuleSpec,
        bundle: impl Into<String>,
    ) -> Result<(), ConfigurationError> {
        let bundle = bundle.into();
        spec.validate(&bundle)?;

        let index = self.rules.len();
        for type_name in &spec.target_types {
            self.by_type
                .entry(type_name.clone())
                .or_default()
                .push(index);
        }
        trace!(bundle, index, "registered rule");
        self.rules.push(RegisteredRule { spec, bundle });
        Ok(())
    }

    pub fn register_all(
        &mut self,
        specs: Vec<RuleSpec>,
        bundle: impl Into<String>,
    ) -> Result<(), ConfigurationError> {
        let bundle = bundle.into();
        let count = specs.len();
        for spec in specs {
            self.register(spec, bundle.clone())?;
        }
        debug!(bundle, count, "registered bundle");
        Ok(())
    }

    /// Candidate rules for a target type and construct kind, in registration
    /// order. Registration order is the tie-break when several rules could
    /// structurally match the same node: the first registered wins. This is
    /// a documented rule-authoring hazard, not a priority system.
    pub fn lookup(
        &self,
        type_name: &str,
        construct_kind: ConstructKind,
    ) -> impl Iterator<Item = &RegisteredRule> {
        self.by_type
            .get(type_name)
            .map(|indexes| indexes.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&i| &self.rules[i])
            .filter(move |r| r.spec.construct_kind == construct_kind)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn bundles(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.iter().map(|r| r.bundle.as_str()).collect();
        names.dedup();
        names
    }
}
