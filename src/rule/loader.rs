use super::{RuleRegistry, RuleSpec};
use crate::error::{Error, Result, RulesError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// On-disk rule bundle: a version marker, a bundle name for provenance, and
/// the rule list itself.
#[derive(Debug, Deserialize)]
struct RuleFile {
    #[allow(dead_code)]
    version: String,
    bundle: String,
    rules: Vec<RuleSpec>,
}

/// Loads declarative rule bundles from JSON or YAML files into a registry.
pub struct RuleLoader;

impl RuleLoader {
    /// Load one bundle file and register its rules. The format is chosen by
    /// file extension (json, yaml, yml).
    pub fn load_file(registry: &mut RuleRegistry, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        trace!(path = %path.display(), "loading rule bundle");

        let content = fs::read_to_string(path)
            .map_err(|e| RulesError::rules_file_read_error(path, e.to_string()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let file: RuleFile = match extension {
            "json" => serde_json::from_str(&content)
                .map_err(|e| RulesError::rules_parse_error(path, e.to_string()))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| RulesError::rules_parse_error(path, e.to_string()))?,
            _ => return Err(Error::Rules(RulesError::unsupported_format(extension))),
        };

        let count = file.rules.len();
        registry.register_all(file.rules, file.bundle.clone())?;
        debug!(bundle = %file.bundle, count, path = %path.display(), "loaded rule bundle");
        Ok(())
    }

    /// Load every bundle file from a directory, in file-name order so
    /// registration order (and therefore tie-breaks) stays reproducible.
    pub fn load_dir(registry: &mut RuleRegistry, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::Rules(RulesError::rules_dir_not_found(dir)));
        }

        let mut paths: Vec<_> = fs::read_dir(dir)
            .map_err(|e| RulesError::rules_file_read_error(dir, e.to_string()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("json" | "yaml" | "yml")
                )
            })
            .collect();
        paths.sort();

        for path in paths {
            Self::load_file(registry, path)?;
        }
        Ok(())
    }

    /// Registry preloaded with the rule data shipped in the crate's `rules/`
    /// directory (BouncyCastle engines and wrappers, JCA entry points).
    pub fn from_bundled() -> Result<RuleRegistry> {
        debug!("loading bundled rule bundles");
        let mut registry = RuleRegistry::new();
        let rules_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("rules");
        Self::load_dir(&mut registry, rules_dir)?;
        debug!(rules = registry.rule_count(), "bundled rules loaded");
        Ok(registry)
    }
}
