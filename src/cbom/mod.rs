/// Finding aggregation: folds detection trees from every scanned file into
/// a deduplicated, relationship-aware asset graph.
///
/// The graph is the single shared-mutation point of a scan; per-file
/// matching is independent and `fold` is called serially over the results.
/// Folding the same set of trees in any order yields the same graph: the
/// merge is commutative and associative on the dedup key, and all containers
/// iterate in a defined order.
use crate::engine::{DetectionNode, Location};
use crate::model::{ContextKind, Value};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Stable asset identity derived from context, resolved algorithm name, and
/// distinguishing size properties. A readable slug rather than an opaque
/// hash, so identities are reproducible across runs and debuggable in
/// output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    fn derive(context: ContextKind, name: &str, properties: &BTreeMap<String, Value>) -> Self {
        let mut id = format!("{}:{}", context, slug(name));
        for (key, value) in properties {
            if let Value::Size { value: size, unit } = value {
                id.push_str(&format!(":{key}={size}{unit}"));
            }
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn slug(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// One deduplicated entry in the CBOM: a distinct cryptographic construct,
/// everywhere it occurs, and what it is structurally built on. Identity is
/// immutable once created; occurrences and edges grow monotonically.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: AssetId,
    pub context: ContextKind,
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
    /// Rule bundles whose detections contributed to this asset.
    pub bundles: BTreeSet<String>,
    pub occurrences: BTreeSet<Location>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<AssetId>,
}

/// The aggregated CBOM asset graph.
#[derive(Debug, Default)]
pub struct AssetGraph {
    assets: BTreeMap<AssetId, Asset>,
}

/// Asset name when a detection carries no resolvable name. Absence of
/// cryptographic metadata is itself a reportable finding, not a silent
/// failure.
pub const UNKNOWN_NAME: &str = "unknown";

impl AssetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one detection tree into the graph, bottom-up.
    ///
    /// Children fold first, so deferred names are resolved before their
    /// parents derive an identity. Each child asset contributes a
    /// `depends_on` edge from the parent. A nameless size-valued child is a
    /// parameter of its parent, not a construct of its own; it merges into
    /// the parent's properties instead of forming an asset.
    pub fn fold(&mut self, tree: &DetectionNode) {
        self.fold_node(tree);
    }

    fn fold_node(&mut self, node: &DetectionNode) -> AssetId {
        let mut child_ids = BTreeSet::new();
        let mut properties = BTreeMap::new();

        if let (Some(key), Value::Size { .. }) = (&node.property, &node.value) {
            properties.insert(key.clone(), node.value.clone());
        }

        for child in &node.children {
            let is_parameter =
                child.node.property.is_some() && child.node.resolved_name().is_none();
            if is_parameter {
                if let (Some(key), Value::Size { .. }) = (&child.node.property, &child.node.value)
                {
                    properties.insert(key.clone(), child.node.value.clone());
                }
            } else {
                child_ids.insert(self.fold_node(&child.node));
            }
        }

        let name = node
            .resolved_name()
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let id = AssetId::derive(node.context, &name, &properties);
        trace!(id = %id, "folding detection");

        let asset = self.assets.entry(id.clone()).or_insert_with(|| Asset {
            id: id.clone(),
            context: node.context,
            name,
            properties: BTreeMap::new(),
            bundles: BTreeSet::new(),
            occurrences: BTreeSet::new(),
            depends_on: BTreeSet::new(),
        });

        // Merge: set-valued fields union, scalar properties last-merged-wins.
        asset.bundles.insert(node.bundle.clone());
        asset.occurrences.insert(node.location.clone());
        asset.depends_on.extend(child_ids);
        for (key, value) in properties {
            asset.properties.insert(key, value);
        }

        id
    }

    pub fn get(&self, id: &AssetId) -> Option<&Asset> {
        self.assets.get(id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Asset> {
        self.assets.values().find(|a| a.name == name)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    pub fn into_assets(self) -> Vec<Asset> {
        self.assets.into_values().collect()
    }
}
