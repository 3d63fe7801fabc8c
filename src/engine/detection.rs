use super::Location;
use crate::model::{ContextKind, Value};
use crate::rule::ParamPosition;
use serde::Serialize;

/// How the algorithm name of a detection resolves.
///
/// `Deferred` marks a deliberate placeholder: the name is substituted with
/// the first matched child's resolved name at fold time, optionally
/// suffixed. A tagged variant instead of a sentinel string keeps the
/// rule-file surface and the aggregator honest about what is unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum NameResolution {
    Resolved {
        name: String,
    },
    Deferred {
        #[serde(skip_serializing_if = "Option::is_none")]
        suffix: Option<String>,
    },
    Unnamed,
}

/// A dependent match, tagged with the parameter position it was bound to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildDetection {
    pub position: ParamPosition,
    pub node: DetectionNode,
}

/// Result of one successful rule match, possibly containing nested matches
/// from dependent rules. Owned by the per-file scan that produced it and
/// discarded once folded into the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionNode {
    pub context: ContextKind,
    pub name: NameResolution,
    pub value: Value,
    /// Property key for size-valued detections (e.g. `blockSize`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Name of the rule bundle that produced this detection. Dependent
    /// matches inherit the enclosing rule's bundle.
    pub bundle: String,
    pub location: Location,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildDetection>,
}

impl DetectionNode {
    /// Post-order name resolution: own name if resolved, otherwise the first
    /// named child's resolved name (plus suffix) for deferred placeholders.
    /// `None` when nothing in the subtree carries a name.
    pub fn resolved_name(&self) -> Option<String> {
        match &self.name {
            NameResolution::Resolved { name } => Some(name.clone()),
            NameResolution::Unnamed => None,
            NameResolution::Deferred { suffix } => {
                let child = self
                    .children
                    .iter()
                    .find_map(|c| c.node.resolved_name())?;
                Some(match suffix {
                    Some(suffix) => format!("{child} {suffix}"),
                    None => child,
                })
            }
        }
    }
}
