pub mod ast;
pub mod detection;

pub use ast::{Location, SourceNode};
pub use detection::{ChildDetection, DetectionNode, NameResolution};

use crate::model::Value;
use crate::rule::{ParamPosition, RuleRegistry, RuleSpec, ValueAction};
use tracing::trace;

/// The matching engine.
///
/// Pure tree traversal against an immutable registry: for a fixed registry
/// and a fixed input tree the result is the same on every run. Borrows the
/// registry, so one registry can serve parallel per-file scans.
pub struct Matcher<'r> {
    registry: &'r RuleRegistry,
}

impl<'r> Matcher<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self { registry }
    }

    /// Match one call/construction site against the registry.
    ///
    /// Candidates are tried in registration order; the first whose shape
    /// matches wins and no later candidate is considered, even if it would
    /// also match. Nodes without type information never match.
    pub fn match_node<N: SourceNode>(&self, node: &N) -> Option<DetectionNode> {
        let kind = node.construct_kind()?;
        let target = node.target_type()?;

        let selected = self
            .registry
            .lookup(&target, kind)
            .find(|registered| Self::shape_matches(&registered.spec, node))?;

        trace!(type_name = %target, context = %selected.spec.context, "rule matched");
        Some(self.apply(&selected.spec, &selected.bundle, node))
    }

    /// Match against an explicit rule list instead of the registry. Used for
    /// dependent resolution, which is scoped to exactly the rules declared
    /// relevant to one parameter position.
    fn match_scoped<N: SourceNode>(
        &self,
        node: &N,
        rules: &[RuleSpec],
        bundle: &str,
    ) -> Option<DetectionNode> {
        let kind = node.construct_kind()?;
        let target = node.target_type()?;

        let selected = rules
            .iter()
            .filter(|spec| spec.construct_kind == kind)
            .filter(|spec| spec.target_types.iter().any(|t| t == &target))
            .find(|spec| Self::shape_matches(spec, node))?;

        Some(self.apply(selected, bundle, node))
    }

    /// Shape check: arity must agree (a terminal wildcard accepts any length
    /// at least the prefix length), and every concrete position's declared
    /// type must be assignable from the actual argument's static type.
    fn shape_matches<N: SourceNode>(spec: &RuleSpec, node: &N) -> bool {
        if !spec.methods.is_empty()
            && !node
                .method_name()
                .is_some_and(|name| spec.methods.contains(&name))
        {
            return false;
        }

        if !spec.pattern.accepts_arity(node.argument_count()) {
            return false;
        }

        spec.pattern.exact_prefix().all(|(index, declared)| {
            node.argument_type(index)
                .is_some_and(|actual| node.is_assignable(declared, &actual))
        })
    }

    fn apply<N: SourceNode>(&self, spec: &RuleSpec, bundle: &str, node: &N) -> DetectionNode {
        let (value, name, property) = Self::extract(spec, node);

        let mut children = Vec::new();
        for dependent in &spec.depends {
            let bound = match dependent.position {
                ParamPosition::Index(index) => node.argument(index),
                ParamPosition::Enclosing => node.enclosing(),
            };
            // Unmatched dependent positions contribute no child; most
            // arguments are plain data, not further crypto constructs.
            if let Some(expr) = bound {
                if let Some(detection) = self.match_scoped(&expr, &dependent.rules, bundle) {
                    children.push(ChildDetection {
                        position: dependent.position,
                        node: detection,
                    });
                }
            }
        }

        DetectionNode {
            context: spec.context,
            name,
            value,
            property,
            bundle: bundle.to_string(),
            location: node.location(),
            children,
        }
    }

    /// Apply the rule's extraction actions in order. Naming actions set the
    /// name; the value carries the last successful extraction, with a `Size`
    /// extraction also recording its property key. Failed extractions
    /// (missing literal, unrepresentable size) leave the previous state.
    fn extract<N: SourceNode>(
        spec: &RuleSpec,
        node: &N,
    ) -> (Value, NameResolution, Option<String>) {
        let mut value = Value::Unknown;
        let mut name = NameResolution::Unnamed;
        let mut property = None;

        for action in &spec.value_actions {
            match action {
                ValueAction::Constant { value: text } => {
                    name = NameResolution::Resolved { name: text.clone() };
                    if value.is_unknown() {
                        value = Value::constant(text.clone());
                    }
                }
                ValueAction::StringLiteral { position } => {
                    if let Some(text) =
                        node.argument(*position).and_then(|arg| arg.string_literal())
                    {
                        name = NameResolution::Resolved { name: text.clone() };
                        if value.is_unknown() {
                            value = Value::constant(text);
                        }
                    }
                }
                ValueAction::Size {
                    position,
                    unit,
                    property: key,
                } => {
                    let size = node
                        .argument(*position)
                        .and_then(|arg| arg.int_literal())
                        .and_then(|v| u64::try_from(v).ok());
                    if let Some(size) = size {
                        value = Value::Size {
                            value: size,
                            unit: *unit,
                        };
                        property = Some(key.clone());
                    }
                }
                ValueAction::DeferToChild { suffix } => {
                    name = NameResolution::Deferred {
                        suffix: suffix.clone(),
                    };
                }
            }
        }

        (value, name, property)
    }
}
