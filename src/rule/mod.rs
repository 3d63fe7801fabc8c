/// Declarative detection rules.
///
/// A rule describes one detectable shape: which target types it applies to,
/// whether it matches a constructor or a method invocation, the expected
/// parameter pattern, how to extract a semantic value from the matched node,
/// and which rules apply to specific argument positions (dependent rules,
/// used to detect composed constructs such as a key wrap built on a block
/// cipher). Rules are plain data so per-library rule tables can be loaded
/// from configuration files instead of being hardcoded.
pub mod loader;
pub mod registry;

pub use loader::RuleLoader;
pub use registry::{RegisteredRule, RuleRegistry};

use crate::error::ConfigurationError;
use crate::model::{ContextKind, SizeUnit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstructKind {
    Constructor,
    MethodInvocation,
}

/// One position matcher in a parameter pattern: a concrete type name or a
/// terminal wildcard accepting any remaining parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParamMatcher {
    Exact(String),
    Wildcard,
}

impl From<String> for ParamMatcher {
    fn from(s: String) -> Self {
        if s == "*" {
            Self::Wildcard
        } else {
            Self::Exact(s)
        }
    }
}

impl From<ParamMatcher> for String {
    fn from(m: ParamMatcher) -> Self {
        match m {
            ParamMatcher::Exact(t) => t,
            ParamMatcher::Wildcard => "*".to_string(),
        }
    }
}

/// Ordered parameter pattern. A wildcard, if present, must be the last
/// element; it accepts any number of trailing arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterPattern(pub Vec<ParamMatcher>);

impl ParameterPattern {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn has_wildcard(&self) -> bool {
        self.0.iter().any(|m| matches!(m, ParamMatcher::Wildcard))
    }

    /// Number of concrete (non-wildcard) positions.
    pub fn prefix_len(&self) -> usize {
        self.0
            .iter()
            .filter(|m| matches!(m, ParamMatcher::Exact(_)))
            .count()
    }

    /// Whether an argument list of the given length satisfies the arity
    /// requirement: equal length, or at least the prefix length when the
    /// pattern ends in a wildcard.
    pub fn accepts_arity(&self, actual: usize) -> bool {
        if self.has_wildcard() {
            actual >= self.prefix_len()
        } else {
            actual == self.0.len()
        }
    }

    /// Whether an argument index is within this pattern's declared bounds.
    /// A terminal wildcard extends the bounds to any index.
    pub fn admits_index(&self, index: usize) -> bool {
        self.has_wildcard() || index < self.0.len()
    }

    pub fn exact_prefix(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.iter().enumerate().filter_map(|(i, m)| match m {
            ParamMatcher::Exact(t) => Some((i, t.as_str())),
            ParamMatcher::Wildcard => None,
        })
    }

    fn wildcard_is_terminal(&self) -> bool {
        self.0
            .iter()
            .position(|m| matches!(m, ParamMatcher::Wildcard))
            .is_none_or(|pos| pos == self.0.len() - 1)
    }
}

/// Parameter position a dependent rule set is bound to: an argument index,
/// or the enclosing receiver expression for chained builder-style calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PositionRepr", into = "PositionRepr")]
pub enum ParamPosition {
    Index(usize),
    Enclosing,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PositionRepr {
    Index(usize),
    Name(String),
}

impl TryFrom<PositionRepr> for ParamPosition {
    type Error = String;

    fn try_from(repr: PositionRepr) -> Result<Self, Self::Error> {
        match repr {
            PositionRepr::Index(i) => Ok(Self::Index(i)),
            PositionRepr::Name(name) if name == "enclosing" => Ok(Self::Enclosing),
            PositionRepr::Name(name) => Err(format!(
                "invalid parameter position '{name}' (expected an index or \"enclosing\")"
            )),
        }
    }
}

impl From<ParamPosition> for PositionRepr {
    fn from(pos: ParamPosition) -> Self {
        match pos {
            ParamPosition::Index(i) => Self::Index(i),
            ParamPosition::Enclosing => Self::Name("enclosing".to_string()),
        }
    }
}

impl std::fmt::Display for ParamPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Enclosing => write!(f, "enclosing"),
        }
    }
}

/// One extraction step applied to a matched node.
///
/// Declarative so rule tables stay loadable from JSON/YAML. A rule carries
/// an ordered list of these: a naming action plus a `Size` action describes
/// a construct whose identity and parameters come from different arguments
/// (`DSTU7624Engine(128)` is named by the rule and sized by argument 0).
/// `DeferToChild` marks the name as a deliberate placeholder: the final
/// asset name is taken from the first matched dependent detection at fold
/// time, optionally suffixed (a generic RFC key wrap is only meaningfully
/// named once the cipher it wraps is known).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ValueAction {
    Constant {
        value: String,
    },
    StringLiteral {
        position: usize,
    },
    Size {
        position: usize,
        unit: SizeUnit,
        property: String,
    },
    DeferToChild {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        suffix: Option<String>,
    },
}

/// Rules scoped to one parameter position of an enclosing rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependentRules {
    pub position: ParamPosition,
    pub rules: Vec<RuleSpec>,
}

/// Immutable descriptor of one detectable shape. Registered once at startup
/// and read-only thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSpec {
    pub target_types: Vec<String>,
    pub construct_kind: ConstructKind,
    /// Method names this rule is restricted to; empty means any. Only
    /// meaningful for `MethodInvocation` rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(default)]
    pub pattern: ParameterPattern,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_actions: Vec<ValueAction>,
    pub context: ContextKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<DependentRules>,
}

impl RuleSpec {
    pub fn builder() -> RuleSpecBuilder {
        RuleSpecBuilder::new()
    }

    /// Fail-fast structural validation, applied at registration time.
    /// Recurses into dependent rule sets.
    pub fn validate(&self, bundle: &str) -> Result<(), ConfigurationError> {
        if self.target_types.is_empty() {
            return Err(ConfigurationError::empty_target_types(bundle));
        }

        if !self.pattern.wildcard_is_terminal() {
            return Err(ConfigurationError::wildcard_not_terminal(bundle));
        }

        for position in self.action_positions() {
            if !self.pattern.admits_index(position) {
                return Err(ConfigurationError::action_position_out_of_range(
                    bundle, position,
                ));
            }
        }

        for dependent in &self.depends {
            if let ParamPosition::Index(index) = dependent.position {
                if !self.pattern.admits_index(index) {
                    return Err(ConfigurationError::dependent_position_out_of_range(
                        bundle,
                        index,
                        self.pattern.0.len(),
                    ));
                }
            }
            for rule in &dependent.rules {
                rule.validate(bundle)?;
            }
        }

        Ok(())
    }

    fn action_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.value_actions.iter().filter_map(|action| match action {
            ValueAction::StringLiteral { position } => Some(*position),
            ValueAction::Size { position, .. } => Some(*position),
            _ => None,
        })
    }
}

/// Builder for authoring rules in code and tests.
#[derive(Debug, Default)]
pub struct RuleSpecBuilder {
    target_types: Vec<String>,
    construct_kind: Option<ConstructKind>,
    methods: Vec<String>,
    pattern: Vec<ParamMatcher>,
    value_actions: Vec<ValueAction>,
    context: ContextKind,
    depends: Vec<DependentRules>,
}

impl RuleSpecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_type(mut self, type_name: impl Into<String>) -> Self {
        self.target_types.push(type_name.into());
        self
    }

    pub fn for_types<I, S>(mut self, type_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_types
            .extend(type_names.into_iter().map(Into::into));
        self
    }

    pub fn constructor(mut self) -> Self {
        self.construct_kind = Some(ConstructKind::Constructor);
        self
    }

    pub fn method_invocation(mut self) -> Self {
        self.construct_kind = Some(ConstructKind::MethodInvocation);
        self
    }

    pub fn for_method(mut self, name: impl Into<String>) -> Self {
        self.methods.push(name.into());
        self
    }

    pub fn with_parameter(mut self, type_name: impl Into<String>) -> Self {
        self.pattern.push(ParamMatcher::Exact(type_name.into()));
        self
    }

    pub fn with_any_parameters(mut self) -> Self {
        self.pattern.push(ParamMatcher::Wildcard);
        self
    }

    pub fn detected_as(mut self, action: ValueAction) -> Self {
        self.value_actions.push(action);
        self
    }

    pub fn named(self, value: impl Into<String>) -> Self {
        self.detected_as(ValueAction::Constant {
            value: value.into(),
        })
    }

    pub fn named_by_child(self, suffix: Option<&str>) -> Self {
        self.detected_as(ValueAction::DeferToChild {
            suffix: suffix.map(str::to_string),
        })
    }

    pub fn in_context(mut self, context: ContextKind) -> Self {
        self.context = context;
        self
    }

    pub fn depending_on(mut self, position: ParamPosition, rules: Vec<RuleSpec>) -> Self {
        self.depends.push(DependentRules { position, rules });
        self
    }

    pub fn build(self) -> RuleSpec {
        RuleSpec {
            target_types: self.target_types,
            construct_kind: self.construct_kind.unwrap_or(ConstructKind::Constructor),
            methods: self.methods,
            pattern: ParameterPattern(self.pattern),
            value_actions: self.value_actions,
            context: self.context,
            depends: self.depends,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aes_engine_rule() -> RuleSpec {
        RuleSpec::builder()
            .for_type("org.bouncycastle.crypto.engines.AESEngine")
            .constructor()
            .named("AES")
            .in_context(ContextKind::BlockCipher)
            .build()
    }

    #[test]
    fn test_builder_basic_rule() {
        let rule = aes_engine_rule();
        assert_eq!(rule.construct_kind, ConstructKind::Constructor);
        assert_eq!(rule.context, ContextKind::BlockCipher);
        assert_eq!(
            rule.value_actions,
            vec![ValueAction::Constant {
                value: "AES".to_string()
            }]
        );
        assert!(rule.validate("test").is_ok());
    }

    #[test]
    fn test_validate_checks_every_action_position() {
        let rule = RuleSpec::builder()
            .for_type("Lib.Engine")
            .constructor()
            .with_parameter("int")
            .named("E")
            .detected_as(ValueAction::Size {
                position: 3,
                unit: crate::model::SizeUnit::Bit,
                property: "blockSize".to_string(),
            })
            .build();
        assert!(matches!(
            rule.validate("bundle"),
            Err(ConfigurationError::ActionPositionOutOfRange { position: 3, .. })
        ));
    }

    #[test]
    fn test_pattern_arity_exact() {
        let pattern = ParameterPattern(vec![
            ParamMatcher::Exact("int".to_string()),
            ParamMatcher::Exact("boolean".to_string()),
        ]);
        assert!(pattern.accepts_arity(2));
        assert!(!pattern.accepts_arity(1));
        assert!(!pattern.accepts_arity(3));
    }

    #[test]
    fn test_pattern_arity_wildcard() {
        let pattern = ParameterPattern(vec![
            ParamMatcher::Exact("int".to_string()),
            ParamMatcher::Wildcard,
        ]);
        assert!(pattern.accepts_arity(1));
        assert!(pattern.accepts_arity(5));
        assert!(!pattern.accepts_arity(0));
    }

    #[test]
    fn test_wildcard_only_pattern_accepts_zero() {
        let pattern = ParameterPattern(vec![ParamMatcher::Wildcard]);
        assert!(pattern.accepts_arity(0));
        assert!(pattern.accepts_arity(3));
    }

    #[test]
    fn test_validate_empty_target_types() {
        let rule = RuleSpec::builder().constructor().named("X").build();
        assert!(matches!(
            rule.validate("bundle"),
            Err(ConfigurationError::EmptyTargetTypes { .. })
        ));
    }

    #[test]
    fn test_validate_non_terminal_wildcard() {
        let rule = RuleSpec::builder()
            .for_type("Lib.Engine")
            .constructor()
            .with_any_parameters()
            .with_parameter("int")
            .build();
        assert!(matches!(
            rule.validate("bundle"),
            Err(ConfigurationError::WildcardNotTerminal { .. })
        ));
    }

    #[test]
    fn test_validate_dependent_position_out_of_range() {
        let rule = RuleSpec::builder()
            .for_type("Lib.Wrap")
            .constructor()
            .with_parameter("Lib.BlockCipher")
            .depending_on(ParamPosition::Index(2), vec![aes_engine_rule()])
            .build();
        assert!(matches!(
            rule.validate("bundle"),
            Err(ConfigurationError::DependentPositionOutOfRange { position: 2, .. })
        ));
    }

    #[test]
    fn test_validate_enclosing_position_always_in_range() {
        let rule = RuleSpec::builder()
            .for_type("Lib.Builder")
            .method_invocation()
            .depending_on(ParamPosition::Enclosing, vec![aes_engine_rule()])
            .build();
        assert!(rule.validate("bundle").is_ok());
    }

    #[test]
    fn test_validate_recurses_into_dependents() {
        let bad_child = RuleSpec::builder().constructor().named("X").build();
        let rule = RuleSpec::builder()
            .for_type("Lib.Wrap")
            .constructor()
            .with_parameter("Lib.BlockCipher")
            .depending_on(ParamPosition::Index(0), vec![bad_child])
            .build();
        assert!(matches!(
            rule.validate("bundle"),
            Err(ConfigurationError::EmptyTargetTypes { .. })
        ));
    }

    #[test]
    fn test_validate_wildcard_extends_dependent_bounds() {
        let rule = RuleSpec::builder()
            .for_type("Lib.Wrap")
            .constructor()
            .with_any_parameters()
            .depending_on(ParamPosition::Index(4), vec![aes_engine_rule()])
            .build();
        assert!(rule.validate("bundle").is_ok());
    }

    #[test]
    fn test_param_position_serde() {
        let idx: ParamPosition = serde_json::from_str("1").unwrap();
        assert_eq!(idx, ParamPosition::Index(1));
        let enc: ParamPosition = serde_json::from_str("\"enclosing\"").unwrap();
        assert_eq!(enc, ParamPosition::Enclosing);
        assert!(serde_json::from_str::<ParamPosition>("\"receiver\"").is_err());
    }

    #[test]
    fn test_rule_spec_round_trips_through_json() {
        let rule = RuleSpec::builder()
            .for_type("org.bouncycastle.crypto.engines.RFC3394WrapEngine")
            .constructor()
            .with_parameter("org.bouncycastle.crypto.BlockCipher")
            .named_by_child(Some("Wrap"))
            .in_context(ContextKind::WrapRfc)
            .depending_on(ParamPosition::Index(0), vec![aes_engine_rule()])
            .build();

        let json = serde_json::to_string(&rule).unwrap();
        let back: RuleSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(rule, back);
    }

    #[test]
    fn test_pattern_serde_uses_star_for_wildcard() {
        let pattern: ParameterPattern = serde_json::from_str(r#"["int", "*"]"#).unwrap();
        assert_eq!(
            pattern,
            ParameterPattern(vec![
                ParamMatcher::Exact("int".to_string()),
                ParamMatcher::Wildcard,
            ])
        );
    }
}
