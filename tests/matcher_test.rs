//! Matching engine integration tests over the in-memory AST:
//! determinism, wildcard arity, tie-breaks, dependent resolution, and
//! placeholder naming.

mod common;

use cbom_scan::model::ContextKind;
use cbom_scan::rule::{ParamPosition, RuleSpec, ValueAction};
use cbom_scan::{Matcher, RuleRegistry, SizeUnit};
use common::FakeNode;
use pretty_assertions::assert_eq;

fn aes_rule() -> RuleSpec {
    RuleSpec::builder()
        .for_type("Lib.AesEngine")
        .constructor()
        .with_any_parameters()
        .named("AES")
        .in_context(ContextKind::BlockCipher)
        .build()
}

fn registry_with(rules: Vec<RuleSpec>) -> RuleRegistry {
    let mut registry = RuleRegistry::new();
    registry.register_all(rules, "test").unwrap();
    registry
}

#[test]
fn test_matching_is_deterministic() {
    let registry = registry_with(vec![aes_rule()]);
    let matcher = Matcher::new(&registry);
    let node = FakeNode::construction("Lib.AesEngine", vec![]);

    let first = matcher.match_node(&node).unwrap();
    let second = matcher.match_node(&node).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_wildcard_pattern_requires_prefix() {
    let rule = RuleSpec::builder()
        .for_type("Lib.Engine")
        .constructor()
        .with_parameter("int")
        .with_any_parameters()
        .named("E")
        .build();
    let registry = registry_with(vec![rule]);
    let matcher = Matcher::new(&registry);

    // [int, *] accepts one or more arguments with an int first...
    let one = FakeNode::construction("Lib.Engine", vec![(Some("int"), FakeNode::int(1))]);
    assert!(matcher.match_node(&one).is_some());

    let two = FakeNode::construction(
        "Lib.Engine",
        vec![
            (Some("int"), FakeNode::int(1)),
            (Some("boolean"), FakeNode::int(0)),
        ],
    );
    assert!(matcher.match_node(&two).is_some());

    // ...and rejects zero arguments.
    let zero = FakeNode::construction("Lib.Engine", vec![]);
    assert!(matcher.match_node(&zero).is_none());
}

#[test]
fn test_single_constructor_rule_scenario() {
    let rule = RuleSpec::builder()
        .for_type("Lib.FooEngine")
        .constructor()
        .named("FOO")
        .in_context(ContextKind::Cipher)
        .build();
    let registry = registry_with(vec![rule]);
    let matcher = Matcher::new(&registry);

    let node = FakeNode::construction("Lib.FooEngine", vec![]).at("A.java", 12);
    let detection = matcher.match_node(&node).unwrap();

    assert_eq!(detection.resolved_name(), Some("FOO".to_string()));
    assert_eq!(detection.context, ContextKind::Cipher);
    assert_eq!(detection.location.line, 12);
    assert!(detection.children.is_empty());
}

#[test]
fn test_wrapper_name_resolves_through_child() {
    let wrap = RuleSpec::builder()
        .for_type("Lib.Wrap")
        .constructor()
        .with_parameter("Lib.BlockCipher")
        .named_by_child(Some("Wrap"))
        .in_context(ContextKind::WrapRfc)
        .depending_on(ParamPosition::Index(0), vec![aes_rule()])
        .build();
    let registry = registry_with(vec![wrap]);
    let matcher = Matcher::new(&registry);

    let inner = FakeNode::construction("Lib.AesEngine", vec![]);
    let node = FakeNode::construction("Lib.Wrap", vec![(Some("Lib.BlockCipher"), inner)]);

    let detection = matcher.match_node(&node).unwrap();
    assert_eq!(detection.resolved_name(), Some("AES Wrap".to_string()));
}

#[test]
fn test_wrapper_name_stays_unresolved_without_child() {
    let wrap = RuleSpec::builder()
        .for_type("Lib.Wrap")
        .constructor()
        .with_parameter("Lib.BlockCipher")
        .named_by_child(Some("Wrap"))
        .in_context(ContextKind::WrapRfc)
        .depending_on(ParamPosition::Index(0), vec![aes_rule()])
        .build();
    let registry = registry_with(vec![wrap]);
    let matcher = Matcher::new(&registry);

    let inner = FakeNode::construction("Lib.UnknownEngine", vec![]);
    let node = FakeNode::construction("Lib.Wrap", vec![(Some("Lib.BlockCipher"), inner)]);

    let detection = matcher.match_node(&node).unwrap();
    assert_eq!(detection.resolved_name(), None);
}

#[test]
fn test_dependent_resolution_is_scoped_to_declared_rules() {
    // DES is registered globally but not in the wrapper's dependent list,
    // so the wrapper must not pick it up.
    let des = RuleSpec::builder()
        .for_type("Lib.DesEngine")
        .constructor()
        .named("DES")
        .in_context(ContextKind::BlockCipher)
        .build();
    let wrap = RuleSpec::builder()
        .for_type("Lib.Wrap")
        .constructor()
        .with_parameter("Lib.BlockCipher")
        .named_by_child(None)
        .in_context(ContextKind::WrapRfc)
        .depending_on(ParamPosition::Index(0), vec![aes_rule()])
        .build();
    let registry = registry_with(vec![wrap, des]);
    let matcher = Matcher::new(&registry);

    let inner = FakeNode::construction("Lib.DesEngine", vec![]);
    let node = FakeNode::construction("Lib.Wrap", vec![(Some("Lib.BlockCipher"), inner)]);

    let detection = matcher.match_node(&node).unwrap();
    assert!(detection.children.is_empty());
}

#[test]
fn test_enclosing_position_matches_parent() {
    let builder_rule = RuleSpec::builder()
        .for_type("Lib.CipherBuilder")
        .constructor()
        .named("Builder")
        .in_context(ContextKind::Cipher)
        .build();
    let chained = RuleSpec::builder()
        .for_type("Lib.CipherBuilder")
        .method_invocation()
        .for_method("withPadding")
        .named("PKCS7")
        .in_context(ContextKind::Padding)
        .depending_on(ParamPosition::Enclosing, vec![builder_rule])
        .build();
    let registry = registry_with(vec![chained]);
    let matcher = Matcher::new(&registry);

    let receiver = FakeNode::construction("Lib.CipherBuilder", vec![]);
    let call = FakeNode::invocation("Lib.CipherBuilder", "withPadding", vec![]);
    receiver.adopt(&call);

    let detection = matcher.match_node(&call).unwrap();
    assert_eq!(detection.children.len(), 1);
    assert_eq!(detection.children[0].position, ParamPosition::Enclosing);
    assert_eq!(
        detection.children[0].node.resolved_name(),
        Some("Builder".to_string())
    );
}

#[test]
fn test_method_rule_extracts_string_literal() {
    let digest = RuleSpec::builder()
        .for_type("java.security.MessageDigest")
        .method_invocation()
        .for_method("getInstance")
        .with_parameter("java.lang.String")
        .with_any_parameters()
        .detected_as(ValueAction::StringLiteral { position: 0 })
        .in_context(ContextKind::Digest)
        .build();
    let registry = registry_with(vec![digest]);
    let matcher = Matcher::new(&registry);

    let node = FakeNode::invocation(
        "java.security.MessageDigest",
        "getInstance",
        vec![(Some("java.lang.String"), FakeNode::string("SHA-256"))],
    );
    let detection = matcher.match_node(&node).unwrap();
    assert_eq!(detection.resolved_name(), Some("SHA-256".to_string()));

    // Same target type, wrong method name.
    let other = FakeNode::invocation(
        "java.security.MessageDigest",
        "isEqual",
        vec![(Some("java.lang.String"), FakeNode::string("SHA-256"))],
    );
    assert!(matcher.match_node(&other).is_none());
}

#[test]
fn test_size_action_with_byte_unit() {
    let rule = RuleSpec::builder()
        .for_type("Lib.Engine")
        .constructor()
        .with_parameter("int")
        .detected_as(ValueAction::Size {
            position: 0,
            unit: SizeUnit::Byte,
            property: "keySize".to_string(),
        })
        .in_context(ContextKind::SecretKey)
        .build();
    let registry = registry_with(vec![rule]);
    let matcher = Matcher::new(&registry);

    let node = FakeNode::construction("Lib.Engine", vec![(Some("int"), FakeNode::int(32))]);
    let detection = matcher.match_node(&node).unwrap();
    assert_eq!(detection.value, cbom_scan::Value::bytes(32));
    assert_eq!(detection.property.as_deref(), Some("keySize"));
}

#[test]
fn test_nested_wrappers_recurse() {
    // Wrap(Wrap(AES)) — dependent lists may themselves carry dependents.
    let inner_wrap = RuleSpec::builder()
        .for_type("Lib.Wrap")
        .constructor()
        .with_parameter("Lib.BlockCipher")
        .named_by_child(Some("Wrap"))
        .in_context(ContextKind::WrapRfc)
        .depending_on(ParamPosition::Index(0), vec![aes_rule()])
        .build();
    let outer_wrap = RuleSpec::builder()
        .for_type("Lib.Wrap")
        .constructor()
        .with_parameter("Lib.BlockCipher")
        .named_by_child(Some("Wrap"))
        .in_context(ContextKind::WrapRfc)
        .depending_on(ParamPosition::Index(0), vec![inner_wrap])
        .build();
    let registry = registry_with(vec![outer_wrap]);
    let matcher = Matcher::new(&registry);

    let aes = FakeNode::construction("Lib.AesEngine", vec![]);
    let inner = FakeNode::construction("Lib.Wrap", vec![(Some("Lib.BlockCipher"), aes)]);
    let outer = FakeNode::construction("Lib.Wrap", vec![(Some("Lib.BlockCipher"), inner)]);

    let detection = matcher.match_node(&outer).unwrap();
    assert_eq!(detection.resolved_name(), Some("AES Wrap Wrap".to_string()));
    assert_eq!(detection.children[0].node.children.len(), 1);
}
