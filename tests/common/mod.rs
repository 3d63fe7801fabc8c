//! Shared in-memory AST for integration tests: hand-built call sites
//! implementing `SourceNode`, so matcher and aggregator behavior can be
//! exercised without a parser.
#![allow(dead_code)]

use cbom_scan::engine::Location;
use cbom_scan::rule::ConstructKind;
use cbom_scan::SourceNode;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone)]
pub struct FakeNode(Rc<FakeNodeData>);

pub struct FakeNodeData {
    kind: Option<ConstructKind>,
    target: Option<String>,
    method: Option<String>,
    args: Vec<FakeNode>,
    arg_types: Vec<Option<String>>,
    parent: RefCell<Option<FakeNode>>,
    string_lit: Option<String>,
    int_lit: Option<i64>,
    location: Location,
}

impl FakeNode {
    fn leaf() -> FakeNodeData {
        FakeNodeData {
            kind: None,
            target: None,
            method: None,
            args: Vec::new(),
            arg_types: Vec::new(),
            parent: RefCell::new(None),
            string_lit: None,
            int_lit: None,
            location: Location::new("fake.java", 1, 1),
        }
    }

    pub fn construction(target: &str, args: Vec<(Option<&str>, FakeNode)>) -> Self {
        let arg_types = args.iter().map(|(t, _)| t.map(str::to_string)).collect();
        Self(Rc::new(FakeNodeData {
            kind: Some(ConstructKind::Constructor),
            target: Some(target.to_string()),
            args: args.into_iter().map(|(_, n)| n).collect(),
            arg_types,
            ..Self::leaf()
        }))
    }

    pub fn invocation(target: &str, method: &str, args: Vec<(Option<&str>, FakeNode)>) -> Self {
        let arg_types = args.iter().map(|(t, _)| t.map(str::to_string)).collect();
        Self(Rc::new(FakeNodeData {
            kind: Some(ConstructKind::MethodInvocation),
            target: Some(target.to_string()),
            method: Some(method.to_string()),
            args: args.into_iter().map(|(_, n)| n).collect(),
            arg_types,
            ..Self::leaf()
        }))
    }

    pub fn string(value: &str) -> Self {
        Self(Rc::new(FakeNodeData {
            string_lit: Some(value.to_string()),
            ..Self::leaf()
        }))
    }

    pub fn int(value: i64) -> Self {
        Self(Rc::new(FakeNodeData {
            int_lit: Some(value),
            ..Self::leaf()
        }))
    }

    pub fn at(self, file: &str, line: usize) -> Self {
        let mut data = Rc::try_unwrap(self.0).unwrap_or_else(|_| panic!("node already shared"));
        data.location = Location::new(file, line, 1);
        Self(Rc::new(data))
    }

    /// Link `self` as the syntactic parent of `child`, for enclosing-position
    /// rules.
    pub fn adopt(&self, child: &FakeNode) {
        *child.0.parent.borrow_mut() = Some(self.clone());
    }
}

impl SourceNode for FakeNode {
    fn construct_kind(&self) -> Option<ConstructKind> {
        self.0.kind
    }

    fn target_type(&self) -> Option<String> {
        self.0.target.clone()
    }

    fn method_name(&self) -> Option<String> {
        self.0.method.clone()
    }

    fn argument_count(&self) -> usize {
        self.0.args.len()
    }

    fn argument_type(&self, index: usize) -> Option<String> {
        self.0.arg_types.get(index)?.clone()
    }

    fn argument(&self, index: usize) -> Option<Self> {
        self.0.args.get(index).cloned()
    }

    fn enclosing(&self) -> Option<Self> {
        self.0.parent.borrow().clone()
    }

    fn string_literal(&self) -> Option<String> {
        self.0.string_lit.clone()
    }

    fn int_literal(&self) -> Option<i64> {
        self.0.int_lit
    }

    fn location(&self) -> Location {
        self.0.location.clone()
    }
}
