/// The consumed AST abstraction.
///
/// The engine never parses source itself; a host supplies nodes implementing
/// this read-only capability interface. Missing information (no type, no
/// literal) means the node simply does not match, never an error.
use crate::rule::ConstructKind;
use serde::Serialize;

/// Source coordinates of a matched node. Ordered and hashable so occurrence
/// sets serialize deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Read-only view of one call or construction site.
///
/// `argument` and `enclosing` navigate to subexpressions and the syntactic
/// parent/receiver; recursion through them is structurally finite, so
/// matching needs no depth guard.
pub trait SourceNode: Clone {
    /// The shape of this node, if it is a call or construction at all.
    fn construct_kind(&self) -> Option<ConstructKind>;

    /// Fully-qualified static type name of the constructed object or call
    /// receiver. `None` when type information is unavailable.
    fn target_type(&self) -> Option<String>;

    /// Invoked method name, for `MethodInvocation` nodes.
    fn method_name(&self) -> Option<String> {
        None
    }

    fn argument_count(&self) -> usize;

    /// Best-effort static type of the argument at `index`.
    fn argument_type(&self, index: usize) -> Option<String>;

    /// The expression bound to the argument at `index`.
    fn argument(&self, index: usize) -> Option<Self>;

    /// The syntactic parent/receiver expression, for chained builder calls.
    fn enclosing(&self) -> Option<Self>;

    /// This node's value as a string literal, if it is one.
    fn string_literal(&self) -> Option<String>;

    /// This node's value as an integer literal, if it is one.
    fn int_literal(&self) -> Option<i64>;

    /// Whether a declared parameter type accepts an actual argument type.
    /// Hosts with real type hierarchies can widen this; the default is
    /// name equality.
    fn is_assignable(&self, declared: &str, actual: &str) -> bool {
        declared == actual
    }

    fn location(&self) -> Location;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = Location::new("src/Main.java", 14, 8);
        assert_eq!(loc.to_string(), "src/Main.java:14:8");
    }

    #[test]
    fn test_location_ordering_is_by_file_then_line() {
        let a = Location::new("a.java", 9, 1);
        let b = Location::new("a.java", 10, 1);
        let c = Location::new("b.java", 1, 1);
        assert!(a < b);
        assert!(b < c);
    }
}
