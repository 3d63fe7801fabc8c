/// Java host adapter: exposes tree-sitter-java call and construction nodes
/// through the engine's `SourceNode` capability trait.
///
/// Type information is best-effort syntactic. Constructed types and static
/// call receivers resolve through the file's import map; arguments are typed
/// from literal kinds and nested constructions. Anything unknown stays
/// untyped and simply fails to match.
use crate::engine::{Location, SourceNode};
use crate::error::ParserError;
use crate::rule::ConstructKind;
use crate::scanner::ImportMap;
use tree_sitter::{Node, Parser, Tree};

pub fn parse_java(source: &str, path: &str) -> Result<Tree, ParserError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|_| ParserError::language_setup_failed("java"))?;
    parser
        .parse(source, None)
        .ok_or_else(|| ParserError::parse_failed(path))
}

/// Per-file state shared by every call site adapted from one parse tree.
pub struct JavaFile<'a> {
    source: &'a [u8],
    path: String,
    imports: ImportMap,
}

impl<'a> JavaFile<'a> {
    pub fn new(tree: &'a Tree, source: &'a [u8], path: impl Into<String>) -> Self {
        let imports = collect_imports(tree.root_node(), source);
        Self {
            source,
            path: path.into(),
            imports,
        }
    }

    pub fn imports(&self) -> &ImportMap {
        &self.imports
    }

    fn text(&self, node: Node) -> String {
        String::from_utf8_lossy(&self.source[node.start_byte()..node.end_byte()]).to_string()
    }

    pub fn call_site(&'a self, node: Node<'a>) -> JavaCallSite<'a> {
        JavaCallSite { node, file: self }
    }

    /// Resolve a type name as written in source. Simple names follow Java's
    /// class-naming convention: a lowercase receiver is a variable, not a
    /// class, and stays unresolved.
    fn resolve_type(&self, written: &str) -> Option<String> {
        let base = written.split('<').next().unwrap_or(written).trim();
        if base.is_empty() {
            return None;
        }
        if !base.contains('.') && base.starts_with(|c: char| c.is_lowercase()) {
            return None;
        }
        self.imports.resolve(base)
    }
}

fn collect_imports(root: Node, source: &[u8]) -> ImportMap {
    let mut imports = ImportMap::new();
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() != "import_declaration" {
            continue;
        }
        let text = String::from_utf8_lossy(&source[child.start_byte()..child.end_byte()]);
        let spec = text
            .trim_start_matches("import")
            .trim_start()
            .trim_start_matches("static")
            .trim()
            .trim_end_matches(';')
            .trim();
        if let Some(package) = spec.strip_suffix(".*") {
            imports.insert_wildcard(package);
        } else if !spec.is_empty() {
            imports.insert(spec);
        }
    }
    imports
}

#[derive(Clone)]
pub struct JavaCallSite<'a> {
    node: Node<'a>,
    file: &'a JavaFile<'a>,
}

impl<'a> JavaCallSite<'a> {
    pub fn node(&self) -> Node<'a> {
        self.node
    }

    fn arguments(&self) -> Option<Node<'a>> {
        self.node.child_by_field_name("arguments")
    }

    fn argument_node(&self, index: usize) -> Option<Node<'a>> {
        self.arguments()?.named_child(index)
    }

    fn syntactic_type(&self, node: Node<'a>) -> Option<String> {
        match node.kind() {
            "string_literal" => Some("java.lang.String".to_string()),
            "decimal_integer_literal" | "hex_integer_literal" | "binary_integer_literal" => {
                Some("int".to_string())
            }
            "decimal_floating_point_literal" => Some("double".to_string()),
            "true" | "false" => Some("boolean".to_string()),
            "object_creation_expression" => self.file.call_site(node).target_type(),
            _ => None,
        }
    }
}

impl<'a> SourceNode for JavaCallSite<'a> {
    fn construct_kind(&self) -> Option<ConstructKind> {
        match self.node.kind() {
            "object_creation_expression" => Some(ConstructKind::Constructor),
            "method_invocation" => Some(ConstructKind::MethodInvocation),
            _ => None,
        }
    }

    fn target_type(&self) -> Option<String> {
        match self.node.kind() {
            "object_creation_expression" => {
                let type_node = self.node.child_by_field_name("type")?;
                self.file.resolve_type(&self.file.text(type_node))
            }
            "method_invocation" => {
                let object = self.node.child_by_field_name("object")?;
                self.file.resolve_type(&self.file.text(object))
            }
            _ => None,
        }
    }

    fn method_name(&self) -> Option<String> {
        if self.node.kind() != "method_invocation" {
            return None;
        }
        let name = self.node.child_by_field_name("name")?;
        Some(self.file.text(name))
    }

    fn argument_count(&self) -> usize {
        self.arguments()
            .map(|args| args.named_child_count())
            .unwrap_or(0)
    }

    fn argument_type(&self, index: usize) -> Option<String> {
        let arg = self.argument_node(index)?;
        self.syntactic_type(arg)
    }

    fn argument(&self, index: usize) -> Option<Self> {
        self.argument_node(index)
            .map(|node| self.file.call_site(node))
    }

    fn enclosing(&self) -> Option<Self> {
        let mut current = self.node.parent();
        while let Some(node) = current {
            if matches!(
                node.kind(),
                "object_creation_expression" | "method_invocation"
            ) {
                return Some(self.file.call_site(node));
            }
            current = node.parent();
        }
        None
    }

    fn string_literal(&self) -> Option<String> {
        if self.node.kind() != "string_literal" {
            return None;
        }
        let text = self.file.text(self.node);
        Some(text.trim_matches('"').to_string())
    }

    fn int_literal(&self) -> Option<i64> {
        let text = self
            .file
            .text(self.node)
            .replace('_', "")
            .trim_end_matches(['l', 'L'])
            .to_string();
        match self.node.kind() {
            "decimal_integer_literal" => text.parse().ok(),
            "hex_integer_literal" => {
                i64::from_str_radix(text.trim_start_matches("0x").trim_start_matches("0X"), 16).ok()
            }
            "binary_integer_literal" => {
                i64::from_str_radix(text.trim_start_matches("0b").trim_start_matches("0B"), 2).ok()
            }
            _ => None,
        }
    }

    /// Primitive and `java.lang.String` parameters must match exactly; for
    /// other reference types the adapter has no class hierarchy, so any
    /// reference-typed argument is accepted (an `AESEngine` argument
    /// satisfies a declared `BlockCipher`).
    fn is_assignable(&self, declared: &str, actual: &str) -> bool {
        if declared == actual {
            return true;
        }
        let declared_is_reference = declared.contains('.') && declared != "java.lang.String";
        let actual_is_reference = actual.contains('.') && actual != "java.lang.String";
        declared_is_reference && actual_is_reference
    }

    fn location(&self) -> Location {
        let pos = self.node.start_position();
        Location::new(self.file.path.clone(), pos.row + 1, pos.column + 1)
    }
}
