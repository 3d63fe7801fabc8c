mod imports;
pub mod java;

pub use imports::ImportMap;
pub use java::{parse_java, JavaCallSite, JavaFile};

use crate::cbom::AssetGraph;
use crate::engine::{DetectionNode, Matcher};
use crate::error::{IoError, Result};
use crate::rule::RuleRegistry;
use std::path::Path;
use tracing::{debug, trace, warn};
use tree_sitter::Node;
use walkdir::WalkDir;

/// Aggregate result of scanning a path: every file's detections folded into
/// one asset graph.
pub struct ScanReport {
    pub files_scanned: usize,
    pub graph: AssetGraph,
}

/// Drives the bundled Java host: file discovery, parsing, matching, and
/// folding. Files are matched independently; the asset graph is the single
/// shared-mutation point and folds are applied serially.
pub struct Scanner<'r> {
    matcher: Matcher<'r>,
}

impl<'r> Scanner<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self {
            matcher: Matcher::new(registry),
        }
    }

    /// Match every call and construction site in one source file.
    ///
    /// An inner construction can surface both as a dependent child and as a
    /// top-level detection here; both fold to the same asset id and
    /// occurrence, so the aggregate is unaffected.
    pub fn scan_source(&self, source: &str, path: &str) -> Result<Vec<DetectionNode>> {
        let tree = parse_java(source, path)?;
        let file = JavaFile::new(&tree, source.as_bytes(), path);

        let mut candidates = Vec::new();
        collect_call_sites(tree.root_node(), &mut candidates);
        trace!(path, candidates = candidates.len(), "collected call sites");

        let detections: Vec<DetectionNode> = candidates
            .into_iter()
            .filter_map(|node| self.matcher.match_node(&file.call_site(node)))
            .collect();
        debug!(path, detections = detections.len(), "scanned file");
        Ok(detections)
    }

    /// Scan a file or directory tree and fold everything into one graph.
    /// Unparseable files are reported and skipped; a broken file must not
    /// poison the rest of the scan.
    pub fn scan_path(&self, path: impl AsRef<Path>) -> Result<ScanReport> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IoError::path_not_found(path).into());
        }

        let mut graph = AssetGraph::new();
        let mut files_scanned = 0;

        for file_path in java_files(path) {
            let source = match std::fs::read_to_string(&file_path) {
                Ok(source) => source,
                Err(e) => {
                    warn!(path = %file_path.display(), error = %e, "skipping unreadable file");
                    continue;
                }
            };
            let path_str = file_path.to_string_lossy();
            match self.scan_source(&source, &path_str) {
                Ok(detections) => {
                    files_scanned += 1;
                    for detection in &detections {
                        graph.fold(detection);
                    }
                }
                Err(e) => warn!(path = %path_str, error = %e, "skipping unparseable file"),
            }
        }

        debug!(files_scanned, assets = graph.len(), "scan complete");
        Ok(ScanReport {
            files_scanned,
            graph,
        })
    }
}

fn java_files(path: &Path) -> Vec<std::path::PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    // Depth 0 is the directory the caller asked for; the hidden/build
    // filter only applies below it.
    let mut files: Vec<_> = WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_or_build(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("java"))
        .collect();
    // Stable file order keeps logs and reruns comparable; the graph itself
    // is order-independent.
    files.sort();
    files
}

fn is_hidden_or_build(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.') || name == "target" || name == "build")
        .unwrap_or(false)
}

fn collect_call_sites<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    if matches!(
        node.kind(),
        "object_creation_expression" | "method_invocation"
    ) {
        out.push(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_call_sites(child, out);
    }
}
