/// cbom-scan
///
/// A declarative detection rule engine for building a Cryptography Bill of
/// Materials: rules describe what a cryptographic construct usage looks
/// like, the matcher resolves them (including dependent rules bound to
/// argument positions) against syntax trees, and the aggregator folds every
/// detection into a deduplicated asset graph.
pub mod cbom;
pub mod cli;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod output;
pub mod rule;
pub mod scanner;

pub use cbom::{Asset, AssetGraph, AssetId};
pub use engine::{DetectionNode, Location, Matcher, SourceNode};
pub use model::{ContextKind, SizeUnit, Value};
pub use rule::{RuleLoader, RuleRegistry, RuleSpec};
