/// Semantic value extracted from a matched node.
///
/// A detection carries at most one extracted value: the display name of the
/// construct (a constant or a string literal from the call site) or a size
/// read from an integer literal. Values are immutable once produced.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    Bit,
    Byte,
}

impl SizeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bit => "bit",
            Self::Byte => "byte",
        }
    }
}

impl std::fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Value {
    Constant { text: String },
    Size { value: u64, unit: SizeUnit },
    Unknown,
}

impl Value {
    pub fn constant(text: impl Into<String>) -> Self {
        Self::Constant { text: text.into() }
    }

    pub fn bits(value: u64) -> Self {
        Self::Size {
            value,
            unit: SizeUnit::Bit,
        }
    }

    pub fn bytes(value: u64) -> Self {
        Self::Size {
            value,
            unit: SizeUnit::Byte,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The constant text, if this value carries one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Constant { text } => Some(text),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant { text } => write!(f, "{text}"),
            Self::Size { value, unit } => write!(f, "{value} {unit}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
