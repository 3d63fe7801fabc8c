pub mod context;
pub mod value;

pub use context::ContextKind;
pub use value::{SizeUnit, Value};
