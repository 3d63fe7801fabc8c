mod formatter;

pub use formatter::{CbomFormatter, CbomOutput};
