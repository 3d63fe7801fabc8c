mod config;
mod io;
mod parser;
mod rules;

pub use config::ConfigurationError;
pub use io::IoError;
pub use parser::ParserError;
pub use rules::RulesError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    Io(#[from] IoError),
}

pub type Result<T> = std::result::Result<T, Error>;
