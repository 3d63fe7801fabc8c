use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "cbom-scan")]
#[command(
    about = "Build a Cryptography Bill of Materials from source code",
    long_about = None
)]
pub struct Args {
    /// Path to a Java file or directory to analyze
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Additional rule bundle file (JSON or YAML). Can be given repeatedly.
    #[arg(long, value_name = "FILE")]
    pub rules: Vec<PathBuf>,

    /// Skip the rule bundles shipped with the tool
    #[arg(long)]
    pub no_bundled: bool,

    /// Output file path (prints to stdout if not specified)
    #[arg(short = 'O', long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        validate_path(&self.path)?;
        for rules_path in &self.rules {
            if !rules_path.exists() {
                anyhow::bail!("Rules file does not exist: {}", rules_path.display());
            }
        }
        if self.no_bundled && self.rules.is_empty() {
            anyhow::bail!("--no-bundled requires at least one --rules file");
        }
        Ok(())
    }
}

pub fn validate_path(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }
    Ok(())
}
