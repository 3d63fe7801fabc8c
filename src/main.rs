use anyhow::{Context, Result};
use cbom_scan::cli;
use cbom_scan::error::IoError;
use cbom_scan::logging::{self, Verbosity};
use cbom_scan::output::CbomFormatter;
use cbom_scan::rule::{RuleLoader, RuleRegistry};
use cbom_scan::scanner::Scanner;
use clap::Parser;
use tracing::info;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    logging::init(Verbosity::from_flags(args.verbose, args.quiet));
    args.validate().context("Invalid arguments")?;

    let mut registry = if args.no_bundled {
        RuleRegistry::new()
    } else {
        RuleLoader::from_bundled().context("Failed to load bundled rules")?
    };
    for rules_path in &args.rules {
        RuleLoader::load_file(&mut registry, rules_path)
            .with_context(|| format!("Failed to load rules from {}", rules_path.display()))?;
    }
    info!(rules = registry.rule_count(), "rule registry ready");

    let scanner = Scanner::new(&registry);
    let report = scanner
        .scan_path(&args.path)
        .with_context(|| format!("Failed to scan {}", args.path.display()))?;
    info!(
        files = report.files_scanned,
        assets = report.graph.len(),
        "scan finished"
    );

    let json = CbomFormatter::format(report)?;
    match &args.output_file {
        Some(path) => {
            std::fs::write(path, json).map_err(|e| IoError::write_error(path, e))?
        }
        None => println!("{json}"),
    }

    Ok(())
}
