use crate::cbom::Asset;
use crate::scanner::ScanReport;
use anyhow::Result;
use serde::Serialize;

/// Serializable shape of the final inventory. The asset graph defines the
/// content; this is the bundled JSON rendering of it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CbomOutput {
    pub cbom_version: &'static str,
    pub files_scanned: usize,
    pub total_assets: usize,
    pub assets: Vec<Asset>,
}

pub struct CbomFormatter;

impl CbomFormatter {
    pub fn build_output(report: ScanReport) -> CbomOutput {
        let files_scanned = report.files_scanned;
        let assets = report.graph.into_assets();
        CbomOutput {
            cbom_version: "1.0",
            files_scanned,
            total_assets: assets.len(),
            assets,
        }
    }

    pub fn format(report: ScanReport) -> Result<String> {
        let output = Self::build_output(report);
        Ok(serde_json::to_string_pretty(&output)?)
    }
}
