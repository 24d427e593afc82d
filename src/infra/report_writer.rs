use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::app::ports::ReportOutputPort;
use crate::error::Result;
use crate::types::RunReport;

/// Writes the run report as a single JSON document
pub struct JsonReportWriter {
    path: PathBuf,
    pretty: bool,
}

impl JsonReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: false,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReportOutputPort for JsonReportWriter {
    async fn write_report(&self, report: &RunReport) -> Result<String> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };

        info!("Writing to {}", self.path.display());
        fs::write(&self.path, json)?;

        Ok(self.path.to_string_lossy().to_string())
    }
}
