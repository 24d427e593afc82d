use async_trait::async_trait;

use crate::error::Result;
use crate::types::{MotorwayConfig, RawRecord, RunReport};

/// Supplies the raw milestone nodes of one motorway
#[async_trait]
pub trait MilestoneSourcePort: Send + Sync {
    async fn fetch_milestones(&self, motorway: &MotorwayConfig) -> Result<Vec<RawRecord>>;
}

/// Receives the finished run report; returns where it was written
#[async_trait]
pub trait ReportOutputPort: Send + Sync {
    async fn write_report(&self, report: &RunReport) -> Result<String>;
}
