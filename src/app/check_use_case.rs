use chrono::Utc;
use metrics::{counter, histogram};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::app::ports::{MilestoneSourcePort, ReportOutputPort};
use crate::error::Result;
use crate::pipeline::{
    merge_close_milestones, preprocess_records, retain_valid_distances, validate_milestones, MergeConfig,
};
use crate::types::{MotorwayConfig, MotorwayReport, RawRecord, RunReport};

/// Use case running the milestone check for a list of motorways
pub struct CheckMilestonesUseCase {
    /// Where raw milestone nodes come from
    source: Arc<dyn MilestoneSourcePort>,
    /// Where the finished report goes
    output: Arc<dyn ReportOutputPort>,
    merge_config: MergeConfig,
}

impl CheckMilestonesUseCase {
    pub fn new(source: Arc<dyn MilestoneSourcePort>, output: Arc<dyn ReportOutputPort>) -> Self {
        Self {
            source,
            output,
            merge_config: MergeConfig::default(),
        }
    }

    pub fn with_merge_config(mut self, merge_config: MergeConfig) -> Self {
        self.merge_config = merge_config;
        self
    }

    /// Check every motorway in order, one fetch at a time, then hand the report to the output port
    pub async fn run(&self, motorways: &[MotorwayConfig]) -> Result<RunReport> {
        info!("Checking milestones for {} motorways", motorways.len());

        let mut data = Vec::with_capacity(motorways.len());
        for motorway in motorways {
            data.push(self.check_motorway(motorway).await);
        }

        let report = RunReport {
            date: Utc::now(),
            data,
        };

        let location = self.output.write_report(&report).await?;
        info!("Wrote report for {} motorways to {}", report.data.len(), location);

        Ok(report)
    }

    /// Fetch and process a single motorway. A failed fetch yields an empty marker list.
    #[instrument(skip(self, motorway), fields(motorway = %motorway.name))]
    pub async fn check_motorway(&self, motorway: &MotorwayConfig) -> MotorwayReport {
        let t_fetch = std::time::Instant::now();
        let records = match self.source.fetch_milestones(motorway).await {
            Ok(records) => records,
            Err(e) => {
                error!("Fetching milestones for {} failed: {}", motorway.name, e);
                counter!("milestones_fetch_errors_total", "motorway" => motorway.name.clone()).increment(1);
                Vec::new()
            }
        };
        histogram!("milestones_fetch_duration_seconds", "motorway" => motorway.name.clone())
            .record(t_fetch.elapsed().as_secs_f64());

        process_records(motorway, &records, &self.merge_config)
    }
}

/// Run preprocess, NaN filter, merge and validation over already fetched records
pub fn process_records(
    motorway: &MotorwayConfig,
    records: &[RawRecord],
    merge_config: &MergeConfig,
) -> MotorwayReport {
    let name = motorway.name.clone();
    counter!("milestones_fetched_total", "motorway" => name.clone()).increment(records.len() as u64);
    debug!("Received {} milestone nodes for {}", records.len(), name);

    let mut markers = preprocess_records(records);
    let dropped = retain_valid_distances(&mut markers);
    if dropped > 0 {
        warn!("Dropped {} milestones of {} without a numeric distance", dropped, name);
        counter!("milestones_invalid_distance_total", "motorway" => name.clone()).increment(dropped as u64);
    }

    let summary = merge_close_milestones(&mut markers, merge_config);
    debug!(
        "Merged {} double posts on {} ({} lone, {} same-distance pairs too far apart)",
        summary.merged, name, summary.lone, summary.too_far
    );
    counter!("milestones_merged_total", "motorway" => name.clone()).increment(summary.merged as u64);

    let warnings = validate_milestones(markers, &motorway.ranges, motorway.are_doubles);
    info!(
        "{} missing {:?} dupes {:?} invalid {:?} single {:?}",
        name, warnings.missing, warnings.duplicated, warnings.out_of_range, warnings.single
    );
    counter!("milestones_findings_total", "motorway" => name.clone()).increment(warnings.finding_count() as u64);

    MotorwayReport {
        name,
        ranges: motorway.ranges.clone(),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MilestoneError;
    use crate::types::Range;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FailingSource;

    #[async_trait]
    impl MilestoneSourcePort for FailingSource {
        async fn fetch_milestones(&self, _motorway: &MotorwayConfig) -> Result<Vec<RawRecord>> {
            Err(MilestoneError::Overpass {
                status: 429,
                message: "rate limited".to_string(),
            })
        }
    }

    struct MockOutput {
        written: Mutex<Vec<RunReport>>,
    }

    #[async_trait]
    impl ReportOutputPort for MockOutput {
        async fn write_report(&self, report: &RunReport) -> Result<String> {
            self.written.lock().unwrap().push(report.clone());
            Ok("memory".to_string())
        }
    }

    fn record(id: u64, lat: f64, distance: &str) -> RawRecord {
        RawRecord {
            lat,
            lon: 24.0,
            id: id.to_string(),
            tags: HashMap::from([("distance".to_string(), distance.to_string())]),
        }
    }

    #[test]
    fn test_process_records_runs_all_stages() {
        let motorway = MotorwayConfig {
            name: "A1".to_string(),
            ranges: vec![Range::new(0, 3)],
            are_doubles: true,
        };
        let records = vec![
            record(1, 42.0, "0"),
            record(2, 42.1, "1"),
            record(3, 42.10005, "1"),
            record(4, 42.2, "junk"),
            record(5, 42.3, "40"),
        ];

        let report = process_records(&motorway, &records, &MergeConfig::default());

        assert_eq!(report.name, "A1");
        assert_eq!(report.ranges, vec![Range::new(0, 3)]);
        assert_eq!(report.warnings.milestones.len(), 3);
        assert_eq!(report.warnings.milestones[1].source_id, "2;3");
        assert_eq!(report.warnings.missing, vec![2]);
        assert_eq!(report.warnings.out_of_range, vec![40.0]);
        assert_eq!(report.warnings.single, vec![40.0]);
    }

    #[tokio::test]
    async fn test_failed_fetch_reports_empty_motorway() {
        let output = Arc::new(MockOutput {
            written: Mutex::new(Vec::new()),
        });
        let use_case = CheckMilestonesUseCase::new(Arc::new(FailingSource), output.clone());
        let motorways = vec![MotorwayConfig {
            name: "A2".to_string(),
            ranges: vec![Range::new(0, 2)],
            are_doubles: false,
        }];

        let report = use_case.run(&motorways).await.unwrap();

        assert_eq!(report.data.len(), 1);
        assert!(report.data[0].warnings.milestones.is_empty());
        assert_eq!(report.data[0].warnings.missing, vec![0, 1]);
        assert_eq!(output.written.lock().unwrap().len(), 1);
    }
}
