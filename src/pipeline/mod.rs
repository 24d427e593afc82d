// Milestone cleaning pipeline: preprocess -> filter -> merge -> validate

pub mod geo;
pub mod merge;
pub mod preprocess;
pub mod validate;

pub use merge::{merge_close_milestones, MergeConfig, MergeSummary};
pub use preprocess::{preprocess_records, retain_valid_distances};
pub use validate::{validate_milestones, ValidationReport};
