pub mod overpass;
pub mod report_writer;

pub use overpass::OverpassClient;
pub use report_writer::JsonReportWriter;
