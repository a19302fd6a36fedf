mod raw_description;
mod report;

pub use raw_description::RawDescription;
pub use report::{Report, TranslatedReport, REPORT_FILE_STEM};
