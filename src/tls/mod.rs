pub mod record;
pub mod templates;

pub use record::{write_raw, ContentType, Record, RecordHeader, RecordReader};
