//! Raw-record ingestion from instrument exports.

mod parser;
mod source;

pub use parser::{ParserConfig, RecordParser};
pub use source::{Absorbance, RawRecord, SourceMetadata};
