// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Line tokenizing, validation, quarantine, and bulk table parsing

pub mod line_reader;
pub mod line_tokenizer;
pub mod line_validator;
pub mod quarantine_writer;
pub mod schema_prober;
pub mod table_reader;

pub use line_reader::{resolve_encoding, EncodedLines};
pub use line_tokenizer::LineTokenizer;
pub use line_validator::{LineValidator, ScanSummary};
pub use quarantine_writer::{QuarantineReport, QuarantineWriter};
pub use schema_prober::SchemaProber;
pub use table_reader::{CsvChunks, TableReader};
