// ============================================================
// TABLE DOMAIN LAYER
// ============================================================
// Core types for tabular import: schema, lines, typed rows
// No I/O

mod column_schema;
mod line;
#[allow(clippy::module_inception)]
mod table;

pub use column_schema::{normalize_header, ColumnSchema, ColumnType};
pub use line::{LineDefect, LineRecord, LineVerdict, TokenizedLine};
pub use table::{Table, Value};
