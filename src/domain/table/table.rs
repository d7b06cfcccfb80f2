// ============================================================
// TABLE TYPES
// ============================================================
// In-memory tabular structure produced by the importers

use serde::{Deserialize, Serialize};

use super::{ColumnSchema, ColumnType};

/// A single typed cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Value {
    /// Convert a raw field into the declared column type.
    /// An absent or empty field is `Null` regardless of type.
    pub fn parse(raw: Option<&str>, column_type: ColumnType) -> Result<Self, String> {
        let raw = match raw {
            Some(value) if !value.is_empty() => value,
            _ => return Ok(Value::Null),
        };

        match column_type {
            ColumnType::Text => Ok(Value::Text(raw.to_string())),
            ColumnType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| format!("'{}' is not an integer", raw)),
            ColumnType::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| format!("'{}' is not a float", raw)),
            ColumnType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Value::Boolean(true)),
                "false" | "0" | "no" => Ok(Value::Boolean(false)),
                _ => Err(format!("'{}' is not a boolean", raw)),
            },
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Column-named, typed rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column names in order
    pub columns: Vec<String>,

    /// Declared type per column, same order as `columns`
    pub types: Vec<ColumnType>,

    /// Rows; each has exactly `columns.len()` cells
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table shaped by `schema`
    pub fn new(schema: &ColumnSchema) -> Self {
        Self {
            columns: schema.columns().to_vec(),
            types: schema.ordered_types(),
            rows: Vec::new(),
        }
    }

    /// Convert raw fields into a typed row. The field count must match the
    /// column count.
    pub fn convert_row(&self, fields: &[Option<&str>]) -> Result<Vec<Value>, String> {
        if fields.len() != self.columns.len() {
            return Err(format!(
                "expected {} fields, found {}",
                self.columns.len(),
                fields.len()
            ));
        }

        fields
            .iter()
            .zip(self.types.iter())
            .zip(self.columns.iter())
            .map(|((field, column_type), column)| {
                Value::parse(*field, *column_type).map_err(|e| format!("column '{}': {}", column, e))
            })
            .collect()
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in the named column
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }
}
