// ============================================================
// COLUMN SCHEMA
// ============================================================
// Ordered column names plus the declared type of each column

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::domain::error::{AppError, Result};

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Raw text, no coercion. Every provisional column starts here.
    #[default]
    Text,
    Integer,
    Float,
    Boolean,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Text => write!(f, "text"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Column names (unique, order-significant) with a declared type per name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    columns: Vec<String>,
    types: HashMap<String, ColumnType>,
}

impl ColumnSchema {
    /// Build a provisional schema: every column is declared `Text`.
    pub fn provisional(columns: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "Duplicate column name in header: '{}'",
                    name
                )));
            }
        }

        let types = columns
            .iter()
            .map(|name| (name.clone(), ColumnType::Text))
            .collect();

        Ok(Self { columns, types })
    }

    /// Narrow declared types using externally supplied hints.
    /// Columns missing from `hints` keep their current type.
    pub fn refine(mut self, hints: &HashMap<String, ColumnType>) -> Self {
        for (name, column_type) in hints {
            match self.types.get_mut(name) {
                Some(slot) => *slot = *column_type,
                None => tracing::debug!(column = %name, "Type hint names an unknown column, ignored"),
            }
        }
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.types.get(name).copied()
    }

    /// Declared types in column order
    pub fn ordered_types(&self) -> Vec<ColumnType> {
        self.columns
            .iter()
            .map(|name| self.types.get(name).copied().unwrap_or_default())
            .collect()
    }
}

/// Make raw header names usable as unique column names. Blank names become
/// `Unnamed: <index>`; repeats get a numeric suffix (`x`, `x.1`, `x.2`).
pub fn normalize_header<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();

    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let mut name = if name.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                name
            };

            // A suffixed name may itself be taken, so keep going until free
            let mut seen = counts.get(&name).copied().unwrap_or(0);
            while seen > 0 {
                counts.insert(name.clone(), seen + 1);
                name = format!("{}.{}", name, seen);
                seen = counts.get(&name).copied().unwrap_or(0);
            }
            counts.insert(name.clone(), 1);
            name
        })
        .collect()
}
