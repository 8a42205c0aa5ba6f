//! Continuous tabular data with named columns.

use std::collections::HashSet;

use causa_core::errors::DataError;
use causa_core::graph::Node;

/// Column-major continuous dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    variables: Vec<Node>,
    columns: Vec<Vec<f64>>,
}

impl DataSet {
    /// Build from named columns. Columns must be equally long and finite.
    pub fn from_columns(variables: Vec<Node>, columns: Vec<Vec<f64>>) -> Result<Self, DataError> {
        if variables.is_empty() {
            return Err(DataError::Empty);
        }
        let mut seen = HashSet::new();
        for v in &variables {
            if !seen.insert(v.name()) {
                return Err(DataError::DuplicateVariable(v.name().to_string()));
            }
        }
        if columns.len() != variables.len() {
            return Err(DataError::RaggedColumns {
                name: "<columns>".to_string(),
                expected: variables.len(),
                actual: columns.len(),
            });
        }
        let rows = columns[0].len();
        for (v, col) in variables.iter().zip(&columns) {
            if col.len() != rows {
                return Err(DataError::RaggedColumns {
                    name: v.name().to_string(),
                    expected: rows,
                    actual: col.len(),
                });
            }
            if let Some(row) = col.iter().position(|x| !x.is_finite()) {
                return Err(DataError::NonFinite {
                    name: v.name().to_string(),
                    row,
                });
            }
        }
        Ok(Self { variables, columns })
    }

    /// Build from row-major records.
    pub fn from_rows(variables: Vec<Node>, rows: &[Vec<f64>]) -> Result<Self, DataError> {
        let mut columns = vec![Vec::with_capacity(rows.len()); variables.len()];
        for (r, row) in rows.iter().enumerate() {
            if row.len() != variables.len() {
                return Err(DataError::RaggedColumns {
                    name: format!("row {r}"),
                    expected: variables.len(),
                    actual: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                columns[c].push(value);
            }
        }
        Self::from_columns(variables, columns)
    }

    pub fn variables(&self) -> &[Node] {
        &self.variables
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn sample_size(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn column(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }

    pub fn column_by_name(&self, name: &str) -> Result<&[f64], DataError> {
        self.variables
            .iter()
            .position(|v| v.name() == name)
            .map(|i| self.columns[i].as_slice())
            .ok_or_else(|| DataError::UnknownVariable(name.to_string()))
    }

    /// Keep only the named columns, in the given order.
    pub fn subset(&self, names: &[&str]) -> Result<Self, DataError> {
        let mut variables = Vec::with_capacity(names.len());
        let mut columns = Vec::with_capacity(names.len());
        for &name in names {
            let i = self
                .variables
                .iter()
                .position(|v| v.name() == name)
                .ok_or_else(|| DataError::UnknownVariable(name.to_string()))?;
            variables.push(self.variables[i].clone());
            columns.push(self.columns[i].clone());
        }
        Self::from_columns(variables, columns)
    }
}
