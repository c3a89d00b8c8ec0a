//! The SQL script handed to the operator.

use std::fmt;

use crate::Repair;
use crate::sql::Ident;

/// Repairs for one column, run together in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRepair {
    pub table: String,
    pub column: String,
    pub repairs: Vec<Repair>,
}

/// Every repair found during an audit, in scan order.
///
/// Renders as a psql script: a `\c` line selecting the audited database,
/// then one `BEGIN;`/`COMMIT;` block per column. An empty script renders as
/// nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairScript {
    pub database: String,
    pub schema: String,
    pub columns: Vec<ColumnRepair>,
}

impl RepairScript {
    pub fn new(database: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column's repairs. Columns with nothing to fix are ignored.
    pub fn push(&mut self, table: &str, column: &str, repairs: Vec<Repair>) {
        if repairs.is_empty() {
            return;
        }
        self.columns.push(ColumnRepair {
            table: table.to_string(),
            column: column.to_string(),
            repairs,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Count total number of statements, excluding transaction boundaries.
    pub fn statement_count(&self) -> usize {
        self.columns.iter().map(|c| c.repairs.len()).sum()
    }

    /// The transaction blocks alone, without the psql connection directive.
    pub fn body(&self) -> String {
        let mut sql = String::new();
        for column in &self.columns {
            sql.push_str("BEGIN;\n");
            for repair in &column.repairs {
                sql.push_str(&repair.to_sql());
                sql.push('\n');
            }
            sql.push_str("COMMIT;\n");
        }
        sql
    }
}

impl fmt::Display for RepairScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        writeln!(f, "\\c {}", Ident(&self.database))?;
        if self.schema != "public" {
            writeln!(f, "SET search_path TO {};", Ident(&self.schema))?;
        }
        f.write_str(&self.body())
    }
}
