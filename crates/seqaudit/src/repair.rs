//! Repair statements suggested by the reconciliation.

use std::fmt;

use crate::sql::{Ident, regclass_lit};

/// A single corrective statement for one column's sequence wiring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    /// Rename the sequence the column currently uses into the conventional
    /// slot. Keeps its current value.
    RenameSequence { from: String, to: String },
    /// Point the column default at `nextval(sequence)`.
    SetDefault {
        table: String,
        column: String,
        sequence: String,
    },
    /// Move `sequence` past every value already present in `table.column`.
    ResyncSequence {
        sequence: String,
        table: String,
        column: String,
    },
    /// Mark `sequence` as owned by `table.column`.
    SetOwner {
        sequence: String,
        table: String,
        column: String,
    },
}

impl Repair {
    /// Generate the SQL statement for this repair.
    pub fn to_sql(&self) -> String {
        match self {
            Repair::RenameSequence { from, to } => {
                format!("ALTER SEQUENCE {} RENAME TO {};", Ident(from), Ident(to))
            }
            Repair::SetDefault {
                table,
                column,
                sequence,
            } => format!(
                "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT nextval({});",
                Ident(table),
                Ident(column),
                regclass_lit(sequence)
            ),
            // is_called is only true when the table already holds a value,
            // so an empty table starts at 1 rather than 2.
            Repair::ResyncSequence {
                sequence,
                table,
                column,
            } => format!(
                "SELECT setval({seq}, coalesce(max({col}), 1), max({col}) IS NOT NULL) FROM {table};",
                seq = regclass_lit(sequence),
                col = Ident(column),
                table = Ident(table),
            ),
            Repair::SetOwner {
                sequence,
                table,
                column,
            } => format!(
                "ALTER SEQUENCE {} OWNED BY {}.{};",
                Ident(sequence),
                Ident(table),
                Ident(column)
            ),
        }
    }
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
