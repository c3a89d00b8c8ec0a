//! Per-column sequence reconciliation.
//!
//! For one `(table, column)` pair, [`ColumnInformation`] looks at three
//! sequences:
//!
//! - the one a Django-style naming convention expects: `{table}_{column}_seq`
//! - the one the column default actually calls `nextval()` on
//! - the one Postgres considers owned by the column (`pg_get_serial_sequence`)
//!
//! and turns their differences into [`Repair`]s.
//!
//! ## Decision procedure
//!
//! ```text
//! current default unknown            -> nothing (warn)
//! neither expected nor current exist -> nothing (error, dangling)
//! expected == current                -> nothing, or error if it doesn't exist
//! expected missing                   -> RENAME current TO expected, SET DEFAULT
//! expected exists                    -> SET DEFAULT, setval() resync
//! no owned sequence                  -> + OWNED BY
//! ```
//!
//! Renaming is preferred when possible: it keeps the sequence's current value.
//! When an unrelated sequence already sits in the conventional slot, it gets
//! resynchronized to the column's maximum before use.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, error, warn};

use crate::sql::split_qualified;
use crate::{Catalog, Error, Repair, Result, Sequence};

static NEXTVAL_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^nextval\(+'((?:[^']|'')+)'").expect("valid regex"));

/// Sequence wiring of one column.
pub struct ColumnInformation<'a, C: Catalog> {
    catalog: &'a C,
    table: &'a str,
    column: &'a str,
}

impl<'a, C: Catalog> ColumnInformation<'a, C> {
    pub fn new(catalog: &'a C, table: &'a str, column: &'a str) -> Self {
        Self {
            catalog,
            table,
            column,
        }
    }

    pub fn table(&self) -> &str {
        self.table
    }

    pub fn column(&self) -> &str {
        self.column
    }

    pub fn sequence_expected_by_convention(&self) -> Sequence {
        Sequence::new(format!("{}_{}_seq", self.table, self.column))
    }

    /// The sequence Postgres has recorded as owned by this column, if any.
    pub async fn sequence_declared_by_engine(&self) -> Result<Option<Sequence>> {
        let name = self.catalog.serial_sequence(self.table, self.column).await?;
        Ok(name.map(Sequence::new))
    }

    /// The sequence the column default calls `nextval()` on.
    ///
    /// Returns `None` when the column has no such default, or when the
    /// catalog reports more than one. Fails with [`Error::MalformedDefault`]
    /// when the default mentions `nextval` but isn't a plain call to it.
    pub async fn sequence_currently_referenced(&self) -> Result<Option<Sequence>> {
        let defaults = self
            .catalog
            .nextval_defaults(self.table, self.column)
            .await?;

        let [expr] = defaults.as_slice() else {
            debug!(
                table = self.table,
                column = self.column,
                found = defaults.len(),
                "expected exactly one nextval default"
            );
            return Ok(None);
        };

        match parse_nextval_default(expr) {
            Some(name) => Ok(Some(Sequence::new(name))),
            None => Err(Error::MalformedDefault {
                table: self.table.to_string(),
                column: self.column.to_string(),
                expr: expr.clone(),
            }),
        }
    }

    /// Work out what, if anything, is wrong with this column's sequence and
    /// return the statements that fix it, in the order they must run.
    pub async fn build_repairs(&self) -> Result<Vec<Repair>> {
        let mut repairs = Vec::new();

        let expected = self.sequence_expected_by_convention();
        let Some(current) = self.sequence_currently_referenced().await? else {
            warn!(
                table = self.table,
                column = self.column,
                "could not determine the sequence in use, table or column missing?"
            );
            return Ok(repairs);
        };

        let expected_exists = expected.exists(self.catalog).await?;
        let current_exists = current.exists(self.catalog).await?;

        if !expected_exists && !current_exists {
            let similar = expected.find_similar_by_suffix(self.catalog).await?;
            error!(
                table = self.table,
                column = self.column,
                similar = ?similar,
                "neither the current sequence {} nor the expected sequence {} exists",
                current,
                expected
            );
            return Ok(repairs);
        }

        // The sequence the default points at once the repairs below have run.
        let target = if expected == current {
            if !current_exists {
                error!(
                    table = self.table,
                    column = self.column,
                    "current sequence {} does not exist",
                    current
                );
                return Ok(repairs);
            }
            debug!(table = self.table, column = self.column, "{} matches convention", current);
            current
        } else if !expected_exists {
            warn!(
                table = self.table,
                column = self.column,
                "expected sequence {} does not exist, renaming {} into place",
                expected,
                current
            );
            repairs.push(Repair::RenameSequence {
                from: current.name.clone(),
                to: expected.name.clone(),
            });
            repairs.push(self.set_default(&expected));
            expected
        } else {
            warn!(
                table = self.table,
                column = self.column,
                "expected sequence {} exists but the default uses {}, switching and resyncing",
                expected,
                current
            );
            repairs.push(self.set_default(&expected));
            repairs.push(Repair::ResyncSequence {
                sequence: expected.name.clone(),
                table: self.table.to_string(),
                column: self.column.to_string(),
            });
            expected
        };

        if self.sequence_declared_by_engine().await?.is_none() {
            warn!(
                table = self.table,
                column = self.column,
                "no sequence is owned by this column, binding {}",
                target
            );
            repairs.push(Repair::SetOwner {
                sequence: target.name,
                table: self.table.to_string(),
                column: self.column.to_string(),
            });
        }

        Ok(repairs)
    }

    /// Same as [`build_repairs`](Self::build_repairs), rendered to SQL.
    pub async fn build_repair_statements(&self) -> Result<Vec<String>> {
        let repairs = self.build_repairs().await?;
        Ok(repairs.iter().map(Repair::to_sql).collect())
    }

    fn set_default(&self, sequence: &Sequence) -> Repair {
        Repair::SetDefault {
            table: self.table.to_string(),
            column: self.column.to_string(),
            sequence: sequence.name.clone(),
        }
    }
}

/// Extract the sequence name from a `nextval('...'::regclass)` default as
/// printed by `pg_get_expr`.
///
/// The schema qualifier is dropped and quoting is removed. Returns `None` if
/// the expression doesn't start with a `nextval` call on a string literal.
pub fn parse_nextval_default(expr: &str) -> Option<String> {
    let captures = NEXTVAL_DEFAULT.captures(expr.trim())?;
    let literal = captures[1].replace("''", "'");
    let (_schema, name) = split_qualified(&literal);
    Some(name)
}
