//! Whole-schema audit driver.
//!
//! Columns are checked one at a time, each inside its own read-only
//! transaction that is always rolled back. A failure while checking one
//! column is logged and that column is skipped; it never stops the audit.
//!
//! The result is advisory. Since every column is read in a separate
//! transaction, the audit is not a consistent snapshot of the whole schema if
//! DDL runs concurrently.

use std::future::Future;

use tokio_postgres::Client;
use tracing::{error, info};

use crate::{
    Catalog, ColumnInformation, ConnectionExt, PgCatalog, Repair, RepairScript, Result,
    SerialColumn, serial_primary_keys,
};

/// What to audit and how to label it.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Schema whose tables are audited.
    pub schema: String,
    /// Identifier of the active settings, attached to error logs.
    pub settings: String,
}

/// Outcome of an audit.
#[derive(Debug, Clone)]
pub struct AuditReport {
    pub script: RepairScript,
    /// Columns examined.
    pub checked: usize,
    /// Columns whose check failed.
    pub skipped: usize,
}

impl AuditReport {
    /// Columns that need at least one repair.
    pub fn needing_repair(&self) -> usize {
        self.script.columns.len()
    }
}

/// Runs the reconciliation for one column.
///
/// Implementations decide how the catalog is reached; failures are handled by
/// [`audit_columns`].
pub trait ColumnInspector {
    fn inspect(&mut self, table: &str, column: &str) -> impl Future<Output = Result<Vec<Repair>>>;
}

/// Inspects columns directly against a [`Catalog`], without any transaction
/// handling.
pub struct CatalogInspector<'a, C: Catalog> {
    catalog: &'a C,
}

impl<'a, C: Catalog> CatalogInspector<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }
}

impl<C: Catalog> ColumnInspector for CatalogInspector<'_, C> {
    async fn inspect(&mut self, table: &str, column: &str) -> Result<Vec<Repair>> {
        ColumnInformation::new(self.catalog, table, column)
            .build_repairs()
            .await
    }
}

/// Inspects every column in its own read-only transaction, rolled back
/// afterwards.
struct ReadOnlyInspector<'a> {
    client: &'a mut Client,
    schema: &'a str,
}

impl ColumnInspector for ReadOnlyInspector<'_> {
    async fn inspect(&mut self, table: &str, column: &str) -> Result<Vec<Repair>> {
        let tx = self
            .client
            .build_transaction()
            .read_only(true)
            .start()
            .await?;

        let outcome = {
            let catalog = PgCatalog::new(&tx, self.schema);
            ColumnInformation::new(&catalog, table, column)
                .build_repairs()
                .await
        };

        // Dropping `tx` rolls back too, but doing it here surfaces errors.
        let rolled_back = tx.rollback().await;
        let repairs = outcome?;
        rolled_back?;
        Ok(repairs)
    }
}

/// Audit every serial primary key in `options.schema`.
///
/// Only failing to read the database name or to list the columns is an
/// error; per-column failures are counted in [`AuditReport::skipped`].
pub async fn audit(client: &mut Client, options: &AuditOptions) -> Result<AuditReport> {
    let database: String = client
        .traced()
        .query_one("SELECT current_database()", &[])
        .await?
        .get(0);

    let columns = serial_primary_keys(&*client, &options.schema).await?;
    info!(
        database = %database,
        schema = %options.schema,
        columns = columns.len(),
        "auditing serial primary keys"
    );

    let mut inspector = ReadOnlyInspector {
        client,
        schema: &options.schema,
    };
    Ok(audit_columns(&mut inspector, database, columns, options).await)
}

/// Inspect `columns` in order and collect their repairs.
///
/// A column whose inspection fails is logged with the settings label and
/// skipped; the remaining columns are still inspected.
pub async fn audit_columns(
    inspector: &mut impl ColumnInspector,
    database: String,
    columns: Vec<SerialColumn>,
    options: &AuditOptions,
) -> AuditReport {
    let mut report = AuditReport {
        script: RepairScript::new(database, &options.schema),
        checked: 0,
        skipped: 0,
    };

    for SerialColumn { table, column } in columns {
        report.checked += 1;
        match inspector.inspect(&table, &column).await {
            Ok(repairs) => report.script.push(&table, &column, repairs),
            Err(e) => {
                report.skipped += 1;
                error!(
                    settings = %options.settings,
                    table = %table,
                    column = %column,
                    error = %e,
                    "column check failed, skipping"
                );
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCatalog;

    fn column(table: &str, column: &str) -> SerialColumn {
        SerialColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    fn options() -> AuditOptions {
        AuditOptions {
            schema: "public".into(),
            settings: "test".into(),
        }
    }

    #[tokio::test]
    async fn test_failing_column_is_skipped_and_audit_continues() {
        let catalog = FakeCatalog::default()
            // malformed default, fails
            .with_sequence("accounts_id_seq")
            .with_raw_default("accounts", "id", "(nextval('accounts_id_seq'::regclass) + 1)")
            // healthy
            .with_sequence("customers_id_seq")
            .with_default("customers", "id", "customers_id_seq")
            .with_owner("customers", "id", "customers_id_seq")
            // needs a rename
            .with_sequence("orders_id_seq1")
            .with_default("orders", "id", "orders_id_seq1")
            .with_owner("orders", "id", "orders_id_seq1");

        let columns = vec![
            column("accounts", "id"),
            column("customers", "id"),
            column("orders", "id"),
        ];
        let mut inspector = CatalogInspector::new(&catalog);
        let report = audit_columns(&mut inspector, "shop".into(), columns, &options()).await;

        assert_eq!(report.checked, 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.needing_repair(), 1);
        assert_eq!(report.script.columns[0].table, "orders");
        assert_eq!(report.script.statement_count(), 2);
    }

    #[tokio::test]
    async fn test_clean_schema_yields_empty_script() {
        let catalog = FakeCatalog::default()
            .with_sequence("customers_id_seq")
            .with_default("customers", "id", "customers_id_seq")
            .with_owner("customers", "id", "customers_id_seq");

        let mut inspector = CatalogInspector::new(&catalog);
        let report = audit_columns(
            &mut inspector,
            "shop".into(),
            vec![column("customers", "id")],
            &options(),
        )
        .await;

        assert_eq!(report.checked, 1);
        assert_eq!(report.skipped, 0);
        assert!(report.script.is_empty());
        assert_eq!(report.script.to_string(), "");
    }
}
