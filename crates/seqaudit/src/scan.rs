//! Enumeration of the primary-key columns worth auditing.

use crate::{Connection, ConnectionExt, Result};

/// A single-column integer primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialColumn {
    pub table: String,
    pub column: String,
}

/// List the integer primary keys of every table in `schema`, ordered by
/// table then column.
///
/// Composite keys, identity columns and partitions (which share their
/// parent's default) are left out.
pub async fn serial_primary_keys(conn: &impl Connection, schema: &str) -> Result<Vec<SerialColumn>> {
    let rows = conn
        .traced()
        .query(
            r#"
            SELECT c.relname AS table_name, a.attname AS column_name
            FROM pg_catalog.pg_constraint con
            JOIN pg_catalog.pg_class c ON c.oid = con.conrelid
            JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
            JOIN pg_catalog.pg_attribute a ON a.attrelid = c.oid AND a.attnum = con.conkey[1]
            WHERE con.contype = 'p'
              AND array_length(con.conkey, 1) = 1
              AND n.nspname = $1
              AND c.relkind IN ('r', 'p')
              AND NOT c.relispartition
              AND a.atttypid IN ('int2'::regtype::oid, 'int4'::regtype::oid, 'int8'::regtype::oid)
              AND a.attidentity = ''
            ORDER BY c.relname, a.attname
            "#,
            &[&schema],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| SerialColumn {
            table: row.get("table_name"),
            column: row.get("column_name"),
        })
        .collect())
}
