//! Catalog introspection primitives.
//!
//! Everything [`Sequence`](crate::Sequence) and
//! [`ColumnInformation`](crate::ColumnInformation) need to know about the
//! database goes through the [`Catalog`] trait, so the reconciliation logic can
//! run against a live connection ([`PgCatalog`]) or an in-memory fixture.

use std::future::Future;

use crate::sql::split_qualified;
use crate::{Connection, ConnectionExt, Result, TracedConn};

/// Read-only view of the sequence-related parts of the system catalog.
///
/// All names are unquoted and unqualified; implementations scope every lookup
/// to a single schema.
pub trait Catalog: Sync {
    /// Whether a sequence with exactly this name exists.
    fn sequence_exists(&self, name: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Names of sequences matching a LIKE pattern, ordered by name.
    fn sequences_like(&self, pattern: &str) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// The sequence owned by `table.column`, as reported by
    /// `pg_get_serial_sequence`.
    fn serial_sequence(
        &self,
        table: &str,
        column: &str,
    ) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Every default expression of `table.column` that mentions `nextval`.
    ///
    /// A well-formed column has exactly one.
    fn nextval_defaults(
        &self,
        table: &str,
        column: &str,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// [`Catalog`] backed by Postgres' `pg_catalog`.
pub struct PgCatalog<'a, C: Connection> {
    conn: TracedConn<'a, C>,
    schema: &'a str,
}

impl<'a, C: Connection> PgCatalog<'a, C> {
    pub fn new(conn: &'a C, schema: &'a str) -> Self {
        Self {
            conn: conn.traced(),
            schema,
        }
    }
}

impl<C: Connection> Catalog for PgCatalog<'_, C> {
    async fn sequence_exists(&self, name: &str) -> Result<bool> {
        let row = self
            .conn
            .query_opt(
                r#"
                SELECT 1
                FROM pg_catalog.pg_class c
                JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
                WHERE c.relkind = 'S' AND c.relname = $1 AND n.nspname = $2
                "#,
                &[&name, &self.schema],
            )
            .await?;
        Ok(row.is_some())
    }

    async fn sequences_like(&self, pattern: &str) -> Result<Vec<String>> {
        let rows = self
            .conn
            .query(
                r#"
                SELECT c.relname
                FROM pg_catalog.pg_class c
                JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
                WHERE c.relkind = 'S' AND c.relname LIKE $1 AND n.nspname = $2
                ORDER BY c.relname
                "#,
                &[&pattern, &self.schema],
            )
            .await?;
        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    async fn serial_sequence(&self, table: &str, column: &str) -> Result<Option<String>> {
        let row = self
            .conn
            .query_one(
                "SELECT pg_get_serial_sequence(quote_ident($1) || '.' || quote_ident($2), $3)",
                &[&self.schema, &table, &column],
            )
            .await?;
        let qualified: Option<String> = row.get(0);
        Ok(qualified.map(|name| split_qualified(&name).1))
    }

    async fn nextval_defaults(&self, table: &str, column: &str) -> Result<Vec<String>> {
        let rows = self
            .conn
            .query(
                r#"
                SELECT pg_catalog.pg_get_expr(d.adbin, d.adrelid)
                FROM pg_catalog.pg_attrdef d
                JOIN pg_catalog.pg_class c ON c.oid = d.adrelid
                JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
                JOIN pg_catalog.pg_attribute a ON a.attrelid = d.adrelid AND a.attnum = d.adnum
                WHERE n.nspname = $1
                  AND c.relname = $2
                  AND a.attname = $3
                  AND pg_catalog.pg_get_expr(d.adbin, d.adrelid) ILIKE '%nextval%'
                "#,
                &[&self.schema, &table, &column],
            )
            .await?;
        Ok(rows.iter().map(|row| row.get(0)).collect())
    }
}
