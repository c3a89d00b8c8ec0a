//! Sequence auditing for Postgres.
//!
//! Checks that every serial primary key uses the sequence a Django-style
//! naming convention expects (`{table}_{column}_seq`), that the sequence is
//! owned by its column, and suggests SQL to fix whatever isn't.
//!
//! Nothing is ever written to the database: the audit only reads the
//! catalog, and the suggested statements are for an operator to review and
//! run.
//!
//! ```ignore
//! let options = AuditOptions {
//!     schema: "public".into(),
//!     settings: "production".into(),
//! };
//! let report = seqaudit::audit(&mut client, &options).await?;
//! print!("{}", report.script);
//! ```

mod audit;
mod catalog;
mod column;
mod error;
mod repair;
mod scan;
mod script;
mod sequence;
pub mod sql;
#[cfg(test)]
mod testing;
mod traced;

pub use audit::{
    AuditOptions, AuditReport, CatalogInspector, ColumnInspector, audit, audit_columns,
};
pub use catalog::{Catalog, PgCatalog};
pub use column::{ColumnInformation, parse_nextval_default};
pub use error::Error;
pub use repair::Repair;
pub use scan::{SerialColumn, serial_primary_keys};
pub use script::{ColumnRepair, RepairScript};
pub use sequence::Sequence;
pub use traced::{Connection, ConnectionExt, TracedConn};

/// Result type for seqaudit operations.
pub type Result<T> = std::result::Result<T, Error>;
