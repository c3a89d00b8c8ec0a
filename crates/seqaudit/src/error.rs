use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("default of {table}.{column} is not a plain nextval() call: {expr}")]
    MalformedDefault {
        table: String,
        column: String,
        expr: String,
    },
}
