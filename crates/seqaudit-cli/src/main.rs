//! `seqaudit`: print SQL that repairs Postgres serial sequences.
//!
//! Connects to `DATABASE_URL`, checks every serial primary key of
//! `SEQAUDIT_SCHEMA` (default `public`) and writes a psql script with the
//! suggested repairs to stdout. Nothing is printed when everything is in
//! order. Logs go to stderr; set `RUST_LOG` to adjust them.
//!
//! The audit never modifies the database. Review the script before running
//! it: every column is inspected in its own transaction, so concurrent schema
//! changes can make the suggestions stale.

mod config;

use std::io::IsTerminal;

use owo_colors::OwoColorize;
use seqaudit::{AuditOptions, AuditReport};
use tokio_postgres::NoTls;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, mask_password};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("seqaudit=info")),
        )
        .init();

    let config = match config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> seqaudit::Result<()> {
    info!(
        settings = %config.settings,
        database = %mask_password(&config.database_url),
        "connecting"
    );

    let (mut client, connection) = tokio_postgres::connect(&config.database_url, NoTls).await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("database connection error: {}", e);
        }
    });

    let options = AuditOptions {
        schema: config.schema,
        settings: config.settings,
    };
    let report = seqaudit::audit(&mut client, &options).await?;

    print!("{}", report.script);

    if std::io::stderr().is_terminal() {
        print_summary(&report);
    }

    Ok(())
}

fn print_summary(report: &AuditReport) {
    let needing = report.needing_repair();
    let repairs = if needing == 0 {
        "nothing to repair".green().to_string()
    } else {
        format!(
            "{} need repair ({} statements)",
            needing,
            report.script.statement_count()
        )
        .yellow()
        .to_string()
    };
    let skipped = if report.skipped == 0 {
        String::new()
    } else {
        format!(", {}", format!("{} skipped", report.skipped).red())
    };

    eprintln!(
        "{} {} columns checked, {}{}",
        "seqaudit".bold(),
        report.checked,
        repairs,
        skipped
    );
}
