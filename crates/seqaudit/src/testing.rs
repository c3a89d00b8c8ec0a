//! In-memory catalog used by unit tests.

use std::collections::{BTreeSet, HashMap};

use crate::{Catalog, Repair, Result};

type Key = (String, String);

fn key(table: &str, column: &str) -> Key {
    (table.to_string(), column.to_string())
}

/// In-memory catalog for a single schema.
#[derive(Default)]
pub(crate) struct FakeCatalog {
    sequences: BTreeSet<String>,
    defaults: HashMap<Key, Vec<String>>,
    owners: HashMap<Key, String>,
}

impl FakeCatalog {
    pub(crate) fn with_sequence(mut self, name: &str) -> Self {
        self.sequences.insert(name.to_string());
        self
    }

    pub(crate) fn with_default(mut self, table: &str, column: &str, sequence: &str) -> Self {
        self.defaults
            .entry(key(table, column))
            .or_default()
            .push(format!("nextval('{}'::regclass)", sequence));
        self
    }

    pub(crate) fn with_raw_default(mut self, table: &str, column: &str, expr: &str) -> Self {
        self.defaults
            .entry(key(table, column))
            .or_default()
            .push(expr.to_string());
        self
    }

    pub(crate) fn with_owner(mut self, table: &str, column: &str, sequence: &str) -> Self {
        self.owners.insert(key(table, column), sequence.to_string());
        self
    }

    /// Roughly what Postgres does when the statement runs. Defaults
    /// reference sequences by OID, so a rename carries over to them.
    pub(crate) fn apply(&mut self, repair: &Repair) {
        match repair {
            Repair::RenameSequence { from, to } => {
                assert!(self.sequences.remove(from), "renaming missing {from}");
                self.sequences.insert(to.clone());
                for exprs in self.defaults.values_mut() {
                    for expr in exprs.iter_mut() {
                        *expr = expr.replace(&format!("'{from}'"), &format!("'{to}'"));
                    }
                }
                for owned in self.owners.values_mut() {
                    if owned == from {
                        *owned = to.clone();
                    }
                }
            }
            Repair::SetDefault {
                table,
                column,
                sequence,
            } => {
                self.defaults.insert(
                    key(table, column),
                    vec![format!("nextval('{}'::regclass)", sequence)],
                );
            }
            Repair::ResyncSequence { .. } => {}
            Repair::SetOwner {
                sequence,
                table,
                column,
            } => {
                self.owners.insert(key(table, column), sequence.clone());
            }
        }
    }
}

impl Catalog for FakeCatalog {
    async fn sequence_exists(&self, name: &str) -> Result<bool> {
        Ok(self.sequences.contains(name))
    }

    async fn sequences_like(&self, pattern: &str) -> Result<Vec<String>> {
        // Only the `%\_suffix` shape built by `similar_name_pattern`.
        let suffix = pattern.trim_start_matches('%').replace('\\', "");
        Ok(self
            .sequences
            .iter()
            .filter(|name| name.ends_with(&suffix) && name.len() > suffix.len())
            .cloned()
            .collect())
    }

    async fn serial_sequence(&self, table: &str, column: &str) -> Result<Option<String>> {
        Ok(self.owners.get(&key(table, column)).cloned())
    }

    async fn nextval_defaults(&self, table: &str, column: &str) -> Result<Vec<String>> {
        Ok(self
            .defaults
            .get(&key(table, column))
            .cloned()
            .unwrap_or_default())
    }
}
