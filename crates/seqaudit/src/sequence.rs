use std::fmt;

use crate::sql::escape_like;
use crate::{Catalog, Result};

/// A named sequence object.
///
/// Two sequences are equal when their names are. Existence is never cached:
/// every call to [`Sequence::exists`] asks the catalog again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sequence {
    pub name: String,
}

impl Sequence {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Whether a sequence with this exact name exists right now.
    pub async fn exists(&self, catalog: &impl Catalog) -> Result<bool> {
        catalog.sequence_exists(&self.name).await
    }

    /// Sequences whose names end with the same last three `_`-separated
    /// segments as this one, e.g. `legacy_orders_id_seq` for `orders_id_seq`.
    ///
    /// Only meant for diagnostics.
    pub async fn find_similar_by_suffix(&self, catalog: &impl Catalog) -> Result<Vec<String>> {
        catalog.sequences_like(&similar_name_pattern(&self.name)).await
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Sequence: {}>", self.name)
    }
}

/// LIKE pattern matching any name that ends in `_` followed by the last three
/// segments of `name`.
pub(crate) fn similar_name_pattern(name: &str) -> String {
    let segments: Vec<&str> = name.split('_').collect();
    let suffix = segments[segments.len().saturating_sub(3)..].join("_");
    format!("%\\_{}", escape_like(&suffix))
}
