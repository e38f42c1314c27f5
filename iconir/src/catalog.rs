//! What the remote catalog says the font should contain.

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::types::GlyphName;

/// One icon as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: GlyphName,
    pub category: String,
    pub source_uri: Option<String>,
}

impl CatalogEntry {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<GlyphName>,
        category: impl Into<String>,
        source_uri: Option<String>,
    ) -> CatalogEntry {
        CatalogEntry {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            source_uri,
        }
    }
}

/// Drop entries whose id has already been seen; the first one wins.
///
/// The same component can be listed on more than one catalog page.
pub fn dedupe_by_id(entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| {
            let fresh = seen.insert(entry.id.clone());
            if !fresh {
                debug!("Dropping repeat of {} ({})", entry.id, entry.name);
            }
            fresh
        })
        .collect()
}
