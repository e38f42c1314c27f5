//! Diff the remote catalog against what the manifest remembers.
//!
//! Identity is the glyph name. A rename therefore shows up as a delete of the
//! old name and an add of the new one, and the new name gets a fresh code point.

use std::collections::{BTreeMap, HashSet};

use log::{debug, info};

use crate::{
    catalog::CatalogEntry,
    changelog::ChangeOp,
    error::Error,
    font::Font,
    glyph::Glyph,
    types::GlyphName,
};

/// The structural outcome of reconciling a font against a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub added: Vec<GlyphName>,
    pub updated: Vec<GlyphName>,
    pub deleted: Vec<GlyphName>,
}

/// Fail on the first name that is unusable as a file stem or that the catalog
/// lists twice.
pub fn check_names(catalog: &[CatalogEntry]) -> Result<(), Error> {
    let mut seen = HashSet::new();
    for entry in catalog {
        entry
            .name
            .check_file_stem()
            .map_err(|reason| Error::InvalidGlyphName {
                name: entry.name.clone(),
                reason,
            })?;
        if !seen.insert(&entry.name) {
            return Err(Error::DuplicateGlyphName(entry.name.clone()));
        }
    }
    Ok(())
}

/// Rebuild the glyph set of `font` from `catalog`.
///
/// Glyphs the catalog no longer lists are removed and recorded as deletes.
/// Glyphs it lists for the first time are created without a code point or
/// content and recorded as adds. Glyphs present in both keep their code point
/// and content and take the catalog's id, category and source uri; that alone
/// is not a change.
///
/// The catalog is validated before anything is touched: on error the font is
/// exactly as it was.
pub fn reconcile(font: &mut Font, catalog: &[CatalogEntry]) -> Result<Reconciliation, Error> {
    check_names(catalog)?;

    let mut previous = std::mem::take(&mut font.glyphs);
    let mut glyphs = BTreeMap::new();
    let mut result = Reconciliation::default();

    for entry in catalog {
        let glyph = match previous.remove(&entry.name) {
            Some(mut glyph) => {
                glyph.id = entry.id.clone();
                glyph.category = entry.category.clone();
                glyph.source_uri = entry.source_uri.clone();
                result.updated.push(entry.name.clone());
                glyph
            }
            None => {
                debug!("'{}' is new", entry.name);
                result.added.push(entry.name.clone());
                Glyph::pending(
                    entry.id.clone(),
                    entry.name.clone(),
                    entry.category.clone(),
                    entry.source_uri.clone(),
                )
            }
        };
        glyphs.insert(entry.name.clone(), glyph);
    }
    // whatever the catalog didn't claim is gone
    result.deleted = previous.into_keys().collect();

    for name in result.deleted.iter() {
        debug!("'{name}' is no longer in the catalog");
        font.changelog.record(ChangeOp::Delete, name.clone());
    }
    for name in result.added.iter() {
        font.changelog.record(ChangeOp::Add, name.clone());
    }
    font.glyphs = glyphs;

    info!(
        "Reconciled {}: {} added, {} kept, {} deleted",
        font.name,
        result.added.len(),
        result.updated.len(),
        result.deleted.len()
    );
    Ok(result)
}
