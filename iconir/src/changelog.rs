//! What changed in a font since it was last persisted.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::GlyphName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Add,
    Edit,
    Delete,
}

impl ChangeOp {
    fn verb(self) -> &'static str {
        match self {
            ChangeOp::Add => "added",
            ChangeOp::Edit => "updated",
            ChangeOp::Delete => "removed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub op: ChangeOp,
    pub glyph: GlyphName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Display for ChangelogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "- icon `{}` {}", self.glyph, self.op.verb())
    }
}

/// Append-only within a run; [Changelog::sort_by_name] gives the
/// presentation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changelog {
    entries: Vec<ChangelogEntry>,
}

impl Changelog {
    pub fn new() -> Changelog {
        Changelog::default()
    }

    pub fn record(&mut self, op: ChangeOp, glyph: GlyphName) {
        self.entries.push(ChangelogEntry {
            op,
            glyph,
            timestamp: Some(Utc::now()),
        });
    }

    pub fn extend(&mut self, other: Changelog) {
        self.entries.extend(other.entries);
    }

    /// Stable, so a glyph with several entries keeps them in recorded order.
    pub fn sort_by_name(&mut self) {
        self.entries.sort_by(|a, b| a.glyph.cmp(&b.glyph));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ChangelogEntry] {
        &self.entries
    }

    /// Has this glyph already been recorded with the given op?
    pub fn contains(&self, op: ChangeOp, glyph: &GlyphName) -> bool {
        self.entries
            .iter()
            .any(|e| e.op == op && &e.glyph == glyph)
    }

    pub fn names(&self, op: ChangeOp) -> impl Iterator<Item = &GlyphName> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.op == op)
            .map(|e| &e.glyph)
    }

    /// (op, name) pairs, handy for comparisons that don't care about time.
    pub fn summary(&self) -> Vec<(ChangeOp, &str)> {
        self.entries
            .iter()
            .map(|e| (e.op, e.glyph.as_str()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Release notes, one line per entry.
impl Display for Changelog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in self.entries.iter() {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
