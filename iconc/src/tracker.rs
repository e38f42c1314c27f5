//! Works out which glyphs changed content during a run.

use iconir::{
    changelog::{ChangeOp, Changelog},
    font::Font,
};
use log::{debug, info};

use crate::pipeline::Snapshot;

#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeTracker;

impl ChangeTracker {
    /// Record an edit for every glyph whose digest moved since `before`, then
    /// sort the changelog by glyph name.
    ///
    /// Glyphs already recorded as added or deleted are left alone, as are
    /// glyphs absent from `before`.
    pub fn finalize<'a>(&self, font: &'a mut Font, before: &Snapshot) -> &'a Changelog {
        let mut edited = Vec::new();
        for (name, glyph) in font.glyphs.iter() {
            if font.changelog.contains(ChangeOp::Add, name)
                || font.changelog.contains(ChangeOp::Delete, name)
                || font.changelog.contains(ChangeOp::Edit, name)
            {
                continue;
            }
            let Some(prior) = before.get(name) else {
                continue;
            };
            if *prior != glyph.digest {
                debug!("{name} content changed");
                edited.push(name.clone());
            }
        }
        for name in edited {
            font.changelog.record(ChangeOp::Edit, name);
        }
        font.changelog.sort_by_name();
        info!("{} change(s) to {}", font.changelog.len(), font.name);
        &font.changelog
    }
}

#[cfg(test)]
mod tests {
    use iconir::{glyph::Glyph, types::ContentDigest};
    use pretty_assertions::assert_eq;

    use super::*;

    fn font() -> Font {
        let mut font = Font::new("t");
        for name in ["added", "same", "changed", "fresh-content"] {
            let mut glyph = Glyph::pending(name, name.into(), "c", None);
            glyph.set_content(format!("<svg>{name}</svg>"));
            font.glyphs.insert(name.into(), glyph);
        }
        font.changelog.record(ChangeOp::Add, "added".into());
        font.changelog.record(ChangeOp::Delete, "removed".into());
        font
    }

    #[test]
    fn edits_follow_digests() {
        let mut font = font();
        let before = Snapshot::from([
            ("added".into(), None),
            ("same".into(), Some(ContentDigest::of("<svg>same</svg>"))),
            ("changed".into(), Some(ContentDigest::of("<svg>old</svg>"))),
            ("fresh-content".into(), None),
        ]);
        let changelog = ChangeTracker.finalize(&mut font, &before);
        assert_eq!(
            vec![
                (ChangeOp::Add, "added"),
                (ChangeOp::Edit, "changed"),
                (ChangeOp::Edit, "fresh-content"),
                (ChangeOp::Delete, "removed"),
            ],
            changelog.summary()
        );
    }

    #[test]
    fn nothing_changed() {
        let mut font = Font::new("t");
        let mut glyph = Glyph::pending("1", "same".into(), "c", None);
        glyph.set_content("<svg/>".to_string());
        font.glyphs.insert("same".into(), glyph);
        let before = Snapshot::from([("same".into(), Some(ContentDigest::of("<svg/>")))]);
        assert!(ChangeTracker.finalize(&mut font, &before).is_empty());
    }

    #[test]
    fn finalize_twice_records_once() {
        let mut font = font();
        let before = Snapshot::from([("changed".into(), None)]);
        ChangeTracker.finalize(&mut font, &before);
        let changelog = ChangeTracker.finalize(&mut font, &before);
        assert_eq!(1, changelog.names(ChangeOp::Edit).count());
    }
}
