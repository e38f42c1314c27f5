//! Writes the svg font document every other format is derived from.

use std::fmt::Write;

use iconir::{
    error::SvgError,
    glyph::Glyph,
    outline::DEFAULT_UNITS_PER_EM,
    pathdata::{format_path_data, parse_number_list, parse_path_data},
    svg::{Document, Element},
};
use kurbo::{Affine, BezPath};
use log::warn;
use quick_xml::escape::escape;
use semver::Version;

use crate::error::Error;

/// Font wide values shared by every output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontMetadata {
    pub family: String,
    pub version: Version,
    pub units_per_em: u16,
    pub ascender: i16,
    /// Zero or negative, below the baseline.
    pub descender: i16,
}

impl FontMetadata {
    pub fn new(family: impl Into<String>, version: Version) -> FontMetadata {
        FontMetadata {
            family: family.into(),
            version,
            units_per_em: DEFAULT_UNITS_PER_EM,
            ascender: DEFAULT_UNITS_PER_EM as i16,
            descender: 0,
        }
    }
}

/// Decimal places kept in glyph path data; TrueType rounds to integers anyway.
const PRECISION: usize = 2;

/// Every path in a normalized glyph svg, in y-down em units.
pub fn glyph_outline(content: &str, units_per_em: u16) -> Result<BezPath, SvgError> {
    let doc = Document::parse(content)?;
    let mut outline = BezPath::new();
    collect_paths(&doc.root, &mut outline)?;

    // Content should already be on our em; scale it there if it isn't
    if let Some(raw) = doc.root.attr("viewBox") {
        if let [x, y, w, h] = parse_number_list("viewBox", raw)?.as_slice() {
            let size = w.max(*h);
            if size > 0.0 && (size - units_per_em as f64).abs() > f64::EPSILON {
                let scale = units_per_em as f64 / size;
                outline = Affine::scale(scale) * Affine::translate((-x, -y)) * outline;
            }
        }
    }
    Ok(outline)
}

fn collect_paths(el: &Element, out: &mut BezPath) -> Result<(), SvgError> {
    if el.local_name() == "path" {
        if let Some(d) = el.attr("d") {
            out.extend(parse_path_data(d)?);
        }
    }
    for child in el.elements() {
        collect_paths(child, out)?;
    }
    Ok(())
}

/// Build the svg font document.
///
/// Glyphs appear in ascending code point order regardless of the order they
/// are given in. Glyphs without a code point or content are left out. The
/// output depends only on the inputs: same glyphs and metadata, same bytes.
pub fn build_document(metadata: &FontMetadata, glyphs: &[&Glyph]) -> Result<String, Error> {
    let mut ordered: Vec<_> = glyphs
        .iter()
        .filter_map(|g| match (g.code_point, g.content.as_deref()) {
            (Some(cp), Some(content)) => Some((cp, *g, content)),
            (Some(_), None) => {
                warn!("'{}' has no content, leaving it out of the font", g.name);
                None
            }
            (None, _) => {
                warn!("'{}' has no code point, leaving it out of the font", g.name);
                None
            }
        })
        .collect();
    ordered.sort_by_key(|(cp, _, _)| *cp);

    let upm = metadata.units_per_em;
    let family = escape(metadata.family.as_str());
    // svg glyphs are y-up from the baseline
    let flip = Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, metadata.ascender as f64]);

    let mut doc = String::new();
    // writing to a String is infallible
    let _ = writeln!(doc, r#"<?xml version="1.0" standalone="no"?>"#);
    let _ = writeln!(
        doc,
        r#"<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">"#
    );
    let _ = writeln!(doc, r#"<svg xmlns="http://www.w3.org/2000/svg">"#);
    let _ = writeln!(doc, "<metadata>{family} {}</metadata>", metadata.version);
    let _ = writeln!(doc, "<defs>");
    let _ = writeln!(doc, r#"  <font id="{family}" horiz-adv-x="{upm}">"#);
    let _ = writeln!(
        doc,
        r#"    <font-face font-family="{family}" font-weight="400" font-stretch="normal" units-per-em="{upm}" ascent="{}" descent="{}"/>"#,
        metadata.ascender, metadata.descender
    );
    let _ = writeln!(doc, r#"    <missing-glyph horiz-adv-x="{upm}"/>"#);
    for (code_point, glyph, content) in ordered {
        let outline = glyph_outline(content, upm).map_err(Error::Svg)?;
        let d = format_path_data(&(flip * outline), PRECISION);
        let _ = writeln!(
            doc,
            r#"    <glyph glyph-name="{}" unicode="{}" horiz-adv-x="{upm}" d="{d}"/>"#,
            escape(glyph.name.as_str()),
            code_point.xml_char_ref(),
        );
    }
    let _ = writeln!(doc, "  </font>");
    let _ = writeln!(doc, "</defs>");
    let _ = writeln!(doc, "</svg>");
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use iconir::types::CodePoint;
    use pretty_assertions::assert_eq;

    use super::*;

    fn glyph(name: &str, cp: u32, d: &str) -> Glyph {
        let mut glyph = Glyph::pending(name, name.into(), "c", None);
        glyph.code_point = Some(CodePoint::new(cp));
        glyph.set_content(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1000 1000" width="1000" height="1000"><path d="{d}"/></svg>"#
        ));
        glyph
    }

    #[test]
    fn glyphs_are_ordered_by_code_point() {
        let b = glyph("b", 0xE002, "M0 0 L10 0 L10 10 Z");
        let a = glyph("a", 0xE001, "M0 0 L10 0 L10 10 Z");
        let doc = build_document(&FontMetadata::new("f", Version::new(1, 0, 0)), &[&b, &a]).unwrap();
        let a_at = doc.find(r#"glyph-name="a""#).unwrap();
        let b_at = doc.find(r#"glyph-name="b""#).unwrap();
        assert!(a_at < b_at);
    }

    #[test]
    fn y_is_flipped() {
        let g = glyph("a", 0xE001, "M0 0 L1000 0 L1000 1000 Z");
        let doc = build_document(&FontMetadata::new("f", Version::new(1, 0, 0)), &[&g]).unwrap();
        assert!(
            doc.contains(
                r#"<glyph glyph-name="a" unicode="&#xE001;" horiz-adv-x="1000" d="M0 1000 L1000 1000 L1000 0 Z"/>"#
            ),
            "{doc}"
        );
    }

    #[test]
    fn skips_glyphs_without_content() {
        let mut g = glyph("a", 0xE001, "M0 0 L10 0 L10 10 Z");
        g.content = None;
        let doc = build_document(&FontMetadata::new("f", Version::new(1, 0, 0)), &[&g]).unwrap();
        assert!(!doc.contains("<glyph "));
    }

    #[test]
    fn same_input_same_bytes() {
        let a = glyph("a", 0xE001, "M0 0 L10 0 L10 10 Z");
        let b = glyph("b", 0xE002, "M5 5 Q 50 50 100 5 Z");
        let metadata = FontMetadata::new("f", Version::new(1, 0, 0));
        assert_eq!(
            build_document(&metadata, &[&a, &b]).unwrap(),
            build_document(&metadata, &[&b, &a]).unwrap()
        );
    }

    #[test]
    fn foreign_em_is_rescaled() {
        let outline = glyph_outline(
            r#"<svg viewBox="0 0 24 24"><path d="M0 0 L24 24"/></svg>"#,
            1000,
        )
        .unwrap();
        let bbox = kurbo::Shape::bounding_box(&outline);
        assert_eq!((0.0, 0.0), (bbox.x0, bbox.y0));
        assert!((bbox.x1 - 1000.0).abs() < 1e-9);
    }
}
