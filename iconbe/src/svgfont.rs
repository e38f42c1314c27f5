//! Reads an svg font document back into outlines.
//!
//! Binary formats are compiled from the document rather than from the glyph
//! set so the document stays the single source for every format.

use iconir::{
    pathdata::parse_path_data,
    svg::{Document, Element},
};
use kurbo::BezPath;
use log::warn;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct SvgFont {
    pub family: String,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub default_advance: u16,
    /// In document order.
    pub glyphs: Vec<SvgFontGlyph>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvgFontGlyph {
    pub name: String,
    pub code_point: char,
    pub advance: u16,
    /// y-up font units.
    pub path: BezPath,
}

fn find<'a>(el: &'a Element, name: &str) -> Option<&'a Element> {
    if el.local_name() == name {
        return Some(el);
    }
    el.elements().find_map(|child| find(child, name))
}

fn number<T: std::str::FromStr>(el: &Element, attr: &str) -> Result<Option<T>, Error> {
    el.attr(attr)
        .map(|raw| {
            // svg fonts in the wild carry values like "1000.0"
            let trimmed = raw.trim().trim_end_matches(".0");
            trimmed.parse::<T>().map_err(|_| Error::BadAttribute {
                attr: attr.to_string(),
                value: raw.to_string(),
            })
        })
        .transpose()
}

pub fn parse_svg_font(document: &str) -> Result<SvgFont, Error> {
    let doc = Document::parse(document)?;
    let font = find(&doc.root, "font").ok_or(Error::NoFontElement)?;
    let face = font.elements().find(|e| e.local_name() == "font-face");

    let units_per_em = match face {
        Some(face) => number::<u16>(face, "units-per-em")?,
        None => None,
    }
    .unwrap_or(1000);
    let ascender = match face {
        Some(face) => number::<i16>(face, "ascent")?,
        None => None,
    }
    .unwrap_or(units_per_em as i16);
    let descender = match face {
        Some(face) => number::<i16>(face, "descent")?,
        None => None,
    }
    .unwrap_or(0);
    let default_advance = number::<u16>(font, "horiz-adv-x")?.unwrap_or(units_per_em);
    let family = face
        .and_then(|f| f.attr("font-family"))
        .or_else(|| font.attr("id"))
        .unwrap_or_default()
        .to_string();

    let mut glyphs = Vec::new();
    for el in font.elements().filter(|e| e.local_name() == "glyph") {
        let name = el.attr("glyph-name").unwrap_or_default().to_string();
        let unicode = el.attr("unicode").unwrap_or_default();
        let mut chars = unicode.chars();
        let (Some(code_point), None) = (chars.next(), chars.next()) else {
            warn!("Skipping '{name}', unicode '{unicode}' is not a single character");
            continue;
        };
        let advance = number::<u16>(el, "horiz-adv-x")?.unwrap_or(default_advance);
        let path = parse_path_data(el.attr("d").unwrap_or_default())?;
        glyphs.push(SvgFontGlyph {
            name,
            code_point,
            advance,
            path,
        });
    }

    Ok(SvgFont {
        family,
        units_per_em,
        ascender,
        descender,
        default_advance,
        glyphs,
    })
}
