use std::io;

use iconir::{error::SvgError, types::GlyphName};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO failure")]
    IoError(#[from] io::Error),
    #[error(transparent)]
    Svg(#[from] SvgError),
    #[error("Font document has no <font> element")]
    NoFontElement,
    #[error("Bad {attr}='{value}' in font document")]
    BadAttribute { attr: String, value: String },
    #[error("'{glyph_name}' can't be written as TrueType: {problem}")]
    OutlineError {
        glyph_name: GlyphName,
        problem: String,
    },
    #[error("Conflicting cmap entries: {0}")]
    CmapConflict(String),
    #[error("{0} glyphs don't fit in a font")]
    TooManyGlyphs(usize),
    #[error("Generating bytes for {context} failed: {problem}")]
    DumpTableError {
        context: &'static str,
        problem: String,
    },
    #[error("Unable to read compiled font: {0}")]
    ReadFontError(String),
}
