use std::{io, path::PathBuf};

use thiserror::Error;

use crate::types::{CodePoint, GlyphName};

#[derive(Debug, Error)]
pub enum Error {
    #[error("'{0}' appears more than once in the catalog")]
    DuplicateGlyphName(GlyphName),
    #[error("'{name}' can't be used as a glyph name: {reason}")]
    InvalidGlyphName {
        name: GlyphName,
        reason: &'static str,
    },
    #[error("malformed manifest '{path}': {reason}")]
    MalformedManifest { path: PathBuf, reason: String },
    #[error("unable to persist '{path}': '{source}'")]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("io failed for '{path}': '{source}'")]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0} is not a usable code point floor")]
    InvalidCodePointFloor(CodePoint),
    #[error("No code points left after {0}")]
    CodePointsExhausted(CodePoint),
}

/// Problems reading, outlining or rewriting an svg.
#[derive(Debug, Error)]
pub enum SvgError {
    #[error(transparent)]
    ReaderError(#[from] quick_xml::Error),
    #[error(transparent)]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),
    #[error("Document has no root element")]
    NoRoot,
    #[error("Expected <svg> root, got <{0}>")]
    UnexpectedRoot(String),
    #[error("Mismatched closing tag </{0}>")]
    MismatchedTag(String),
    #[error("Unclosed element <{0}>")]
    Unclosed(String),
    #[error("Bad path data '{0}'")]
    PathData(String),
    #[error("Bad transform '{0}'")]
    Transform(String),
    #[error("Bad number '{value}' for '{attr}'")]
    Number { attr: String, value: String },
    #[error("Nothing visible to outline")]
    NoOutline,
    #[error("Degenerate frame {width}x{height}")]
    DegenerateFrame { width: f64, height: f64 },
}
