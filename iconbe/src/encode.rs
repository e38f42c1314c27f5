//! Encodes a font into every requested format.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use iconir::font::{Font, OutputType};
use log::{debug, info};
use rayon::prelude::*;
use semver::Version;

use crate::{
    document::{build_document, FontMetadata},
    error::Error,
    svgfont::parse_svg_font,
    ttf::compile_ttf,
    woff::wrap_woff,
    woff2::wrap_woff2,
};

#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    /// Written into binary fonts as their creation and modification time.
    pub timestamp: DateTime<Utc>,
    pub units_per_em: u16,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderConfig {
            timestamp: Utc.timestamp_opt(0, 0).single().unwrap_or(DateTime::UNIX_EPOCH),
            units_per_em: iconir::outline::DEFAULT_UNITS_PER_EM,
        }
    }
}

/// The result of encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFont {
    pub version: Version,
    /// The svg font document.
    pub svg: String,
    /// Binary formats, only those that were requested.
    pub binaries: BTreeMap<OutputType, Vec<u8>>,
}

impl EncodedFont {
    /// Bytes for any output type, svg included.
    pub fn bytes(&self, output_type: OutputType) -> Option<&[u8]> {
        match output_type {
            OutputType::Svg => Some(self.svg.as_bytes()),
            other => self.binaries.get(&other).map(Vec::as_slice),
        }
    }
}

/// Turns a compiled TrueType font into one binary output format.
type Transcode = fn(&[u8]) -> Result<Vec<u8>, Error>;

fn copy_ttf(ttf: &[u8]) -> Result<Vec<u8>, Error> {
    Ok(ttf.to_vec())
}

/// None for the svg document, which isn't derived from the TrueType font.
fn transcoder(output_type: OutputType) -> Option<Transcode> {
    match output_type {
        OutputType::Svg => None,
        OutputType::Ttf => Some(copy_ttf as Transcode),
        OutputType::Woff => Some(wrap_woff as Transcode),
        OutputType::Woff2 => Some(wrap_woff2 as Transcode),
    }
}

#[derive(Debug, Clone, Default)]
pub struct FontEncoder {
    config: EncoderConfig,
}

impl FontEncoder {
    pub fn new(config: EncoderConfig) -> FontEncoder {
        FontEncoder { config }
    }

    /// The version the encoded font carries.
    ///
    /// A font with pending changes is encoded as the version it will be saved as.
    pub fn version_for(font: &Font) -> Version {
        if font.changelog.is_empty() {
            font.version.clone()
        } else {
            font.next_version()
        }
    }

    /// Encode the svg font document, then derive each binary format from it.
    ///
    /// Glyphs with no content yet are left out.
    pub fn encode(&self, font: &Font) -> Result<EncodedFont, Error> {
        let version = Self::version_for(font);
        let metadata = FontMetadata {
            units_per_em: self.config.units_per_em,
            ascender: self.config.units_per_em as i16,
            ..FontMetadata::new(&font.name, version.clone())
        };
        let glyphs = font.glyphs_by_code_point();
        let svg = build_document(&metadata, &glyphs)?;
        debug!("{} svg font is {} bytes", font.name, svg.len());

        let transcodes: Vec<_> = font
            .output_types
            .iter()
            .filter_map(|t| transcoder(*t).map(|transcode| (*t, transcode)))
            .collect();
        if transcodes.is_empty() {
            return Ok(EncodedFont {
                version,
                svg,
                binaries: BTreeMap::new(),
            });
        }

        let svg_font = parse_svg_font(&svg)?;
        let ttf = compile_ttf(&svg_font, &metadata, self.config.timestamp)?;
        let binaries = transcodes
            .into_par_iter()
            .map(|(output_type, transcode)| {
                let bytes = transcode(&ttf)?;
                info!("Encoded {} {output_type}, {} bytes", font.name, bytes.len());
                Ok((output_type, bytes))
            })
            .collect::<Result<BTreeMap<_, _>, Error>>()?;

        Ok(EncodedFont {
            version,
            svg,
            binaries,
        })
    }
}
