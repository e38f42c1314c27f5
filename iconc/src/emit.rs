//! Writes the webfonts and the files that sit next to them.

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use iconbe::encode::EncodedFont;
use iconir::{
    font::{Font, OutputType},
    outline::SVG_NS,
    paths::Paths,
    svg::{Document, Element},
};
use log::{debug, warn};
use semver::Version;

use crate::{config::Flags, require_dir, Error};

/// Preferred first in `@font-face` src lists.
const CSS_FORMAT_ORDER: [OutputType; 4] = [
    OutputType::Woff2,
    OutputType::Woff,
    OutputType::Ttf,
    OutputType::Svg,
];

fn write(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    fs::write(path, bytes).map_err(|source| Error::FileIo {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote {} bytes to {path:?}", bytes.len());
    Ok(())
}

/// One `<symbol>` per glyph, by name, each keeping its glyph's viewBox.
pub fn sprite(font: &Font) -> Result<String, Error> {
    let mut root = Element::new("svg").with_attr("xmlns", SVG_NS);
    for glyph in font.glyphs.values() {
        let Some(content) = glyph.content.as_deref() else {
            warn!("{} has no content, leaving it out of the sprite", glyph.name);
            continue;
        };
        let doc = Document::parse(content).map_err(iconbe::error::Error::from)?;
        let mut symbol = Element::new("symbol").with_attr("id", glyph.name.as_str());
        if let Some(view_box) = doc.root.attr("viewBox") {
            symbol = symbol.with_attr("viewBox", view_box);
        }
        symbol.children = doc.root.children;
        root = root.with_child(symbol);
    }
    Ok(Document::new(root).to_xml())
}

/// `@font-face` for the produced formats and a class per glyph.
pub fn stylesheet(font: &Font, version: &Version) -> String {
    let family = &font.name;
    let mut css = String::new();
    let sources: Vec<_> = CSS_FORMAT_ORDER
        .iter()
        .filter(|t| font.output_types.contains(t))
        .map(|t| {
            let fragment = if *t == OutputType::Svg {
                format!("#{family}")
            } else {
                String::new()
            };
            format!(
                "url(\"webfonts/{family}.{}?v={version}{fragment}\") format(\"{}\")",
                t.extension(),
                t.css_format()
            )
        })
        .collect();

    // writing to a String is infallible
    let _ = writeln!(css, "@font-face {{");
    let _ = writeln!(css, "  font-family: \"{family}\";");
    let _ = writeln!(css, "  src: {};", sources.join(",\n    "));
    let _ = writeln!(css, "  font-weight: normal;");
    let _ = writeln!(css, "  font-style: normal;");
    let _ = writeln!(css, "}}");
    let _ = writeln!(css);
    let _ = writeln!(css, "[class^=\"{family}-\"]:before,");
    let _ = writeln!(css, "[class*=\" {family}-\"]:before {{");
    let _ = writeln!(css, "  font-family: \"{family}\";");
    let _ = writeln!(css, "  font-style: normal;");
    let _ = writeln!(css, "  font-weight: normal;");
    let _ = writeln!(css, "  line-height: 1;");
    let _ = writeln!(css, "  -webkit-font-smoothing: antialiased;");
    let _ = writeln!(css, "  -moz-osx-font-smoothing: grayscale;");
    let _ = writeln!(css, "}}");
    let _ = writeln!(css);
    for glyph in font.glyphs.values() {
        if let Some(code_point) = glyph.code_point {
            let _ = writeln!(
                css,
                ".{family}-{}:before {{ content: \"{}\"; }}",
                glyph.name,
                code_point.css_escape()
            );
        }
    }
    css
}

/// The scss listing of glyph name to escaped code point.
pub fn listing(font: &Font, version: &Version) -> String {
    let family = &font.name;
    let mut scss = String::new();
    let _ = writeln!(scss, "${family}-version: \"{version}\";");
    let _ = writeln!(scss, "${family}-icons: (");
    for glyph in font.glyphs.values() {
        if let Some(code_point) = glyph.code_point {
            let _ = writeln!(scss, "  \"{}\": \"{}\",", glyph.name, code_point.css_escape());
        }
    }
    let _ = writeln!(scss, ");");
    scss
}

/// Writes artifacts into a font's directory.
#[derive(Debug, Clone)]
pub struct ArtifactEmitter {
    paths: Paths,
    flags: Flags,
}

impl ArtifactEmitter {
    pub fn new(paths: Paths, flags: Flags) -> ArtifactEmitter {
        ArtifactEmitter { paths, flags }
    }

    /// Write every requested webfont, the listing, and the sprite and
    /// stylesheet if enabled. Returns the files written.
    pub fn emit(&self, font: &Font, encoded: &EncodedFont) -> Result<Vec<PathBuf>, Error> {
        require_dir(self.paths.webfonts_dir())?;
        let mut written = Vec::new();
        for output_type in font.output_types.iter() {
            let Some(bytes) = encoded.bytes(*output_type) else {
                warn!("No {output_type} was encoded for {}", font.name);
                continue;
            };
            let path = self.paths.webfont_file(*output_type);
            write(&path, bytes)?;
            written.push(path);
        }

        let path = self.paths.listing_file().to_path_buf();
        write(&path, listing(font, &encoded.version).as_bytes())?;
        written.push(path);

        if self.flags.contains(Flags::EMIT_SPRITE) {
            let path = self.paths.sprite_file();
            write(&path, sprite(font)?.as_bytes())?;
            written.push(path);
        }
        if self.flags.contains(Flags::EMIT_STYLESHEET) {
            let path = self.paths.stylesheet_file();
            write(&path, stylesheet(font, &encoded.version).as_bytes())?;
            written.push(path);
        }
        Ok(written)
    }
}
