//! Where things go on disk for one font.

use std::path::{Path, PathBuf};

use crate::{font::OutputType, types::GlyphName};

#[derive(Debug, Clone)]
pub struct Paths {
    font_dir: PathBuf,
    icons_dir: PathBuf,
    raw_dir: PathBuf,
    webfonts_dir: PathBuf,
    manifest_file: PathBuf,
    listing_file: PathBuf,
    font_name: String,
}

impl Paths {
    pub fn new(font_dir: &Path, font_name: &str) -> Paths {
        let font_dir = font_dir.to_path_buf();
        let icons_dir = font_dir.join("icons");
        let raw_dir = font_dir.join("raw");
        let webfonts_dir = font_dir.join("webfonts");
        let manifest_file = font_dir.join("manifest.json");
        let listing_file = font_dir.join("manifest.scss");
        Paths {
            font_dir,
            icons_dir,
            raw_dir,
            webfonts_dir,
            manifest_file,
            listing_file,
            font_name: font_name.to_string(),
        }
    }

    pub fn font_dir(&self) -> &Path {
        &self.font_dir
    }

    /// Final, optimized svg per glyph.
    pub fn icons_dir(&self) -> &Path {
        &self.icons_dir
    }

    /// Svgs as fetched, before any processing.
    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    pub fn webfonts_dir(&self) -> &Path {
        &self.webfonts_dir
    }

    pub fn manifest_file(&self) -> &Path {
        &self.manifest_file
    }

    /// The scss listing of glyph name to code point.
    pub fn listing_file(&self) -> &Path {
        &self.listing_file
    }

    pub fn icon_file(&self, name: &GlyphName) -> PathBuf {
        self.icons_dir.join(format!("{name}.svg"))
    }

    pub fn raw_file(&self, name: &GlyphName) -> PathBuf {
        self.raw_dir.join(format!("{name}.svg"))
    }

    pub fn webfont_file(&self, output_type: OutputType) -> PathBuf {
        self.webfonts_dir
            .join(format!("{}.{}", self.font_name, output_type.extension()))
    }

    pub fn sprite_file(&self) -> PathBuf {
        self.font_dir.join(format!("{}.svg", self.font_name))
    }

    pub fn stylesheet_file(&self) -> PathBuf {
        self.font_dir.join(format!("{}.css", self.font_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        let paths = Paths::new(Path::new("out"), "mdi");
        assert_eq!(Path::new("out/icons/home.svg"), paths.icon_file(&"home".into()));
        assert_eq!(
            Path::new("out/webfonts/mdi.woff2"),
            paths.webfont_file(OutputType::Woff2)
        );
        assert_eq!(Path::new("out/manifest.json"), paths.manifest_file());
        assert_eq!(Path::new("out/manifest.scss"), paths.listing_file());
        assert_eq!(Path::new("out/mdi.svg"), paths.sprite_file());
    }
}
