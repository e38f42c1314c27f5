//! The font aggregate: every glyph, the version, and pending changes.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
    str::FromStr,
};

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::{
    changelog::Changelog,
    glyph::Glyph,
    types::{CodePoint, GlyphName},
};

/// A file format the font can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Svg,
    Ttf,
    Woff,
    Woff2,
}

impl OutputType {
    pub const ALL: [OutputType; 4] = [
        OutputType::Svg,
        OutputType::Ttf,
        OutputType::Woff,
        OutputType::Woff2,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            OutputType::Svg => "svg",
            OutputType::Ttf => "ttf",
            OutputType::Woff => "woff",
            OutputType::Woff2 => "woff2",
        }
    }

    /// The value for `format()` in an `@font-face` src list.
    pub fn css_format(self) -> &'static str {
        match self {
            OutputType::Svg => "svg",
            OutputType::Ttf => "truetype",
            OutputType::Woff => "woff",
            OutputType::Woff2 => "woff2",
        }
    }
}

impl Display for OutputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputType::ALL
            .into_iter()
            .find(|t| t.extension().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown output type '{s}'"))
    }
}

/// Everything known about one icon font.
///
/// Single writer: a run owns its Font and mutates it stage by stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub name: String,
    pub version: Version,
    /// Keyed, and therefore ordered, by name.
    pub glyphs: BTreeMap<GlyphName, Glyph>,
    pub output_types: BTreeSet<OutputType>,
    /// Changes since the manifest was last persisted.
    pub changelog: Changelog,
    /// Highest code point ever handed out, including to glyphs since removed.
    pub high_water_mark: Option<CodePoint>,
}

impl Font {
    /// A font with no history.
    pub fn new(name: impl Into<String>) -> Font {
        Font {
            name: name.into(),
            version: Version::new(0, 0, 0),
            glyphs: BTreeMap::new(),
            output_types: BTreeSet::from([OutputType::Svg]),
            changelog: Changelog::new(),
            high_water_mark: None,
        }
    }

    /// The svg document is always produced, every binary is derived from it.
    pub fn set_output_types(&mut self, types: impl IntoIterator<Item = OutputType>) {
        self.output_types = types.into_iter().collect();
        self.output_types.insert(OutputType::Svg);
    }

    pub fn glyph(&self, name: &str) -> Option<&Glyph> {
        self.glyphs.get(name)
    }

    /// Largest code point currently assigned or ever recorded.
    pub fn max_code_point(&self) -> Option<CodePoint> {
        self.glyphs
            .values()
            .filter_map(|g| g.code_point)
            .chain(self.high_water_mark)
            .max()
    }

    /// Glyphs in ascending code point order; unallocated glyphs are left out.
    pub fn glyphs_by_code_point(&self) -> Vec<&Glyph> {
        let mut glyphs: Vec<_> = self
            .glyphs
            .values()
            .filter(|g| g.code_point.is_some())
            .collect();
        glyphs.sort_by_key(|g| g.code_point);
        glyphs
    }

    /// The version this font would be published as if it has changes.
    ///
    /// Minor bump, patch reset.
    pub fn next_version(&self) -> Version {
        Version::new(self.version.major, self.version.minor + 1, 0)
    }

    /// Apply the version rule: bump if and only if something changed.
    ///
    /// Returns true if the version moved.
    pub fn bump_version_if_changed(&mut self) -> bool {
        if self.changelog.is_empty() {
            return false;
        }
        self.version = self.next_version();
        true
    }
}
