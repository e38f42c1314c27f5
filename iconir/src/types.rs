//! Basic types useful for icon font compilation.
//!
//! Particularly types where it's nice for FE and BE to match.

use std::{
    borrow::Borrow,
    fmt::{Debug, Display},
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use smol_str::SmolStr;

/// The first code point handed out when a font has none yet.
///
/// Start of the Basic Multilingual Plane private use area, plus one.
pub const DEFAULT_PUA_FLOOR: CodePoint = CodePoint(0xE001);

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GlyphName(SmolStr);

impl GlyphName {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(SmolStr::new(s))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_inner(self) -> SmolStr {
        self.0
    }

    /// A name is used as a file stem under the font directory and must not
    /// resolve anywhere else.
    pub fn check_file_stem(&self) -> Result<(), &'static str> {
        let name = self.as_str();
        if name.trim().is_empty() {
            return Err("empty");
        }
        if name.contains(['/', '\\', '\0']) {
            return Err("contains a path separator");
        }
        if name.starts_with('.') {
            return Err("starts with '.'");
        }
        Ok(())
    }
}

impl From<String> for GlyphName {
    fn from(value: String) -> Self {
        GlyphName(value.into())
    }
}

impl From<&str> for GlyphName {
    fn from(value: &str) -> Self {
        GlyphName(value.into())
    }
}

impl From<SmolStr> for GlyphName {
    fn from(value: SmolStr) -> Self {
        GlyphName(value)
    }
}

impl Borrow<str> for GlyphName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl Debug for GlyphName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for GlyphName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Unicode scalar value assigned to a glyph.
///
/// Stored as an integer; the textual forms used by the various artifacts
/// are derived on demand.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodePoint(u32);

impl CodePoint {
    pub const fn new(value: u32) -> CodePoint {
        CodePoint(value)
    }

    pub fn to_u32(self) -> u32 {
        self.0
    }

    /// None if the value is not a Unicode scalar value (e.g. a surrogate).
    pub fn as_char(self) -> Option<char> {
        char::from_u32(self.0)
    }

    pub fn is_valid(self) -> bool {
        self.as_char().is_some()
    }

    /// The next code point, if there is one.
    pub fn next(self) -> Option<CodePoint> {
        let next = CodePoint(self.0.checked_add(1)?);
        next.is_valid().then_some(next)
    }

    /// Lowercase hex without prefix, at least four digits, e.g. "e001".
    pub fn hex(self) -> String {
        format!("{:04x}", self.0)
    }

    /// The escape used in css `content` and scss strings, e.g. "\e001".
    pub fn css_escape(self) -> String {
        format!("\\{}", self.hex())
    }

    /// An xml numeric character reference, e.g. "&#xE001;".
    pub fn xml_char_ref(self) -> String {
        format!("&#x{:04X};", self.0)
    }
}

impl Debug for CodePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "U+{:04X}", self.0)
    }
}

impl Display for CodePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "U+{:04X}", self.0)
    }
}

/// A content hash, used to notice when a glyph's outline changed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    pub fn of(content: impl AsRef<[u8]>) -> ContentDigest {
        ContentDigest(Sha256::digest(content.as_ref()).into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The inverse of [`ContentDigest::to_hex`].
    pub fn from_hex(raw: &str) -> Option<ContentDigest> {
        let bytes = hex::decode(raw).ok()?;
        bytes.try_into().ok().map(ContentDigest)
    }
}

impl Debug for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentDigest({})", &self.to_hex()[..12])
    }
}
