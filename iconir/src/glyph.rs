//! A single icon.

use crate::types::{CodePoint, ContentDigest, GlyphName};

/// One icon of a font.
///
/// `name` is the identity. `code_point` is write-once: the allocator sets it
/// when it is None and nothing else touches it.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Opaque identifier assigned by the catalog.
    pub id: String,
    pub name: GlyphName,
    pub category: String,
    /// Where to fetch the raw svg. Recomputed every run.
    pub source_uri: Option<String>,
    /// Final (normalized, optimized) svg, if the pipeline has produced or
    /// loaded one.
    pub content: Option<String>,
    pub code_point: Option<CodePoint>,
    pub digest: Option<ContentDigest>,
}

impl Glyph {
    /// A glyph the catalog just introduced.
    pub fn pending(
        id: impl Into<String>,
        name: GlyphName,
        category: impl Into<String>,
        source_uri: Option<String>,
    ) -> Glyph {
        Glyph {
            id: id.into(),
            name,
            category: category.into(),
            source_uri,
            content: None,
            code_point: None,
            digest: None,
        }
    }

    /// Replace the content, keeping the digest in step.
    pub fn set_content(&mut self, content: String) {
        self.digest = Some(ContentDigest::of(&content));
        self.content = Some(content);
    }

    pub fn is_allocated(&self) -> bool {
        self.code_point.is_some()
    }
}
