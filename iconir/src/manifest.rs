//! The durable record of a font: its glyphs, their code points, and the version.
//!
//! Glyph content is not stored here; it lives next to the manifest as one svg
//! per glyph and is picked up again by the pipeline. The digest of the content
//! as of the last save is stored, and is what later runs detect edits against.

use std::{
    collections::{BTreeMap, HashSet},
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::debug;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    font::Font,
    glyph::Glyph,
    types::{CodePoint, ContentDigest, GlyphName},
};

/// The on-disk shape of a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDocument {
    pub version: String,
    pub glyphs: Vec<ManifestGlyph>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_water_mark: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestGlyph {
    pub name: String,
    pub category: String,
    pub id: String,
    pub code_point: u32,
    /// The last known source uri.
    #[serde(default)]
    pub icon: String,
    /// Hex digest of the content that was saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl ManifestDocument {
    /// Capture the persistent portion of a font.
    ///
    /// Glyphs without a code point have nothing durable to record and are
    /// left out.
    pub fn from_font(font: &Font) -> ManifestDocument {
        let glyphs = font
            .glyphs
            .values()
            .filter_map(|g| {
                g.code_point.map(|cp| ManifestGlyph {
                    name: g.name.to_string(),
                    category: g.category.clone(),
                    id: g.id.clone(),
                    code_point: cp.to_u32(),
                    icon: g.source_uri.clone().unwrap_or_default(),
                    digest: g.digest.map(|d| d.to_hex()),
                })
            })
            .collect();
        ManifestDocument {
            version: font.version.to_string(),
            glyphs,
            high_water_mark: font.max_code_point().map(CodePoint::to_u32),
        }
    }

    /// Validate and convert into a font with no pending changes.
    fn into_font(self, name: &str, path: &Path) -> Result<Font, Error> {
        let malformed = |reason: String| Error::MalformedManifest {
            path: path.to_path_buf(),
            reason,
        };

        let version = Version::parse(&self.version)
            .map_err(|e| malformed(format!("version '{}': {e}", self.version)))?;

        let mut seen_code_points = HashSet::new();
        let mut glyphs = BTreeMap::new();
        for entry in self.glyphs {
            let glyph_name = GlyphName::new(&entry.name);
            if let Err(reason) = glyph_name.check_file_stem() {
                return Err(malformed(format!("glyph name '{glyph_name}' is {reason}")));
            }
            let code_point = CodePoint::new(entry.code_point);
            if !code_point.is_valid() {
                return Err(malformed(format!(
                    "'{glyph_name}' has invalid code point {}",
                    entry.code_point
                )));
            }
            if !seen_code_points.insert(code_point) {
                return Err(malformed(format!(
                    "{code_point} is assigned more than once"
                )));
            }
            let digest = match entry.digest.as_deref() {
                Some(raw) => Some(ContentDigest::from_hex(raw).ok_or_else(|| {
                    malformed(format!("'{glyph_name}' has invalid digest '{raw}'"))
                })?),
                None => None,
            };
            let glyph = Glyph {
                id: entry.id,
                name: glyph_name.clone(),
                category: entry.category,
                source_uri: (!entry.icon.is_empty()).then_some(entry.icon),
                content: None,
                code_point: Some(code_point),
                digest,
            };
            if glyphs.insert(glyph_name.clone(), glyph).is_some() {
                return Err(malformed(format!("'{glyph_name}' appears more than once")));
            }
        }

        let high_water_mark = match self.high_water_mark {
            Some(raw) => {
                let hwm = CodePoint::new(raw);
                if !hwm.is_valid() {
                    return Err(malformed(format!("invalid highWaterMark {raw}")));
                }
                Some(hwm)
            }
            None => None,
        };

        let mut font = Font::new(name);
        font.version = version;
        font.glyphs = glyphs;
        font.high_water_mark = high_water_mark;
        font.high_water_mark = font.max_code_point();
        Ok(font)
    }
}

/// Loads and atomically saves a font's manifest.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> ManifestStore {
        ManifestStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the manifest for the named font.
    ///
    /// A missing manifest is simply a font with no history.
    pub fn load(&self, font_name: &str) -> Result<Font, Error> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No manifest at {:?}, starting fresh", self.path);
                return Ok(Font::new(font_name));
            }
            Err(source) => {
                return Err(Error::FileIo {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let doc: ManifestDocument =
            serde_json::from_str(&raw).map_err(|e| Error::MalformedManifest {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        let font = doc.into_font(font_name, &self.path)?;
        debug!(
            "Loaded {} glyphs at version {} from {:?}",
            font.glyphs.len(),
            font.version,
            self.path
        );
        Ok(font)
    }

    /// Write the manifest for a font.
    ///
    /// The document goes to a temporary file in the same directory which is
    /// then renamed over the old one.
    pub fn save(&self, font: &Font) -> Result<(), Error> {
        let persistence = |source: io::Error| Error::Persistence {
            path: self.path.clone(),
            source,
        };
        let doc = ManifestDocument::from_font(font);
        let mut json = serde_json::to_string_pretty(&doc)
            .map_err(|e| persistence(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        json.push('\n');

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(persistence)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(persistence)?;
        tmp.write_all(json.as_bytes()).map_err(persistence)?;
        tmp.as_file().sync_all().map_err(persistence)?;
        tmp.persist(&self.path).map_err(|e| persistence(e.error))?;
        debug!("Saved {} glyphs to {:?}", doc.glyphs.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn glyph(name: &str, cp: u32) -> Glyph {
        let mut glyph = Glyph::pending(
            format!("id-{name}"),
            name.into(),
            "nav",
            Some(format!("https://cdn/{name}.svg")),
        );
        glyph.code_point = Some(CodePoint::new(cp));
        glyph
    }

    fn font_with(glyphs: &[(&str, u32)]) -> Font {
        let mut font = Font::new("icons");
        font.version = Version::new(1, 2, 0);
        for (name, cp) in glyphs {
            font.glyphs.insert((*name).into(), glyph(name, *cp));
        }
        font
    }

    #[test]
    fn missing_manifest_is_empty_font() {
        let temp_dir = tempdir().unwrap();
        let store = ManifestStore::new(temp_dir.path().join("manifest.json"));
        let font = store.load("icons").unwrap();
        assert_eq!(Font::new("icons"), font);
    }

    #[test]
    fn save_then_load() {
        let temp_dir = tempdir().unwrap();
        let store = ManifestStore::new(temp_dir.path().join("manifest.json"));
        let font = font_with(&[("home", 0xE001), ("star", 0xE002)]);
        store.save(&font).unwrap();

        let loaded = store.load("icons").unwrap();
        assert_eq!(font.glyphs, loaded.glyphs);
        assert_eq!(font.version, loaded.version);
        assert_eq!(Some(CodePoint::new(0xE002)), loaded.high_water_mark);
    }

    #[test]
    fn document_shape() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("manifest.json");
        let store = ManifestStore::new(&path);
        store.save(&font_with(&[("home", 0xE001)])).unwrap();
        let actual: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        let expected = serde_json::json!({
            "version": "1.2.0",
            "glyphs": [{
                "name": "home",
                "category": "nav",
                "id": "id-home",
                "codePoint": 57345,
                "icon": "https://cdn/home.svg",
            }],
            "highWaterMark": 57345,
        });
        assert_eq!(expected, actual);
    }

    #[test]
    fn digest_is_saved_but_content_is_not() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("manifest.json");
        let store = ManifestStore::new(&path);
        let mut font = font_with(&[("home", 0xE001), ("star", 0xE002)]);
        font.glyphs
            .get_mut("home")
            .unwrap()
            .set_content("<svg/>".to_string());
        store.save(&font).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            serde_json::json!(ContentDigest::of("<svg/>").to_hex()),
            raw["glyphs"][0]["digest"]
        );
        assert!(raw["glyphs"][1].get("digest").is_none());

        let loaded = store.load("icons").unwrap();
        assert_eq!(Some(ContentDigest::of("<svg/>")), loaded.glyphs["home"].digest);
        assert_eq!(None, loaded.glyphs["home"].content);
        assert_eq!(None, loaded.glyphs["star"].digest);
    }

    #[test]
    fn high_water_mark_survives_deletion_of_top_glyph() {
        let temp_dir = tempdir().unwrap();
        let store = ManifestStore::new(temp_dir.path().join("manifest.json"));
        let mut font = font_with(&[("home", 0xE001), ("star", 0xE002)]);
        font.high_water_mark = font.max_code_point();
        font.glyphs.remove("star");
        store.save(&font).unwrap();
        assert_eq!(
            Some(CodePoint::new(0xE002)),
            store.load("icons").unwrap().high_water_mark
        );
    }

    #[test]
    fn manifest_without_high_water_mark_is_fine() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("manifest.json");
        fs::write(
            &path,
            r#"{"version": "0.3.0", "glyphs": [{"name": "a", "category": "c", "id": "1", "codePoint": 59905, "icon": ""}]}"#,
        )
        .unwrap();
        let font = ManifestStore::new(&path).load("icons").unwrap();
        assert_eq!(Some(CodePoint::new(59905)), font.high_water_mark);
        assert_eq!(None, font.glyphs["a"].source_uri);
    }

    fn assert_malformed(content: &str) {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("manifest.json");
        fs::write(&path, content).unwrap();
        let result = ManifestStore::new(&path).load("icons");
        assert!(
            matches!(result, Err(Error::MalformedManifest { .. })),
            "{result:?}"
        );
    }

    #[test]
    fn unparseable_is_malformed() {
        assert_malformed("{ not json");
    }

    #[test]
    fn bad_digest_is_malformed() {
        assert_malformed(
            r#"{"version": "0.1.0", "glyphs": [{"name": "a", "category": "c", "id": "1", "codePoint": 57345, "digest": "nope"}]}"#,
        );
    }

    #[test]
    fn path_like_name_is_malformed() {
        assert_malformed(
            r#"{"version": "0.1.0", "glyphs": [{"name": "../a", "category": "c", "id": "1", "codePoint": 57345}]}"#,
        );
    }

    #[test]
    fn bad_version_is_malformed() {
        assert_malformed(r#"{"version": "one", "glyphs": []}"#);
    }

    #[test]
    fn duplicate_name_is_malformed() {
        assert_malformed(
            r#"{"version": "1.0.0", "glyphs": [
                {"name": "a", "category": "c", "id": "1", "codePoint": 57345, "icon": ""},
                {"name": "a", "category": "c", "id": "2", "codePoint": 57346, "icon": ""}
            ]}"#,
        );
    }

    #[test]
    fn duplicate_code_point_is_malformed() {
        assert_malformed(
            r#"{"version": "1.0.0", "glyphs": [
                {"name": "a", "category": "c", "id": "1", "codePoint": 57345, "icon": ""},
                {"name": "b", "category": "c", "id": "2", "codePoint": 57345, "icon": ""}
            ]}"#,
        );
    }

    #[test]
    fn surrogate_code_point_is_malformed() {
        assert_malformed(
            r#"{"version": "1.0.0", "glyphs": [
                {"name": "a", "category": "c", "id": "1", "codePoint": 55296, "icon": ""}
            ]}"#,
        );
    }

    #[test]
    fn save_replaces_existing() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("manifest.json");
        let store = ManifestStore::new(&path);
        store.save(&font_with(&[("a", 0xE001)])).unwrap();
        store
            .save(&font_with(&[("a", 0xE001), ("b", 0xE002)]))
            .unwrap();
        assert_eq!(2, store.load("icons").unwrap().glyphs.len());
        // no temporaries left behind
        assert_eq!(1, fs::read_dir(temp_dir.path()).unwrap().count());
    }
}
