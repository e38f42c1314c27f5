//! The per glyph asset pipeline: snapshot, fetch, normalize, optimize.
//!
//! Each stage runs over every glyph still in play before the next stage
//! starts. A glyph that fails drops out of the remaining stages and keeps the
//! content it had at snapshot; the others carry on.

use std::{
    collections::BTreeMap,
    fmt::Display,
    fs, io,
    path::{Path, PathBuf},
};

use iconir::{
    error::SvgError,
    font::Font,
    optimize::Optimizer,
    outline::Normalizer,
    paths::Paths,
    types::{ContentDigest, GlyphName},
};
use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    require_dir,
    source::{AssetFetcher, FetchError},
    stage::StagePool,
    Error,
};

/// Worker counts per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub fetch_concurrency: usize,
    /// Shared by normalize and optimize.
    pub process_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            fetch_concurrency: 50,
            process_concurrency: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Snapshot,
    Fetch,
    Normalize,
    Optimize,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Snapshot => "snapshot",
            Stage::Fetch => "fetch",
            Stage::Normalize => "normalize",
            Stage::Optimize => "optimize",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum GlyphError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Svg(#[from] SvgError),
    #[error("io failed for '{path}': '{source}'")]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("panicked: {0}")]
    Panic(String),
}

/// One glyph that didn't make it through the pipeline.
#[derive(Debug)]
pub struct GlyphFailure {
    pub name: GlyphName,
    pub stage: Stage,
    pub error: GlyphError,
}

impl Display for GlyphFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} failed: {}", self.name, self.stage, self.error)
    }
}

/// Content digest per glyph as of the last save; None if none was recorded.
pub type Snapshot = BTreeMap<GlyphName, Option<ContentDigest>>;

/// What happened to each glyph.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub before: Snapshot,
    /// Glyphs that made it through every stage, by name.
    pub succeeded: Vec<GlyphName>,
    pub failures: Vec<GlyphFailure>,
    /// Files of glyphs no longer in the font.
    pub pruned: Vec<PathBuf>,
}

impl PipelineReport {
    fn collect<O>(
        &mut self,
        stage: Stage,
        results: BTreeMap<GlyphName, Result<O, GlyphError>>,
    ) -> BTreeMap<GlyphName, O> {
        let mut ok = BTreeMap::new();
        for (name, result) in results {
            match result {
                Ok(value) => {
                    ok.insert(name, value);
                }
                Err(error) => {
                    warn!("{name}: {stage} failed: {error}");
                    self.failures.push(GlyphFailure { name, stage, error });
                }
            }
        }
        info!("{stage}: {} ok, {} failed in total", ok.len(), self.failures.len());
        ok
    }
}

fn write(path: &Path, content: &str) -> Result<(), GlyphError> {
    fs::write(path, content).map_err(|source| GlyphError::FileIo {
        path: path.to_path_buf(),
        source,
    })
}

/// Remove `<name>.svg` files in `dir` for names the font no longer has.
fn prune_dir(dir: &Path, font: &Font) -> Result<Vec<PathBuf>, Error> {
    let file_io = |source| Error::FileIo {
        path: dir.to_path_buf(),
        source,
    };
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut pruned = Vec::new();
    for entry in fs::read_dir(dir).map_err(file_io)? {
        let path = entry.map_err(file_io)?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("svg") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if font.glyphs.contains_key(stem) {
            continue;
        }
        fs::remove_file(&path).map_err(|source| Error::FileIo {
            path: path.clone(),
            source,
        })?;
        debug!("Pruned {path:?}");
        pruned.push(path);
    }
    pruned.sort();
    Ok(pruned)
}

/// The stages, their collaborators, and where they read and write.
pub struct GlyphPipeline {
    paths: Paths,
    fetcher: Box<dyn AssetFetcher>,
    normalizer: Box<dyn Normalizer>,
    optimizer: Box<dyn Optimizer>,
    fetch_pool: StagePool,
    process_pool: StagePool,
}

impl GlyphPipeline {
    pub fn new(
        config: PipelineConfig,
        paths: Paths,
        fetcher: Box<dyn AssetFetcher>,
        normalizer: Box<dyn Normalizer>,
        optimizer: Box<dyn Optimizer>,
    ) -> Result<GlyphPipeline, Error> {
        Ok(GlyphPipeline {
            paths,
            fetcher,
            normalizer,
            optimizer,
            fetch_pool: StagePool::new("fetch", config.fetch_concurrency)?,
            process_pool: StagePool::new("process", config.process_concurrency)?,
        })
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Delete icon and raw files of glyphs the font no longer has.
    pub fn prune(&self, font: &Font, report: &mut PipelineReport) -> Result<(), Error> {
        report.pruned.extend(prune_dir(self.paths.icons_dir(), font)?);
        report.pruned.extend(prune_dir(self.paths.raw_dir(), font)?);
        report.pruned.sort();
        Ok(())
    }

    /// Load what is on disk for each glyph and remember the digest recorded
    /// for it when the font was last saved.
    pub fn snapshot(&self, font: &mut Font, report: &mut PipelineReport) -> Result<(), Error> {
        require_dir(self.paths.icons_dir())?;
        require_dir(self.paths.raw_dir())?;

        let items = font
            .glyphs
            .keys()
            .map(|name| (name.clone(), self.paths.icon_file(name)))
            .collect();
        let results = self.process_pool.run(
            items,
            |_, path: PathBuf| match fs::read_to_string(&path) {
                Ok(content) => Ok(Some(content)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(source) => Err(GlyphError::FileIo { path, source }),
            },
            GlyphError::Panic,
        );
        for (name, content) in report.collect(Stage::Snapshot, results) {
            let Some(glyph) = font.glyphs.get_mut(&name) else {
                continue;
            };
            // edits are measured against what was last saved, not what is on disk
            report.before.insert(name, glyph.digest);
            match content {
                Some(content) => glyph.set_content(content),
                None => {
                    glyph.content = None;
                    glyph.digest = None;
                }
            }
        }
        Ok(())
    }

    /// Fetch the raw svg of every glyph, keeping a copy in the raw dir.
    pub fn fetch(&self, font: &Font, report: &mut PipelineReport) -> BTreeMap<GlyphName, String> {
        let items = font
            .glyphs
            .values()
            .filter(|g| !report.failures.iter().any(|f| f.name == g.name))
            .map(|g| (g.name.clone(), g.source_uri.clone()))
            .collect();
        let results = self.fetch_pool.run(
            items,
            |name, uri: Option<String>| {
                let uri = uri.ok_or(FetchError::NoSource)?;
                let raw = self.fetcher.fetch(&uri)?;
                write(&self.paths.raw_file(name), &raw)?;
                Ok(raw)
            },
            GlyphError::Panic,
        );
        report.collect(Stage::Fetch, results)
    }

    pub fn normalize(
        &self,
        raw: BTreeMap<GlyphName, String>,
        report: &mut PipelineReport,
    ) -> BTreeMap<GlyphName, String> {
        let results = self.process_pool.run(
            raw.into_iter().collect(),
            |_, raw: String| Ok(self.normalizer.normalize(&raw)?),
            GlyphError::Panic,
        );
        report.collect(Stage::Normalize, results)
    }

    /// Optimize and write each icon to the icons dir.
    pub fn optimize(
        &self,
        normalized: BTreeMap<GlyphName, String>,
        report: &mut PipelineReport,
    ) -> BTreeMap<GlyphName, String> {
        let results = self.process_pool.run(
            normalized.into_iter().collect(),
            |name, svg: String| {
                let optimized = self.optimizer.optimize(&svg)?;
                write(&self.paths.icon_file(name), &optimized)?;
                Ok(optimized)
            },
            GlyphError::Panic,
        );
        report.collect(Stage::Optimize, results)
    }

    /// Take on the new content; glyphs not in `optimized` are left as they were.
    pub fn apply(
        &self,
        font: &mut Font,
        optimized: BTreeMap<GlyphName, String>,
        report: &mut PipelineReport,
    ) {
        for (name, content) in optimized {
            if let Some(glyph) = font.glyphs.get_mut(&name) {
                glyph.set_content(content);
                report.succeeded.push(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use iconir::{
        glyph::Glyph, optimize::SvgOptimizer, outline::OutlineNormalizer, types::CodePoint,
    };
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><!-- hi --><rect x="2" y="2" width="20" height="20"/></svg>"#;

    /// Serves svg from memory and remembers what was asked for.
    struct MemoryFetcher {
        icons: BTreeMap<String, String>,
        fetched: Mutex<Vec<String>>,
    }

    impl AssetFetcher for MemoryFetcher {
        fn fetch(&self, uri: &str) -> Result<String, FetchError> {
            self.fetched.lock().unwrap().push(uri.to_string());
            self.icons
                .get(uri)
                .cloned()
                .ok_or_else(|| FetchError::UnsupportedScheme(uri.to_string()))
        }
    }

    fn pipeline(temp_dir: &TempDir, icons: &[(&str, &str)]) -> GlyphPipeline {
        let fetcher = MemoryFetcher {
            icons: icons
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            fetched: Mutex::new(Vec::new()),
        };
        GlyphPipeline::new(
            PipelineConfig {
                fetch_concurrency: 4,
                process_concurrency: 2,
            },
            Paths::new(temp_dir.path(), "test"),
            Box::new(fetcher),
            Box::<OutlineNormalizer>::default(),
            Box::<SvgOptimizer>::default(),
        )
        .unwrap()
    }

    fn font(names: &[&str]) -> Font {
        let mut font = Font::new("test");
        for (i, name) in names.iter().enumerate() {
            let mut glyph =
                Glyph::pending(i.to_string(), (*name).into(), "c", Some(format!("mem:{name}")));
            glyph.code_point = Some(CodePoint::new(0xE001 + i as u32));
            font.glyphs.insert((*name).into(), glyph);
        }
        font
    }

    fn run(pipeline: &GlyphPipeline, font: &mut Font) -> PipelineReport {
        let mut report = PipelineReport::default();
        pipeline.prune(font, &mut report).unwrap();
        pipeline.snapshot(font, &mut report).unwrap();
        let raw = pipeline.fetch(font, &mut report);
        let normalized = pipeline.normalize(raw, &mut report);
        let optimized = pipeline.optimize(normalized, &mut report);
        pipeline.apply(font, optimized, &mut report);
        report
    }

    #[test]
    fn processes_every_glyph() {
        let _ = env_logger::builder().is_test(true).try_init();
        let temp_dir = tempdir().unwrap();
        let pipeline = pipeline(&temp_dir, &[("mem:a", SQUARE), ("mem:b", SQUARE)]);
        let mut font = font(&["a", "b"]);

        let report = run(&pipeline, &mut font);
        assert!(report.failures.is_empty(), "{:?}", report.failures);
        assert_eq!(vec![GlyphName::new("a"), GlyphName::new("b")], report.succeeded);
        assert_eq!(
            BTreeMap::from([("a".into(), None), ("b".into(), None)]),
            report.before
        );

        let content = font.glyphs["a"].content.clone().unwrap();
        assert!(content.contains(r#"viewBox="0 0 1000 1000""#), "{content}");
        assert!(!content.contains("<!--"));
        assert_eq!(
            content,
            fs::read_to_string(temp_dir.path().join("icons/a.svg")).unwrap()
        );
        assert_eq!(
            SQUARE,
            fs::read_to_string(temp_dir.path().join("raw/a.svg")).unwrap()
        );
    }

    #[test]
    fn failures_keep_prior_content() {
        let temp_dir = tempdir().unwrap();
        let pipeline = pipeline(&temp_dir, &[("mem:a", SQUARE), ("mem:b", "<svg><path")]);
        fs::create_dir_all(temp_dir.path().join("icons")).unwrap();
        fs::write(temp_dir.path().join("icons/b.svg"), "<svg>old</svg>").unwrap();
        let mut font = font(&["a", "b", "c"]);

        let report = run(&pipeline, &mut font);
        let failed: Vec<_> = report
            .failures
            .iter()
            .map(|f| (f.name.as_str(), f.stage))
            .collect();
        assert_eq!(vec![("c", Stage::Fetch), ("b", Stage::Normalize)], failed);
        assert_eq!(vec![GlyphName::new("a")], report.succeeded);
        assert_eq!(Some("<svg>old</svg>"), font.glyphs["b"].content.as_deref());
        assert_eq!(None, font.glyphs["c"].content);
        assert_eq!(Some(None), report.before.get("b").cloned());
    }

    #[test]
    fn before_is_the_saved_digest_not_the_file() {
        let temp_dir = tempdir().unwrap();
        let pipeline = pipeline(&temp_dir, &[("mem:a", "<svg><path")]);
        fs::create_dir_all(temp_dir.path().join("icons")).unwrap();
        fs::write(temp_dir.path().join("icons/a.svg"), "<svg>unsaved</svg>").unwrap();
        let mut font = font(&["a"]);
        font.glyphs.get_mut("a").unwrap().digest = Some(ContentDigest::of("<svg>saved</svg>"));

        let report = run(&pipeline, &mut font);
        assert_eq!(
            Some(Some(ContentDigest::of("<svg>saved</svg>"))),
            report.before.get("a").cloned()
        );
        assert_eq!(Some(ContentDigest::of("<svg>unsaved</svg>")), font.glyphs["a"].digest);
    }

    #[test]
    fn stale_files_are_pruned() {
        let temp_dir = tempdir().unwrap();
        let pipeline = pipeline(&temp_dir, &[("mem:a", SQUARE)]);
        for dir in ["icons", "raw"] {
            fs::create_dir_all(temp_dir.path().join(dir)).unwrap();
            fs::write(temp_dir.path().join(dir).join("gone.svg"), "<svg/>").unwrap();
            fs::write(temp_dir.path().join(dir).join("notes.txt"), "keep").unwrap();
        }
        let mut font = font(&["a"]);

        let report = run(&pipeline, &mut font);
        assert_eq!(
            vec![
                temp_dir.path().join("icons/gone.svg"),
                temp_dir.path().join("raw/gone.svg")
            ],
            report.pruned
        );
        assert!(temp_dir.path().join("icons/notes.txt").exists());
        assert!(temp_dir.path().join("icons/a.svg").exists());
    }

    #[test]
    fn unchanged_source_gives_unchanged_content() {
        let temp_dir = tempdir().unwrap();
        let pipeline = pipeline(&temp_dir, &[("mem:a", SQUARE)]);
        let mut font = font(&["a"]);
        run(&pipeline, &mut font);
        let first = font.glyphs["a"].digest;

        let report = run(&pipeline, &mut font);
        assert_eq!(Some(first), report.before.get("a").cloned());
        assert_eq!(first, font.glyphs["a"].digest);
    }
}
