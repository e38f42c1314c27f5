//! An icon font compiler that never renumbers an icon.

mod args;
mod config;
pub mod emit;
mod error;
pub mod pipeline;
pub mod source;
pub mod stage;
pub mod tracker;

pub use args::Args;
pub use config::{Config, FontDefinition, Flags};
pub use error::Error;

use std::{
    fmt::Display,
    fs, io,
    path::{Path, PathBuf},
};

use iconbe::encode::{EncodedFont, FontEncoder};
use iconir::{
    allocate::CodePointAllocator,
    changelog::Changelog,
    font::Font,
    manifest::ManifestStore,
    optimize::SvgOptimizer,
    outline::OutlineNormalizer,
    paths::Paths,
    reconcile::reconcile,
};
use log::{debug, info};
use semver::Version;

use emit::ArtifactEmitter;
use pipeline::{GlyphFailure, GlyphPipeline, PipelineReport};
use source::{AssetFetcher, CatalogSource, JsonCatalog, LocalFetcher};
use tracker::ChangeTracker;

pub fn require_dir(dir: &Path) -> Result<PathBuf, Error> {
    if dir.exists() && !dir.is_dir() {
        return Err(Error::ExpectedDirectory(dir.to_path_buf()));
    }
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| Error::FileIo {
            path: dir.to_path_buf(),
            source,
        })?
    }
    debug!("require_dir {:?}", dir);
    Ok(dir.to_path_buf())
}

/// Where a run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Reconciling,
    Allocating,
    Fetching,
    Normalizing,
    Optimizing,
    TrackingChanges,
    Encoding,
    Persisting,
    Done,
    Failed,
}

impl Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// What [`Compiler::build`] produced.
#[derive(Debug)]
pub struct Artifacts {
    pub encoded: EncodedFont,
    /// Files written, webfonts first.
    pub files: Vec<PathBuf>,
    pub report: PipelineReport,
}

/// The outcome of a whole run.
#[derive(Debug)]
pub struct RunSummary {
    pub changelog: Changelog,
    pub artifacts: Vec<PathBuf>,
    /// Only non-empty if partial results were allowed.
    pub failures: Vec<GlyphFailure>,
    /// The version as of the end of the run.
    pub version: Version,
    /// Whether the manifest was written.
    pub persisted: bool,
}

impl RunSummary {
    /// Release notes for the run.
    pub fn release_notes(&self) -> String {
        format!("{}", self.changelog)
    }
}

/// Compiles one font.
///
/// Collaborators are handed in at construction; the compiler owns the font
/// for the duration of the run and is its only writer.
pub struct Compiler {
    config: Config,
    store: ManifestStore,
    catalog: Box<dyn CatalogSource>,
    allocator: CodePointAllocator,
    pipeline: GlyphPipeline,
    tracker: ChangeTracker,
    encoder: FontEncoder,
    emitter: ArtifactEmitter,
    font: Option<Font>,
    states: Vec<RunState>,
}

impl Compiler {
    pub fn new(
        config: Config,
        catalog: Box<dyn CatalogSource>,
        fetcher: Box<dyn AssetFetcher>,
    ) -> Result<Compiler, Error> {
        let paths = Paths::new(&config.font_dir, &config.font_name);
        let pipeline = GlyphPipeline::new(
            config.pipeline,
            paths.clone(),
            fetcher,
            Box::<OutlineNormalizer>::default(),
            Box::<SvgOptimizer>::default(),
        )?;
        Ok(Compiler {
            store: ManifestStore::new(paths.manifest_file()),
            catalog,
            allocator: CodePointAllocator::new(config.pua_floor)?,
            pipeline,
            tracker: ChangeTracker,
            encoder: FontEncoder::new(config.encoder.clone()),
            emitter: ArtifactEmitter::new(paths, config.flags),
            font: None,
            states: vec![RunState::Idle],
            config,
        })
    }

    /// A compiler reading the configured json catalog and fetching icons
    /// relative to it.
    pub fn from_config(config: Config) -> Result<Compiler, Error> {
        let base_dir = match config.catalog.parent() {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };
        let catalog = JsonCatalog::new(&config.catalog);
        Compiler::new(
            config,
            Box::new(catalog),
            Box::new(LocalFetcher::new(base_dir)),
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn font(&self) -> Option<&Font> {
        self.font.as_ref()
    }

    pub fn state(&self) -> RunState {
        self.states.last().copied().unwrap_or(RunState::Idle)
    }

    /// Every state entered so far, in order.
    pub fn states(&self) -> &[RunState] {
        &self.states
    }

    fn transition(&mut self, to: RunState) {
        info!("{}: {} => {to}", self.config.font_name, self.state());
        self.states.push(to);
    }

    fn failed<T>(&mut self, result: Result<T, Error>) -> Result<T, Error> {
        if result.is_err() {
            self.transition(RunState::Failed);
        }
        result
    }

    fn take_font(&mut self, operation: &'static str) -> Result<Font, Error> {
        self.font.take().ok_or(Error::OutOfOrder(operation))
    }

    /// Read the manifest; a font with no manifest starts empty.
    pub fn load(&mut self) -> Result<(), Error> {
        let result = self.store.load(&self.config.font_name).map_err(Error::from);
        let mut font = self.failed(result)?;
        font.set_output_types(self.config.output_types.iter().copied());
        info!(
            "Loaded {} at {} with {} glyphs",
            font.name,
            font.version,
            font.glyphs.len()
        );
        self.font = Some(font);
        Ok(())
    }

    /// Reconcile the font against the catalog and number new glyphs.
    ///
    /// Returns the changes not yet saved. Fails without touching the font if
    /// the catalog is unusable.
    pub fn sync(&mut self) -> Result<Changelog, Error> {
        let mut font = self.take_font("load")?;
        let result = self.sync_font(&mut font);
        self.font = Some(font);
        self.failed(result)
    }

    fn sync_font(&mut self, font: &mut Font) -> Result<Changelog, Error> {
        self.transition(RunState::Reconciling);
        let entries = self.catalog.entries()?;
        reconcile(font, &entries)?;

        self.transition(RunState::Allocating);
        self.allocator.allocate(font)?;
        Ok(font.changelog.clone())
    }

    /// Run every glyph through the pipeline, settle the changelog, encode, and
    /// write the artifacts.
    pub fn build(&mut self) -> Result<Artifacts, Error> {
        let mut font = self.take_font("load")?;
        let result = self.build_font(&mut font);
        self.font = Some(font);
        self.failed(result)
    }

    fn build_font(&mut self, font: &mut Font) -> Result<Artifacts, Error> {
        let mut report = PipelineReport::default();

        self.transition(RunState::Fetching);
        self.pipeline.prune(font, &mut report)?;
        self.pipeline.snapshot(font, &mut report)?;
        let raw = self.pipeline.fetch(font, &mut report);

        self.transition(RunState::Normalizing);
        let normalized = self.pipeline.normalize(raw, &mut report);

        self.transition(RunState::Optimizing);
        let optimized = self.pipeline.optimize(normalized, &mut report);
        self.pipeline.apply(font, optimized, &mut report);

        if !report.failures.is_empty() && !self.config.flags.contains(Flags::ALLOW_PARTIAL) {
            return Err(Error::GlyphsFailed(std::mem::take(&mut report.failures)));
        }

        self.transition(RunState::TrackingChanges);
        self.tracker.finalize(font, &report.before);

        self.transition(RunState::Encoding);
        let encoded = self.encoder.encode(font)?;
        let files = self.emitter.emit(font, &encoded)?;
        Ok(Artifacts {
            encoded,
            files,
            report,
        })
    }

    /// Bump the version and write the manifest, if anything changed.
    ///
    /// Returns whether the manifest was written. Nothing is written on a dry run.
    pub fn save(&mut self) -> Result<bool, Error> {
        let mut font = self.take_font("load")?;
        let result = self.save_font(&mut font);
        self.font = Some(font);
        let persisted = self.failed(result)?;
        self.transition(RunState::Done);
        Ok(persisted)
    }

    fn save_font(&mut self, font: &mut Font) -> Result<bool, Error> {
        if font.changelog.is_empty() {
            info!("No changes to {}, leaving the manifest alone", font.name);
            return Ok(false);
        }
        if self.config.flags.contains(Flags::DRY_RUN) {
            info!(
                "Dry run, not saving {} changes to {}",
                font.changelog.len(),
                font.name
            );
            return Ok(false);
        }
        self.transition(RunState::Persisting);
        let prior = font.version.clone();
        font.bump_version_if_changed();
        if let Err(e) = self.store.save(font) {
            font.version = prior;
            return Err(e.into());
        }
        info!("Saved {} at {}", font.name, font.version);
        font.changelog.clear();
        Ok(true)
    }

    /// load, sync, build, then save.
    pub fn run(&mut self) -> Result<RunSummary, Error> {
        self.load()?;
        self.sync()?;
        let artifacts = self.build()?;
        let changelog = self
            .font
            .as_ref()
            .map(|f| f.changelog.clone())
            .unwrap_or_default();
        let persisted = self.save()?;
        let version = self
            .font
            .as_ref()
            .map(|f| f.version.clone())
            .unwrap_or_else(|| Version::new(0, 0, 0));
        Ok(RunSummary {
            changelog,
            artifacts: artifacts.files,
            failures: artifacts.report.failures,
            version,
            persisted,
        })
    }
}

/// Write to stdout, mapping failure to [`Error::StdioWriteFail`].
pub fn print(out: &mut impl io::Write, text: impl Display) -> Result<(), Error> {
    writeln!(out, "{text}").map_err(Error::StdioWriteFail)
}

#[cfg(test)]
mod tests {
    use iconir::{
        catalog::CatalogEntry,
        changelog::ChangeOp,
        font::OutputType,
        types::CodePoint,
    };
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    use super::*;

    const ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><circle cx="12" cy="12" r="10"/></svg>"#;

    struct Fixture {
        temp_dir: TempDir,
    }

    impl Fixture {
        fn new() -> Fixture {
            let temp_dir = tempdir().unwrap();
            fs::create_dir(temp_dir.path().join("src")).unwrap();
            Fixture { temp_dir }
        }

        fn icon(&self, name: &str, svg: &str) {
            fs::write(self.temp_dir.path().join(format!("src/{name}.svg")), svg).unwrap();
        }

        fn config(&self) -> Config {
            Config::new(Args::new(
                "test",
                self.temp_dir.path().join("catalog.json"),
                self.temp_dir.path().join("out"),
            ))
            .unwrap()
        }

        fn compiler(&self, config: Config, names: &[&str]) -> Compiler {
            let entries: Vec<_> = names
                .iter()
                .map(|n| CatalogEntry::new(*n, *n, "c", Some(format!("src/{n}.svg"))))
                .collect();
            Compiler::new(
                config,
                Box::new(entries),
                Box::new(LocalFetcher::new(self.temp_dir.path())),
            )
            .unwrap()
        }
    }

    #[test]
    fn state_sequence_with_changes() {
        let _ = env_logger::builder().is_test(true).try_init();
        let fixture = Fixture::new();
        fixture.icon("home", ICON);
        let mut compiler = fixture.compiler(fixture.config(), &["home"]);
        let summary = compiler.run().unwrap();
        assert!(summary.persisted);
        assert_eq!(
            vec![
                RunState::Idle,
                RunState::Reconciling,
                RunState::Allocating,
                RunState::Fetching,
                RunState::Normalizing,
                RunState::Optimizing,
                RunState::TrackingChanges,
                RunState::Encoding,
                RunState::Persisting,
                RunState::Done,
            ],
            compiler.states()
        );
    }

    #[test]
    fn persisting_is_skipped_without_changes() {
        let fixture = Fixture::new();
        fixture.icon("home", ICON);
        fixture.compiler(fixture.config(), &["home"]).run().unwrap();

        let mut compiler = fixture.compiler(fixture.config(), &["home"]);
        let summary = compiler.run().unwrap();
        assert!(!summary.persisted);
        assert!(summary.changelog.is_empty());
        assert_eq!(Version::new(0, 1, 0), summary.version);
        assert!(!compiler.states().contains(&RunState::Persisting));
        assert_eq!(RunState::Done, compiler.state());
    }

    #[test]
    fn failed_glyphs_abort_before_encoding() {
        let fixture = Fixture::new();
        fixture.icon("home", ICON);
        let config = fixture.config();
        let manifest = config.font_dir.join("manifest.json");
        let mut compiler = fixture.compiler(config, &["home", "missing"]);

        let Err(Error::GlyphsFailed(failures)) = compiler.run() else {
            panic!("expected glyph failures");
        };
        assert_eq!(1, failures.len());
        assert_eq!("missing", failures[0].name.as_str());
        assert_eq!(RunState::Failed, compiler.state());
        assert!(!compiler.states().contains(&RunState::Encoding));
        assert!(!manifest.exists());
    }

    #[test]
    fn partial_results_when_allowed() {
        let fixture = Fixture::new();
        fixture.icon("home", ICON);
        let mut config = fixture.config();
        config.flags |= Flags::ALLOW_PARTIAL;
        let mut compiler = fixture.compiler(config, &["home", "missing"]);

        let summary = compiler.run().unwrap();
        assert!(summary.persisted);
        assert_eq!(1, summary.failures.len());
        // missing still holds its number
        let font = compiler.font().unwrap();
        assert_eq!(Some(CodePoint::new(0xE002)), font.glyphs["missing"].code_point);
        assert_eq!(None, font.glyphs["missing"].content);
    }

    #[test]
    fn dry_run_never_saves() {
        let fixture = Fixture::new();
        fixture.icon("home", ICON);
        let mut config = fixture.config();
        config.flags |= Flags::DRY_RUN;
        let manifest = config.font_dir.join("manifest.json");
        let mut compiler = fixture.compiler(config, &["home"]);

        let summary = compiler.run().unwrap();
        assert!(!summary.persisted);
        assert_eq!(vec![(ChangeOp::Add, "home")], summary.changelog.summary());
        assert!(!manifest.exists());
    }

    #[test]
    fn operations_need_load_first() {
        let fixture = Fixture::new();
        let mut compiler = fixture.compiler(fixture.config(), &[]);
        assert!(matches!(compiler.sync(), Err(Error::OutOfOrder("load"))));
        assert!(matches!(compiler.build(), Err(Error::OutOfOrder("load"))));
    }

    #[test]
    fn duplicate_names_fail_sync() {
        let fixture = Fixture::new();
        let mut compiler = fixture.compiler(fixture.config(), &["x", "x"]);
        compiler.load().unwrap();
        assert!(matches!(
            compiler.sync(),
            Err(Error::FontIrError(iconir::error::Error::DuplicateGlyphName(..)))
        ));
        assert_eq!(RunState::Failed, compiler.state());
        assert!(compiler.font().unwrap().glyphs.is_empty());
    }

    /// A json catalog and its icons on disk, compiled the way the binary does.
    struct TestCompile {
        temp_dir: TempDir,
        types: Vec<OutputType>,
    }

    impl TestCompile {
        fn new() -> TestCompile {
            let temp_dir = tempdir().unwrap();
            fs::create_dir(temp_dir.path().join("svg")).unwrap();
            TestCompile {
                temp_dir,
                types: vec![OutputType::Ttf, OutputType::Woff, OutputType::Woff2],
            }
        }

        fn square(size: u32) -> String {
            format!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M2 2 L{size} 2 L{size} {size} L2 {size} Z"/></svg>"#
            )
        }

        /// Lists `names` in the catalog, each backed by a square icon.
        fn catalog(&self, names: &[(&str, &str)]) {
            let components: Vec<_> = names
                .iter()
                .map(|(id, name)| serde_json::json!({"id": id, "name": name}))
                .collect();
            let images: serde_json::Map<String, serde_json::Value> = names
                .iter()
                .map(|(id, name)| {
                    (
                        id.to_string(),
                        serde_json::Value::from(format!("svg/{name}.svg")),
                    )
                })
                .collect();
            for (_, name) in names {
                let file = self.temp_dir.path().join(format!("svg/{name}.svg"));
                if !file.exists() {
                    fs::write(file, Self::square(20)).unwrap();
                }
            }
            let doc = serde_json::json!({
                "pages": [{"name": "icons", "components": components}],
                "images": images,
            });
            fs::write(self.catalog_file(), doc.to_string()).unwrap();
        }

        fn catalog_file(&self) -> PathBuf {
            self.temp_dir.path().join("catalog.json")
        }

        fn out_dir(&self) -> PathBuf {
            self.temp_dir.path().join("build")
        }

        fn paths(&self) -> Paths {
            Paths::new(&self.out_dir().join("brand"), "brand")
        }

        fn compile(&self) -> Result<(Compiler, RunSummary), Error> {
            self.compile_with(|_| {})
        }

        fn dry_run(&self) -> Result<(Compiler, RunSummary), Error> {
            self.compile_with(|args| args.dry_run = true)
        }

        fn compile_with(
            &self,
            adjust: impl FnOnce(&mut Args),
        ) -> Result<(Compiler, RunSummary), Error> {
            let mut args = Args::new("brand", self.catalog_file(), self.out_dir());
            args.types = Some(self.types.clone());
            args.emit_stylesheet = true;
            adjust(&mut args);
            let mut compiler = Compiler::from_config(Config::new(args)?)?;
            let summary = compiler.run()?;
            Ok((compiler, summary))
        }

        fn code_points(&self) -> Vec<(String, u32)> {
            let font = ManifestStore::new(self.paths().manifest_file())
                .load("brand")
                .unwrap();
            font.glyphs_by_code_point()
                .into_iter()
                .map(|g| (g.name.to_string(), g.code_point.unwrap().to_u32()))
                .collect()
        }
    }

    #[test]
    fn code_points_are_never_reused() {
        let _ = env_logger::builder().is_test(true).try_init();
        let test = TestCompile::new();

        test.catalog(&[("1", "home"), ("2", "star")]);
        test.compile().unwrap();
        assert_eq!(
            vec![("home".to_string(), 0xE001), ("star".to_string(), 0xE002)],
            test.code_points()
        );

        test.catalog(&[("1", "home"), ("2", "star"), ("3", "gear")]);
        test.compile().unwrap();
        assert_eq!(Some(&("gear".to_string(), 0xE003)), test.code_points().last());

        test.catalog(&[("1", "home"), ("3", "gear"), ("4", "moon")]);
        let (_, summary) = test.compile().unwrap();
        assert_eq!(
            vec![(ChangeOp::Add, "moon"), (ChangeOp::Delete, "star")],
            summary.changelog.summary()
        );
        assert_eq!(
            vec![
                ("home".to_string(), 0xE001),
                ("gear".to_string(), 0xE003),
                ("moon".to_string(), 0xE004),
            ],
            test.code_points()
        );
        assert_eq!(Version::new(0, 3, 0), summary.version);
        assert!(!test.paths().icon_file(&"star".into()).exists());
    }

    #[test]
    fn compiling_twice_changes_nothing() {
        let test = TestCompile::new();
        test.catalog(&[("1", "home"), ("2", "star")]);
        test.compile().unwrap();
        let manifest = fs::read(test.paths().manifest_file()).unwrap();
        let woff2 = fs::read(test.paths().webfont_file(OutputType::Woff2)).unwrap();

        let (compiler, summary) = test.compile().unwrap();
        assert!(summary.changelog.is_empty());
        assert!(!summary.persisted);
        assert!(!compiler.states().contains(&RunState::Persisting));
        assert_eq!(manifest, fs::read(test.paths().manifest_file()).unwrap());
        assert_eq!(
            woff2,
            fs::read(test.paths().webfont_file(OutputType::Woff2)).unwrap()
        );
    }

    #[test]
    fn rename_is_delete_then_add() {
        let test = TestCompile::new();
        test.catalog(&[("1", "home"), ("2", "star")]);
        test.compile().unwrap();

        test.catalog(&[("1", "house"), ("2", "star")]);
        let (_, summary) = test.compile().unwrap();
        assert_eq!(
            vec![(ChangeOp::Delete, "home"), (ChangeOp::Add, "house")],
            summary.changelog.summary()
        );
        assert_eq!(
            vec![("star".to_string(), 0xE002), ("house".to_string(), 0xE003)],
            test.code_points()
        );
    }

    #[test]
    fn edited_icon_is_recorded() {
        let test = TestCompile::new();
        test.catalog(&[("1", "home"), ("2", "star")]);
        test.compile().unwrap();

        fs::write(
            test.temp_dir.path().join("svg/star.svg"),
            TestCompile::square(12),
        )
        .unwrap();
        let (_, summary) = test.compile().unwrap();
        assert_eq!(
            vec![(ChangeOp::Edit, "star")],
            summary.changelog.summary()
        );
        assert_eq!(Version::new(0, 2, 0), summary.version);
    }

    #[test]
    fn dry_run_does_not_hide_an_edit() {
        let test = TestCompile::new();
        test.catalog(&[("1", "star")]);
        test.compile().unwrap();

        fs::write(
            test.temp_dir.path().join("svg/star.svg"),
            TestCompile::square(12),
        )
        .unwrap();
        let (_, summary) = test.dry_run().unwrap();
        assert_eq!(vec![(ChangeOp::Edit, "star")], summary.changelog.summary());
        assert!(!summary.persisted);

        let (_, summary) = test.compile().unwrap();
        assert_eq!(vec![(ChangeOp::Edit, "star")], summary.changelog.summary());
        assert!(summary.persisted);
        assert_eq!(Version::new(0, 2, 0), summary.version);
    }

    #[test]
    fn aborted_run_does_not_hide_an_edit() {
        let test = TestCompile::new();
        test.catalog(&[("1", "star")]);
        test.compile().unwrap();

        fs::write(
            test.temp_dir.path().join("svg/star.svg"),
            TestCompile::square(12),
        )
        .unwrap();
        fs::write(test.temp_dir.path().join("svg/broken.svg"), "not svg").unwrap();
        test.catalog(&[("1", "star"), ("2", "broken")]);
        assert!(matches!(test.compile(), Err(Error::GlyphsFailed(..))));

        test.catalog(&[("1", "star")]);
        let (_, summary) = test.compile().unwrap();
        assert_eq!(vec![(ChangeOp::Edit, "star")], summary.changelog.summary());
        assert_eq!(Version::new(0, 2, 0), summary.version);
        assert_eq!(vec![("star".to_string(), 0xE001)], test.code_points());
    }

    #[test]
    fn unchanged_catalog_after_dry_run_changes_nothing() {
        let test = TestCompile::new();
        test.catalog(&[("1", "home"), ("2", "star")]);
        test.compile().unwrap();
        let manifest = fs::read(test.paths().manifest_file()).unwrap();

        let (_, summary) = test.dry_run().unwrap();
        assert!(summary.changelog.is_empty());

        let (compiler, summary) = test.compile().unwrap();
        assert!(summary.changelog.is_empty());
        assert!(!compiler.states().contains(&RunState::Persisting));
        assert_eq!(manifest, fs::read(test.paths().manifest_file()).unwrap());
    }

    #[test]
    fn duplicate_names_leave_the_manifest_alone() {
        let test = TestCompile::new();
        test.catalog(&[("1", "home"), ("2", "star")]);
        test.compile().unwrap();
        let manifest = fs::read(test.paths().manifest_file()).unwrap();

        test.catalog(&[("1", "home"), ("2", "star"), ("3", "star")]);
        assert!(matches!(
            test.compile(),
            Err(Error::FontIrError(iconir::error::Error::DuplicateGlyphName(..)))
        ));
        assert_eq!(manifest, fs::read(test.paths().manifest_file()).unwrap());
    }

    #[test]
    fn path_like_names_are_rejected() {
        let test = TestCompile::new();
        test.catalog(&[("1", "home")]);
        test.compile().unwrap();
        let manifest = fs::read(test.paths().manifest_file()).unwrap();

        fs::create_dir_all(test.temp_dir.path().join("svg/sub")).unwrap();
        test.catalog(&[("1", "home"), ("2", "sub/../../x")]);
        assert!(matches!(
            test.compile(),
            Err(Error::FontIrError(iconir::error::Error::InvalidGlyphName { .. }))
        ));
        assert_eq!(manifest, fs::read(test.paths().manifest_file()).unwrap());
        assert!(!test.out_dir().join("brand/x.svg").exists());
    }

    #[test]
    fn identical_input_gives_identical_fonts() {
        let first = TestCompile::new();
        let second = TestCompile::new();
        for test in [&first, &second] {
            test.catalog(&[("1", "home"), ("2", "star"), ("3", "gear")]);
            test.compile().unwrap();
        }
        for output_type in [
            OutputType::Svg,
            OutputType::Ttf,
            OutputType::Woff,
            OutputType::Woff2,
        ] {
            assert_eq!(
                fs::read(first.paths().webfont_file(output_type)).unwrap(),
                fs::read(second.paths().webfont_file(output_type)).unwrap(),
                "{output_type} differs"
            );
        }
        assert_eq!(
            fs::read_to_string(first.paths().stylesheet_file()).unwrap(),
            fs::read_to_string(second.paths().stylesheet_file()).unwrap(),
        );
    }

    #[test]
    fn compiled_font_maps_every_icon() {
        use skrifa::{FontRef, MetadataProvider};

        let test = TestCompile::new();
        test.catalog(&[("1", "home"), ("2", "star")]);
        test.compile().unwrap();

        let ttf = fs::read(test.paths().webfont_file(OutputType::Ttf)).unwrap();
        let font = FontRef::new(&ttf).unwrap();
        let charmap = font.charmap();
        assert!(charmap.map(0xE001u32).is_some());
        assert!(charmap.map(0xE002u32).is_some());
        assert!(charmap.map(0xE003u32).is_none());
    }
}
