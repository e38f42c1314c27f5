//! Settings for a single compilation run

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use bitflags::bitflags;
use iconbe::encode::EncoderConfig;
use iconir::{
    font::OutputType,
    types::{CodePoint, DEFAULT_PUA_FLOOR},
};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{pipeline::PipelineConfig, Args, Error};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Flags: u32 {
        /// Carry on to encode and save when some icons failed
        const ALLOW_PARTIAL = 0b0001;
        const EMIT_SPRITE = 0b0010;
        const EMIT_STYLESHEET = 0b0100;
        /// Never write the manifest
        const DRY_RUN = 0b1000;
    }
}

/// A font described in yaml.
///
/// Relative paths are relative to the definition file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FontDefinition {
    pub name: Option<String>,
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub types: Vec<OutputType>,
    pub pua_floor: Option<String>,
    pub fetch_concurrency: Option<usize>,
    pub process_concurrency: Option<usize>,
    #[serde(default)]
    pub allow_partial: bool,
    #[serde(default)]
    pub emit_sprite: bool,
    #[serde(default)]
    pub emit_stylesheet: bool,
}

impl FontDefinition {
    pub fn load(path: &Path) -> Result<FontDefinition, Error> {
        let yml = fs::read_to_string(path).map_err(|source| Error::FileIo {
            path: path.to_path_buf(),
            source,
        })?;
        let mut definition: FontDefinition =
            serde_yaml::from_str(&yml).map_err(|source| Error::BadFontDefinition {
                path: path.to_path_buf(),
                source,
            })?;
        if let (Some(catalog), Some(dir)) = (definition.catalog.as_mut(), path.parent()) {
            if catalog.is_relative() {
                *catalog = dir.join(&*catalog);
            }
        }
        Ok(definition)
    }
}

/// Accepts "e001", "0xe001" or "U+E001".
fn parse_code_point(raw: &str) -> Result<CodePoint, Error> {
    let trimmed = raw.trim();
    let digits = ["0x", "0X", "U+", "u+"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);
    u32::from_str_radix(digits, 16)
        .map(CodePoint::new)
        .map_err(|_| Error::InvalidSetting {
            name: "pua-floor",
            value: raw.to_string(),
        })
}

fn concurrency(name: &'static str, value: Option<usize>, default: usize) -> Result<usize, Error> {
    match value {
        Some(0) => Err(Error::InvalidSetting {
            name,
            value: "0".to_string(),
        }),
        Some(n) => Ok(n),
        None => Ok(default),
    }
}

/// Everything a run needs, resolved once up front.
///
/// Built from [`Args`] and an optional [`FontDefinition`]; arguments win over
/// the definition, boolean flags are set if either sets them.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub args: Args,
    pub font_name: String,
    pub catalog: PathBuf,
    /// Where this font's manifest, icons and webfonts live.
    pub font_dir: PathBuf,
    pub output_types: BTreeSet<OutputType>,
    pub pua_floor: CodePoint,
    pub pipeline: PipelineConfig,
    pub encoder: EncoderConfig,
    pub flags: Flags,
}

impl Config {
    /// Create a new config from the provided cli arguments
    pub fn new(args: Args) -> Result<Config, Error> {
        let definition = match &args.font {
            Some(path) => FontDefinition::load(path)?,
            None => FontDefinition::default(),
        };
        Config::resolve(args, definition)
    }

    fn resolve(args: Args, definition: FontDefinition) -> Result<Config, Error> {
        let font_name = args
            .name
            .clone()
            .or(definition.name)
            .filter(|n| !n.trim().is_empty())
            .ok_or(Error::MissingSetting("font name"))?;
        let catalog = args
            .catalog
            .clone()
            .or(definition.catalog)
            .ok_or(Error::MissingSetting("catalog"))?;
        let font_dir = args.output_dir.join(&font_name);

        let mut output_types: BTreeSet<_> = match &args.types {
            Some(types) => types.iter().copied().collect(),
            None => definition.types.into_iter().collect(),
        };
        output_types.insert(OutputType::Svg);

        let pua_floor = match args.pua_floor.as_ref().or(definition.pua_floor.as_ref()) {
            Some(raw) => parse_code_point(raw)?,
            None => DEFAULT_PUA_FLOOR,
        };

        let defaults = PipelineConfig::default();
        let pipeline = PipelineConfig {
            fetch_concurrency: concurrency(
                "fetch-concurrency",
                args.fetch_concurrency.or(definition.fetch_concurrency),
                defaults.fetch_concurrency,
            )?,
            process_concurrency: concurrency(
                "process-concurrency",
                args.process_concurrency.or(definition.process_concurrency),
                defaults.process_concurrency,
            )?,
        };

        let mut flags = args.flags();
        flags.set(Flags::ALLOW_PARTIAL, flags.contains(Flags::ALLOW_PARTIAL) || definition.allow_partial);
        flags.set(Flags::EMIT_SPRITE, flags.contains(Flags::EMIT_SPRITE) || definition.emit_sprite);
        flags.set(
            Flags::EMIT_STYLESHEET,
            flags.contains(Flags::EMIT_STYLESHEET) || definition.emit_stylesheet,
        );

        let config = Config {
            args,
            font_name,
            catalog,
            font_dir,
            output_types,
            pua_floor,
            pipeline,
            encoder: EncoderConfig::default(),
            flags,
        };
        debug!("{config:#?}");
        Ok(config)
    }
}
