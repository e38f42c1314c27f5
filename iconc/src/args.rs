//! Command line arguments

use std::path::PathBuf;

use clap::Parser;
use iconir::font::OutputType;
use serde::{Deserialize, Serialize};

use crate::config::Flags;

/// Which icon font shall we build?
#[derive(Serialize, Deserialize, Parser, Debug, Clone, PartialEq)]
pub struct Args {
    /// A yaml font definition. Anything also given on the command line is overridden.
    #[arg(short, long)]
    pub font: Option<PathBuf>,

    /// Name of the font, used for file names and the font family
    #[arg(short, long)]
    pub name: Option<String>,

    /// The catalog document listing every icon
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Where fonts are written; each font gets its own directory inside.
    #[arg(short, long)]
    #[clap(default_value = "build")]
    pub output_dir: PathBuf,

    /// Comma separated formats to produce in addition to svg: ttf, woff, woff2
    #[arg(short, long, value_delimiter = ',')]
    pub types: Option<Vec<OutputType>>,

    /// The first code point to hand out, in hex, e.g. e001
    #[arg(long)]
    pub pua_floor: Option<String>,

    /// How many icons may be fetched at once
    #[arg(long)]
    pub fetch_concurrency: Option<usize>,

    /// How many icons may be normalized or optimized at once
    #[arg(long)]
    pub process_concurrency: Option<usize>,

    /// Encode and save even if some icons failed.
    ///
    /// Failed icons keep whatever content they had before the run.
    #[arg(long)]
    #[clap(default_value = "false")]
    pub allow_partial: bool,

    /// Whether to write an svg sprite of every icon
    #[arg(long)]
    #[clap(default_value = "false")]
    pub emit_sprite: bool,

    /// Whether to write a css stylesheet with a class per icon
    #[arg(long)]
    #[clap(default_value = "false")]
    pub emit_stylesheet: bool,

    /// Sync and build, but leave the manifest alone.
    #[arg(long)]
    #[clap(default_value = "false")]
    pub dry_run: bool,
}

impl Args {
    /// Collect various relevant flags into a [`Flags`] object.
    pub fn flags(&self) -> Flags {
        let mut flags = Flags::default();

        flags.set(Flags::ALLOW_PARTIAL, self.allow_partial);
        flags.set(Flags::EMIT_SPRITE, self.emit_sprite);
        flags.set(Flags::EMIT_STYLESHEET, self.emit_stylesheet);
        flags.set(Flags::DRY_RUN, self.dry_run);

        flags
    }

    /// Args for a font that needs no definition file.
    pub fn new(name: &str, catalog: PathBuf, output_dir: PathBuf) -> Args {
        Args {
            font: None,
            name: Some(name.to_string()),
            catalog: Some(catalog),
            output_dir,
            types: None,
            pua_floor: None,
            fetch_concurrency: None,
            process_concurrency: None,
            allow_partial: false,
            emit_sprite: false,
            emit_stylesheet: false,
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_types() {
        let args = Args::parse_from([
            "iconc",
            "--name",
            "icons",
            "--catalog",
            "catalog.json",
            "--types",
            "ttf,WOFF2",
            "--dry-run",
        ]);
        assert_eq!(
            Some(vec![OutputType::Ttf, OutputType::Woff2]),
            args.types
        );
        assert_eq!(PathBuf::from("build"), args.output_dir);
        assert_eq!(Flags::DRY_RUN, args.flags());
    }

    #[test]
    fn bad_type() {
        assert!(Args::try_parse_from(["iconc", "--types", "otf"]).is_err());
    }

    #[test]
    fn default_flags() {
        let args = Args::new("icons", "c.json".into(), "out".into());
        assert_eq!(Flags::default(), args.flags());
    }
}
