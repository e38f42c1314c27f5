use std::{io, path::PathBuf};

use thiserror::Error;

use crate::pipeline::GlyphFailure;

#[derive(Debug, Error)]
pub enum Error {
    #[error("'{0}' exists but is not a directory")]
    ExpectedDirectory(PathBuf),
    #[error("io failed for '{path}': '{source}'")]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write to stdout or stderr: '{0}'")]
    StdioWriteFail(#[source] io::Error),
    #[error(transparent)]
    YamlSerError(#[from] serde_yaml::Error),
    #[error("Bad font definition '{path}': {source}")]
    BadFontDefinition {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("No {0} given, pass it as an argument or in the font definition")]
    MissingSetting(&'static str),
    #[error("Invalid setting {name}='{value}'")]
    InvalidSetting { name: &'static str, value: String },
    #[error("Malformed catalog '{path}': {reason}")]
    MalformedCatalog { path: PathBuf, reason: String },
    #[error(transparent)]
    FontIrError(#[from] iconir::error::Error),
    #[error(transparent)]
    Encoding(#[from] iconbe::error::Error),
    #[error("{} icon(s) failed", .0.len())]
    GlyphsFailed(Vec<GlyphFailure>),
    #[error("{0} must come first")]
    OutOfOrder(&'static str),
    #[error("Unable to start a worker pool: {0}")]
    ThreadPool(String),
    #[error("A task panicked: '{0}'")]
    Panic(String),
}
