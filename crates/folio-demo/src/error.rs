#![forbid(unsafe_code)]

use std::io;
use std::path::PathBuf;

use folio_runtime::ConfigError;

/// Everything that can stop the demo.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("failed to read lesson {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid lesson document: {0}")]
    Document(#[from] toml::de::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no stepper matches '{0}'")]
    UnknownTarget(String),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
