use std::path::PathBuf;

/// error type for snaptree operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no repository directory or repo data provided")]
    NoRepoData,

    #[error("snapshot root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("invalid exclude pattern: {0}")]
    InvalidPattern(String),

    #[error("ignore rules error: {0}")]
    Ignore(#[from] ignore::Error),

    #[error("invalid digest hex: {0}")]
    InvalidDigestHex(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
