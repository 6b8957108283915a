use std::path::PathBuf;

use thiserror::Error;

/// Failures of the collaborators around the engine: storage, settings and
/// accounts. Game logic itself never produces one.
#[derive(Debug, Error)]
pub enum Error {
    #[error("user directory {0} does not exist, please register first")]
    MissingUserDir(PathBuf),

    #[error("no user is logged in, please register first")]
    NoLoggedUser,

    #[error("could not access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} has an unusable setting: {reason}")]
    InvalidSettings { path: PathBuf, reason: &'static str },

    #[error("{0} holds a snake without segments")]
    EmptySnake(PathBuf),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Corrupt { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
