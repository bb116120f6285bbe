use std::path::PathBuf;

use thiserror::Error;

use crate::source::LookupError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the pinning pipeline.
///
/// `Lookup` and `Service` only ever describe a single item and never abort
/// a batch; the remaining variants are fatal when they occur while loading
/// inputs or saving the final mapping.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Invalid {0}.")]
    Argument(String),

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("pin failed: {0}")]
    Service(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true for errors that only affect one item of a batch.
    pub fn is_per_item(&self) -> bool {
        matches!(self, Self::Lookup(_) | Self::Service(_))
    }
}
