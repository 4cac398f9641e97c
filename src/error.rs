use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("unable to read word list {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

#[derive(Debug, thiserror::Error)]
pub enum DeduceError {
    /// The consistency search for one word visited more joint assignments than allowed.
    #[error("examining {word} visited more than {limit} candidate tuples")]
    TupleLimitExceeded { word: String, limit: u64 },
}

/// Unified error type for the command-line front end.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Deduce(#[from] DeduceError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
#[error("unknown examine order: {0}")]
pub struct ParseOrderError(pub String);
