use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced to the user by a [`crate::Session`].
///
/// Everything except `UnreadableRoot` is recoverable: the picker shows it as a
/// transient message and the session carries on with its state untouched.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot select sensitive file '{0}'")]
    SensitiveFile(String),

    #[error("no files selected")]
    NothingSelected,

    #[error("no file at index {0}")]
    NoSuchFile(usize),

    #[error(transparent)]
    Export(#[from] anyhow::Error),

    #[error("cannot read root directory {}", path.display())]
    UnreadableRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
