//! Error types.

use std::path::PathBuf;

/// An error that can occur while reserving the space for a file.
#[derive(Debug, thiserror::Error)]
pub enum ReserveError {
    /// The requested size is negative.
    #[error("invalid preallocation size {0}")]
    InvalidSize(i64),
    /// Unable to reposition the write offset.
    #[error("failed to seek: {0}")]
    Seek(#[source] std::io::Error),
    /// The write call has failed.
    #[error("failed to write null bytes: {0}")]
    Write(#[source] std::io::Error),
    /// The write call reported fewer bytes written than requested.
    #[error("failed to preallocate file: write operation interrupted at {written}/{requested} bytes")]
    ShortWrite {
        /// The offset the interrupted chunk was written at.
        offset: u64,
        /// The amount of bytes the write call reported.
        written: usize,
        /// The size of the chunk we asked to write.
        requested: usize,
    },
}

/// An error that can occur in the file creating helpers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested size is negative.
    #[error("invalid preallocation size {0}")]
    InvalidSize(i64),
    /// The temporary file name pattern contains a path separator.
    #[error("pattern {0:?} contains a path separator")]
    InvalidPattern(String),
    /// Unable to open or create the file.
    #[error("failed to open {path:?}: {source}")]
    Open {
        /// The path we tried to open.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Unable to create the temporary file.
    #[error("failed to create temporary file in {dir:?}: {source}")]
    CreateTemp {
        /// The directory we tried to create the file in.
        dir: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file was created, but the space reservation has failed.
    ///
    /// The file itself is left on disk.
    #[error("failed to preallocate {path:?}: {source}")]
    Reserve {
        /// The path to the file.
        path: PathBuf,
        /// The reservation error.
        #[source]
        source: ReserveError,
    },
}
