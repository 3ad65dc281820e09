//! The native disk space reservation facilities.

use std::fs::File;

cfg_if::cfg_if! {
    if #[cfg(any(target_os = "linux", target_os = "android"))] {
        mod linux;
        pub(crate) use self::linux::Fallocate as Platform;
    } else if #[cfg(windows)] {
        mod windows;
        pub(crate) use self::windows::AllocationInformation as Platform;
    } else {
        mod fallback;
        pub(crate) use self::fallback::Unavailable as Platform;
    }
}

/// The reservation strategy compiled in for the current target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Extent preallocation via `fallocate(2)`.
    Fallocate,
    /// Cluster-aligned allocation via `NtSetInformationFile`.
    ///
    /// Reserves the storage, but leaves the logical end of file as is.
    AllocationInformation,
    /// No native facility, null bytes are written instead.
    ZeroFill,
}

/// Why the native reservation didn't happen.
#[derive(Debug, thiserror::Error)]
pub(crate) enum NativeError {
    /// The platform or the filesystem does not provide the facility.
    #[error("native reservation is not supported")]
    Unsupported,
    /// The facility is there, but the call has failed.
    #[error("native reservation failed: {0}")]
    Failed(#[source] std::io::Error),
}

/// The platform-specific reservation of the `[0, size)` range of a file.
pub(crate) trait Reserve {
    /// The strategy this implementation represents.
    const BACKEND: Backend;

    /// Ask the operating system to reserve `size` bytes for the `file`
    /// without writing the data.
    fn reserve(&self, file: &File, size: u64) -> Result<(), NativeError>;
}
