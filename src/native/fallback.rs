//! The fallback implementation.

use std::fs::File;

use super::{Backend, NativeError, Reserve};

/// No native reservation facility is known for this platform.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Unavailable;

impl Reserve for Unavailable {
    const BACKEND: Backend = Backend::ZeroFill;

    /// Always unsupported.
    #[inline]
    fn reserve(&self, _file: &File, _size: u64) -> Result<(), NativeError> {
        Err(NativeError::Unsupported)
    }
}
