//! Linux-specific implementation.

use nix::{
    errno::Errno,
    fcntl::{fallocate, FallocateFlags},
    libc::off_t,
};
use std::{fs::File, os::unix::io::AsRawFd};

use super::{Backend, NativeError, Reserve};

/// Reserve the disk space by using [`fallocate`].
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Fallocate;

impl Reserve for Fallocate {
    const BACKEND: Backend = Backend::Fallocate;

    #[inline]
    fn reserve(&self, file: &File, size: u64) -> Result<(), NativeError> {
        let len = off_t::try_from(size).map_err(|_| NativeError::Unsupported)?;
        // The default mode allocates real blocks (not a hole) and extends
        // the file size to `len`; the allocated range reads back as zeroes.
        match fallocate(file.as_raw_fd(), FallocateFlags::empty(), 0, len) {
            Ok(()) => Ok(()),
            Err(Errno::EOPNOTSUPP | Errno::ENOSYS) => Err(NativeError::Unsupported),
            Err(errno) => Err(NativeError::Failed(errno.into())),
        }
    }
}
