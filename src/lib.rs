//! Disk space preallocation.
//!
//! Reserves the storage for a file ahead of writing to it, via a native
//! facility where the platform and the filesystem have one, and by writing
//! null bytes otherwise.

use std::{
    fs::File,
    io::{Seek, SeekFrom},
};

mod error;
mod helpers;
mod native;
mod zero_fill;

pub use error::{Error, ReserveError};
pub use helpers::{preallocate_at_path, preallocate_temp_file};
pub use native::Backend;
pub use zero_fill::{write_zero_fill, ZeroFill, NULL_BUFFER_SIZE};

use native::{Platform, Reserve};

/// The reservation strategy compiled in for the current target.
pub fn backend() -> Backend {
    Platform::BACKEND
}

/// Preallocate the `[0, size)` range of the `file`.
///
/// A zero `size` is a no-op, a negative one is rejected before touching
/// the `file`.
///
/// The native reservation is attempted first. If it is not supported, or
/// if it fails for any reason, null bytes are written instead, and only
/// the errors of that path are reported. On success the `file` is left
/// positioned at the start, whichever path was taken.
///
/// With [`Backend::AllocationInformation`] the native path reserves the
/// storage in whole clusters but does not move the end of file, so the
/// reported file length is not changed.
pub fn preallocate_file(file: &mut File, size: i64) -> Result<(), ReserveError> {
    reserve_with(&Platform, file, size)
}

/// Preallocate the `file` via the given native facility, falling back to
/// writing null bytes.
fn reserve_with<R: Reserve>(native: &R, file: &mut File, size: i64) -> Result<(), ReserveError> {
    let len = u64::try_from(size).map_err(|_| ReserveError::InvalidSize(size))?;
    if len == 0 {
        return Ok(());
    }

    match native.reserve(file, len) {
        Ok(()) => {
            tracing::debug!(message = "disk space reserved", size = %len, backend = ?R::BACKEND);
            file.seek(SeekFrom::Start(0)).map_err(ReserveError::Seek)?;
            Ok(())
        }
        Err(reason) => {
            tracing::debug!(message = "falling back to writing null bytes", size = %len, %reason);
            write_zero_fill(file, size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativeError;
    use pretty_assertions::assert_eq;
    use std::io::{Read, Write};

    const SIZES: &[i64] = &[0, 1024, 16_777_220];

    /// The logical length after preallocating an empty file.
    fn expected_len(size: i64) -> u64 {
        match backend() {
            Backend::AllocationInformation => 0,
            Backend::Fallocate | Backend::ZeroFill => size as u64,
        }
    }

    #[test]
    fn sizes() {
        for &size in SIZES {
            let mut file = tempfile::tempfile().unwrap();
            preallocate_file(&mut file, size).unwrap();
            assert_eq!(
                file.metadata().unwrap().len(),
                expected_len(size),
                "actual size does not match preallocation size {size}"
            );
        }
    }

    #[test]
    fn zero_is_noop() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"hello").unwrap();
        file.seek(SeekFrom::Start(3)).unwrap();

        preallocate_file(&mut file, 0).unwrap();

        assert_eq!(file.metadata().unwrap().len(), 5);
        assert_eq!(file.stream_position().unwrap(), 3);
    }

    #[test]
    fn negative_size() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"hello").unwrap();

        let err = preallocate_file(&mut file, -5).unwrap_err();

        assert!(matches!(err, ReserveError::InvalidSize(-5)), "{err:?}");
        assert_eq!(file.metadata().unwrap().len(), 5);
        assert_eq!(file.stream_position().unwrap(), 5);
    }

    #[test]
    fn idempotent() {
        let size = 3 * NULL_BUFFER_SIZE as i64 + 1;
        let mut file = tempfile::tempfile().unwrap();

        preallocate_file(&mut file, size).unwrap();
        let once = file.metadata().unwrap().len();
        preallocate_file(&mut file, size).unwrap();
        let twice = file.metadata().unwrap().len();

        assert_eq!(once, twice);
        assert_eq!(twice, expected_len(size));
    }

    #[test]
    fn backend_matches_target() {
        let expected = if cfg!(any(target_os = "linux", target_os = "android")) {
            Backend::Fallocate
        } else if cfg!(windows) {
            Backend::AllocationInformation
        } else {
            Backend::ZeroFill
        };
        assert_eq!(backend(), expected);
    }

    /// A native facility that never reserves anything.
    struct Refusing {
        unsupported: bool,
    }

    impl Reserve for Refusing {
        const BACKEND: Backend = Backend::ZeroFill;

        fn reserve(&self, _file: &File, _size: u64) -> Result<(), NativeError> {
            if self.unsupported {
                return Err(NativeError::Unsupported);
            }
            Err(NativeError::Failed(std::io::Error::new(
                std::io::ErrorKind::Other,
                "refused",
            )))
        }
    }

    #[test]
    fn rewinds_after_success() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"hello").unwrap();

        preallocate_file(&mut file, 1024).unwrap();

        assert_eq!(file.stream_position().unwrap(), 0);
    }

    #[test]
    fn native_failure_falls_back_to_null_bytes() {
        for unsupported in [true, false] {
            let mut file = tempfile::tempfile().unwrap();
            file.write_all(&[0xaa; 16]).unwrap();

            reserve_with(&Refusing { unsupported }, &mut file, 1000).unwrap();

            assert_eq!(file.metadata().unwrap().len(), 1000);
            assert_eq!(file.stream_position().unwrap(), 0);
            let mut contents = Vec::new();
            file.read_to_end(&mut contents).unwrap();
            assert!(contents.iter().all(|byte| *byte == 0), "non-zero byte found");
        }
    }

    #[cfg(unix)]
    #[test]
    fn only_fallback_errors_are_reported() {
        let named = tempfile::NamedTempFile::new().unwrap();
        let mut read_only = File::open(named.path()).unwrap();

        let err = preallocate_file(&mut read_only, 1024).unwrap_err();

        assert!(matches!(err, ReserveError::Write(_)), "{err:?}");
    }
}
