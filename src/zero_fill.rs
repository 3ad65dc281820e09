//! The zero-fill implementation.
//!
//! Works everywhere, and is used when the native reservation is either
//! unavailable or has failed.

use std::{
    io::{Seek, SeekFrom, Write},
    num::NonZeroUsize,
};

use crate::ReserveError;

/// The default capacity of the null bytes buffer.
pub const NULL_BUFFER_SIZE: usize = 512 * 1024;

const DEFAULT_BUFFER_SIZE: NonZeroUsize = match NonZeroUsize::new(NULL_BUFFER_SIZE) {
    Some(size) => size,
    None => panic!("the null buffer size must not be zero"),
};

/// Preallocates a byte sink by writing null bytes into it.
#[derive(Debug, Clone, Copy)]
pub struct ZeroFill {
    /// The maximum size of a single write.
    /// The buffer is allocated once per call and reused for every chunk.
    pub buffer_size: NonZeroUsize,
}

impl Default for ZeroFill {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ZeroFill {
    /// Write `size` null bytes at the start of the `sink`, and then rewind
    /// the `sink` back to the start.
    ///
    /// A write call reporting fewer bytes than requested fails the whole
    /// operation; partial writes are never resumed.
    pub fn write<W>(&self, sink: &mut W, size: i64) -> Result<(), ReserveError>
    where
        W: Write + Seek + ?Sized,
    {
        let size = u64::try_from(size).map_err(|_| ReserveError::InvalidSize(size))?;

        sink.seek(SeekFrom::Start(0)).map_err(ReserveError::Seek)?;

        // Do not allocate the whole buffer when we need less than that.
        let buf = vec![0u8; chunk_len(size, self.buffer_size.get())];

        let mut offset: u64 = 0;
        while offset < size {
            let requested = chunk_len(size - offset, buf.len());
            let written = sink.write(&buf[..requested]).map_err(ReserveError::Write)?;
            if written != requested {
                return Err(ReserveError::ShortWrite {
                    offset,
                    written,
                    requested,
                });
            }
            tracing::trace!(message = "null bytes written", %offset, %written);
            offset += written as u64;
        }

        sink.seek(SeekFrom::Start(0)).map_err(ReserveError::Seek)?;
        Ok(())
    }
}

/// The length of the next chunk given the amount of bytes left to write.
fn chunk_len(remaining: u64, capacity: usize) -> usize {
    usize::try_from(remaining).map_or(capacity, |remaining| remaining.min(capacity))
}

/// Preallocate a byte sink by writing null bytes with the default buffer.
///
/// See [`ZeroFill::write`].
pub fn write_zero_fill<W>(sink: &mut W, size: i64) -> Result<(), ReserveError>
where
    W: Write + Seek + ?Sized,
{
    ZeroFill::default().write(sink, size)
}
