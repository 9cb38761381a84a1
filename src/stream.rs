//! Byte streams an [`Image`](crate::Image) relays codec reads and writes to.
//!
//! The image only borrows its stream; opening, closing and synchronizing
//! access belong to whoever owns it.

use alloc::vec::Vec;

use crate::error::StreamError;

/// A source or sink of encoded image bytes.
pub trait ImageStream {
    /// Fill `buf` completely or fail.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), StreamError>;

    /// Write all of `buf` or fail.
    fn write_all(&mut self, buf: &[u8]) -> Result<(), StreamError>;

    /// Read and discard `n` bytes.
    fn skip(&mut self, mut n: usize) -> Result<(), StreamError> {
        let mut scratch = [0u8; 256];
        while n > 0 {
            let chunk = n.min(scratch.len());
            self.read_exact(&mut scratch[..chunk])?;
            n -= chunk;
        }
        Ok(())
    }
}

/// Read-only: consumes bytes from the front of the slice.
impl ImageStream for &[u8] {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), StreamError> {
        let Some((head, tail)) = self.split_at_checked(buf.len()) else {
            return Err(StreamError::UnexpectedEof);
        };
        buf.copy_from_slice(head);
        *self = tail;
        Ok(())
    }

    fn write_all(&mut self, _buf: &[u8]) -> Result<(), StreamError> {
        Err(StreamError::NotWritable)
    }

    fn skip(&mut self, n: usize) -> Result<(), StreamError> {
        *self = self.get(n..).ok_or(StreamError::UnexpectedEof)?;
        Ok(())
    }
}

/// Write-only: appends.
impl ImageStream for Vec<u8> {
    fn read_exact(&mut self, _buf: &mut [u8]) -> Result<(), StreamError> {
        Err(StreamError::NotReadable)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), StreamError> {
        self.extend_from_slice(buf);
        Ok(())
    }
}

/// Adapter over a `std::io` reader or writer.
///
/// Reading requires `T: Read` and writing `T: Write`; use [`IoStream::reader`]
/// or [`IoStream::writer`] to pick the direction.
#[cfg(feature = "std")]
pub struct IoStream<T> {
    inner: T,
}

#[cfg(feature = "std")]
impl<T> IoStream<T> {
    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read> IoStream<Reader<R>> {
    pub fn reader(inner: R) -> Self {
        Self {
            inner: Reader(inner),
        }
    }
}

#[cfg(feature = "std")]
impl<W: std::io::Write> IoStream<Writer<W>> {
    pub fn writer(inner: W) -> Self {
        Self {
            inner: Writer(inner),
        }
    }
}

/// Read direction marker for [`IoStream`].
#[cfg(feature = "std")]
pub struct Reader<R>(pub R);

/// Write direction marker for [`IoStream`].
#[cfg(feature = "std")]
pub struct Writer<W>(pub W);

#[cfg(feature = "std")]
impl<R: std::io::Read> ImageStream for IoStream<Reader<R>> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), StreamError> {
        self.inner.0.read_exact(buf).map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => StreamError::UnexpectedEof,
            _ => StreamError::Io(e),
        })
    }

    fn write_all(&mut self, _buf: &[u8]) -> Result<(), StreamError> {
        Err(StreamError::NotWritable)
    }
}

#[cfg(feature = "std")]
impl<W: std::io::Write> ImageStream for IoStream<Writer<W>> {
    fn read_exact(&mut self, _buf: &mut [u8]) -> Result<(), StreamError> {
        Err(StreamError::NotReadable)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), StreamError> {
        Ok(self.inner.0.write_all(buf)?)
    }
}
