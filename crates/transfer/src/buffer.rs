//! Growable byte region shared by the codecs and the I/O channel.
//!
//! A [`TransferBuffer`] wraps a [`BytesMut`]: bytes between the read position and the end of
//! valid data are pending, and the region grows by reallocation when a write would overflow
//! its capacity. Reads from the channel append at the end; codecs consume from the front.

use bytes::{Buf, BytesMut};
use std::io;
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// Result of one read from the channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReadStatus {
    /// `n` bytes were appended to the buffer
    Data(usize),
    /// The peer closed its side of the channel
    Eof,
}

#[derive(Debug)]
pub struct TransferBuffer {
    inner: BytesMut,
    initial_capacity: usize,
}

impl TransferBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { inner: BytesMut::with_capacity(capacity), initial_capacity: capacity }
    }

    /// Appends whatever the reader has available, waiting until at least one byte or end-of-input arrives.
    pub async fn fill_from<R>(&mut self, reader: &mut R) -> io::Result<ReadStatus>
    where
        R: AsyncRead + Unpin,
    {
        if self.inner.capacity() == self.inner.len() {
            self.inner.reserve(self.initial_capacity.max(1));
        }

        match reader.read_buf(&mut self.inner).await? {
            0 => Ok(ReadStatus::Eof),
            n => {
                trace!(read = n, buffered = self.inner.len(), "fill transfer buffer");
                Ok(ReadStatus::Data(n))
            }
        }
    }

    /// Writes every pending byte to `writer` and flushes it, returning the number of bytes written.
    pub async fn flush_to<W>(&mut self, writer: &mut W) -> io::Result<usize>
    where
        W: AsyncWrite + Unpin,
    {
        let mut written = 0;
        while self.inner.has_remaining() {
            let n = writer.write(&self.inner).await?;
            if n == 0 {
                return Err(io::Error::from(ErrorKind::WriteZero));
            }
            self.inner.advance(n);
            written += n;
        }
        writer.flush().await?;
        Ok(written)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.inner.extend_from_slice(bytes);
    }

    /// Appends `line` followed by CRLF.
    pub fn write_line(&mut self, line: &str) {
        self.inner.reserve(line.len() + 2);
        self.inner.extend_from_slice(line.as_bytes());
        self.inner.extend_from_slice(b"\r\n");
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn has_data(&self) -> bool {
        !self.inner.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Hands the underlying bytes to a codec.
    #[inline]
    pub fn bytes_mut(&mut self) -> &mut BytesMut {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn fill_and_flush() {
        let (mut client, mut server) = duplex(64);
        let mut outbound = TransferBuffer::with_capacity(16);
        outbound.write_line("PING");
        outbound.write(b"tail");
        assert_eq!(outbound.flush_to(&mut client).await.unwrap(), 10);
        assert!(!outbound.has_data());
        drop(client);

        let mut inbound = TransferBuffer::with_capacity(4);
        let mut received = Vec::new();
        while let ReadStatus::Data(_) = inbound.fill_from(&mut server).await.unwrap() {
            received.extend_from_slice(inbound.bytes_mut());
            inbound.clear();
        }
        assert_eq!(received, b"PING\r\ntail");
        assert_eq!(inbound.fill_from(&mut server).await.unwrap(), ReadStatus::Eof);
    }

    #[test]
    fn grows_past_initial_capacity() {
        let mut buffer = TransferBuffer::with_capacity(2);
        buffer.write(b"0123456789");
        assert_eq!(buffer.len(), 10);
        assert!(buffer.capacity() >= 10);
    }
}
