use crate::ensure;
use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BufMut, BytesMut};
use std::io::Write;
use tokio_util::codec::Encoder;
use tracing::trace;

/// Frames entity bytes as `size CRLF data CRLF` and ends the body with `0 CRLF CRLF`.
///
/// The declared size is always the number of bytes framed, in lower case hex without
/// leading zeros. An empty source produces no frame, since a zero-size chunk would end
/// the body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkedEncoder {
    eof: bool,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self { eof: false }
    }

    /// Frames everything remaining in `src` as one chunk and returns the number of entity bytes consumed.
    pub fn encode_buf<B: Buf>(&mut self, src: &mut B, dst: &mut BytesMut) -> Result<usize, SendError> {
        ensure!(!self.eof, SendError::invalid_body("chunked body already completed"));

        let size = src.remaining();
        if size == 0 {
            return Ok(0);
        }

        write!(helper::Writer(dst), "{size:x}\r\n")?;
        dst.reserve(size + 2);
        dst.put(src);
        dst.extend_from_slice(b"\r\n");
        trace!(size, "encode chunk");
        Ok(size)
    }

    /// Writes the terminal zero-size chunk; calling it again is a no-op.
    pub fn complete(&mut self, dst: &mut BytesMut) -> Result<(), SendError> {
        if !self.eof {
            self.eof = true;
            dst.extend_from_slice(b"0\r\n\r\n");
        }
        Ok(())
    }

    #[inline]
    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(mut bytes) => self.encode_buf(&mut bytes, dst).map(|_| ()),
            PayloadItem::Eof => self.complete(dst),
        }
    }
}

mod helper {
    use bytes::{BufMut, BytesMut};
    use std::io;

    pub struct Writer<'a>(pub &'a mut BytesMut);

    impl io::Write for Writer<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.put_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
