use crate::ensure;
use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::warn;

/// Forwards exactly the number of bytes declared by `Content-Length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    length: u64,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length }
    }

    /// Writes at most the remaining declared length and returns the number of bytes consumed.
    pub fn encode_buf<B: Buf>(&mut self, src: &mut B, dst: &mut BytesMut) -> Result<usize, SendError> {
        if !src.has_remaining() {
            return Ok(0);
        }

        if self.length == 0 {
            warn!(dropped = src.remaining(), "encode payload_item but no need to encode anymore");
            return Ok(0);
        }

        let size = usize::try_from(self.length).map_or(src.remaining(), |length| length.min(src.remaining()));
        if size < src.remaining() {
            warn!(declared = self.length, actual = src.remaining(), "payload exceed the declared content-length, truncate it");
        }

        dst.put(src.take(size));
        self.length -= size as u64;
        Ok(size)
    }

    /// Marks the end of the body; fails if declared bytes are still owed.
    pub fn complete(&mut self) -> Result<(), SendError> {
        ensure!(
            self.length == 0,
            SendError::invalid_body(format!("{} bytes declared by content-length were never written", self.length))
        );
        Ok(())
    }

    #[inline]
    pub fn is_finish(&self) -> bool {
        self.length == 0
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(mut bytes) => self.encode_buf(&mut bytes, dst).map(|_| ()),
            PayloadItem::Eof => self.complete(),
        }
    }
}
