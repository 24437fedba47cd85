use crate::ensure;
use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;

/// Writes entity bytes verbatim; the body ends when the channel is closed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentityEncoder {
    eof: bool,
}

impl IdentityEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode_buf<B: Buf>(&mut self, src: &mut B, dst: &mut BytesMut) -> Result<usize, SendError> {
        ensure!(!self.eof, SendError::invalid_body("identity body already completed"));
        let size = src.remaining();
        dst.put(src);
        Ok(size)
    }

    pub fn complete(&mut self) {
        self.eof = true;
    }

    #[inline]
    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for IdentityEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(mut bytes) => self.encode_buf(&mut bytes, dst).map(|_| ()),
            PayloadItem::Eof => {
                self.complete();
                Ok(())
            }
        }
    }
}
