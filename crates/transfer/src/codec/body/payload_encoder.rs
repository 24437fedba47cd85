use crate::codec::body::chunked_encoder::ChunkedEncoder;
use crate::codec::body::identity_encoder::IdentityEncoder;
use crate::codec::body::length_encoder::LengthEncoder;
use crate::protocol::{PayloadItem, SendError, TransferStrategy};
use bytes::{Buf, BytesMut};

use tokio_util::codec::Encoder;

/// encode payload for the outbound entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEncoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// content-length payload
    Length(LengthEncoder),

    /// transfer-encoding chunked payload
    Chunked(ChunkedEncoder),

    /// payload written as is, delimited by closing the channel
    Identity(IdentityEncoder),
}

impl PayloadEncoder {
    /// create an empty `PayloadEncoder`
    pub fn empty() -> Self {
        Self::fix_length(0)
    }

    /// create a chunked `PayloadEncoder`
    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedEncoder::new()) }
    }

    /// create a fixed length `PayloadEncoder`
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthEncoder::new(size)) }
    }

    /// create a verbatim `PayloadEncoder`
    pub fn identity() -> Self {
        Self { kind: Kind::Identity(IdentityEncoder::new()) }
    }

    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    pub fn is_fix_length(&self) -> bool {
        matches!(self.kind, Kind::Length(_))
    }

    pub fn is_finish(&self) -> bool {
        match &self.kind {
            Kind::Length(encoder) => encoder.is_finish(),
            Kind::Chunked(encoder) => encoder.is_finish(),
            Kind::Identity(encoder) => encoder.is_finish(),
        }
    }

    /// Encodes the bytes remaining in `src` and returns how many of them were consumed.
    pub fn encode_buf<B: Buf>(&mut self, src: &mut B, dst: &mut BytesMut) -> Result<usize, SendError> {
        match &mut self.kind {
            Kind::Length(encoder) => encoder.encode_buf(src, dst),
            Kind::Chunked(encoder) => encoder.encode_buf(src, dst),
            Kind::Identity(encoder) => encoder.encode_buf(src, dst),
        }
    }

    /// Marks that no more entity data will be produced.
    pub fn complete(&mut self, dst: &mut BytesMut) -> Result<(), SendError> {
        match &mut self.kind {
            Kind::Length(encoder) => encoder.complete(),
            Kind::Chunked(encoder) => encoder.complete(dst),
            Kind::Identity(encoder) => {
                encoder.complete();
                Ok(())
            }
        }
    }
}

impl From<TransferStrategy> for PayloadEncoder {
    fn from(strategy: TransferStrategy) -> Self {
        match strategy {
            TransferStrategy::Identity => Self::identity(),
            TransferStrategy::Length(size) => Self::fix_length(size),
            TransferStrategy::Chunked => Self::chunked(),
        }
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for PayloadEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match &mut self.kind {
            Kind::Length(encoder) => encoder.encode(item, dst),
            Kind::Chunked(encoder) => encoder.encode(item, dst),
            Kind::Identity(encoder) => encoder.encode(item, dst),
        }
    }
}
