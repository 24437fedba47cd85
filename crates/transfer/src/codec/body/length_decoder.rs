//! Reads a body delimited by `Content-Length` (RFC 9112 section 6.2).
//!
//! A channel that closes before the declared length was delivered is a truncated stream.

use crate::codec::body::DecodeState;
use crate::protocol::{FailureKind, ParseError, PayloadItem};
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    /// bytes still owed by the peer
    remaining: u64,
    truncated: bool,
    eof_emitted: bool,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { remaining: length, truncated: false, eof_emitted: false }
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        !self.truncated && self.remaining == 0
    }

    pub fn state(&self) -> DecodeState {
        match (self.truncated, self.remaining) {
            (true, _) => DecodeState::Failed(FailureKind::TruncatedStream),
            (false, 0) => DecodeState::Completed,
            (false, _) => DecodeState::FixedLength,
        }
    }
}

impl Decoder for LengthDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Splits off up to the remaining length, then yields `Eof` once.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.truncated || (self.remaining == 0 && self.eof_emitted) {
            return Ok(None);
        }

        if self.remaining == 0 {
            self.eof_emitted = true;
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let take = usize::try_from(self.remaining).map_or(src.len(), |remaining| remaining.min(src.len()));
        self.remaining -= take as u64;
        Ok(Some(PayloadItem::Chunk(src.split_to(take).freeze())))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }

        if self.remaining == 0 || self.truncated {
            return Ok(None);
        }

        warn!(remaining = self.remaining, "channel closed before content-length body completed");
        self.truncated = true;
        Err(ParseError::truncated(format!("premature end of content-length delimited body, {} bytes missing", self.remaining)))
    }
}
