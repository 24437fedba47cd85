//! Decoder for bodies delimited by the closure of the channel.
//!
//! A response without `Content-Length` and without a chunked `Transfer-Encoding` extends
//! until the peer closes the connection (RFC 9112 section 6.3). Every byte received is body;
//! only end-of-input completes it.

use crate::codec::body::DecodeState;
use crate::protocol::{ParseError, PayloadItem};
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentityDecoder {
    closed: bool,
    eof_emitted: bool,
}

impl IdentityDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.closed
    }

    pub fn state(&self) -> DecodeState {
        if self.closed { DecodeState::Completed } else { DecodeState::UntilClose }
    }
}

impl Decoder for IdentityDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.closed || src.is_empty() {
            return Ok(None);
        }

        Ok(Some(PayloadItem::Chunk(src.split().freeze())))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !src.is_empty() && !self.closed {
            return Ok(Some(PayloadItem::Chunk(src.split().freeze())));
        }

        self.closed = true;
        if self.eof_emitted {
            return Ok(None);
        }

        trace!("channel closed, identity body finished");
        self.eof_emitted = true;
        Ok(Some(PayloadItem::Eof))
    }
}
