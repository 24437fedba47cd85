//! Decoder implementation for HTTP message payloads.
//!
//! This module provides a unified decoder for the transfer strategies:
//! - Content-Length based payloads
//! - Chunked transfer encoding
//! - Bodies delimited by the closure of the channel
//!
//! The strategy is chosen by head parsing and handed over as a [`TransferStrategy`].

use crate::codec::body::DecodeState;
use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::codec::body::identity_decoder::IdentityDecoder;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::entity::EntityConsumer;
use crate::protocol::{HttpError, ParseError, PayloadItem, TransferStrategy};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// Default limit for a chunk-size line or the trailer section
pub const DEFAULT_MAX_LINE_LENGTH: usize = 8 * 1024;

/// A unified decoder for handling HTTP message payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    /// The specific decoding strategy to use
    kind: Kind,
}

/// Enum representing different payload decoding strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Decode payload with a fixed content length
    Length(LengthDecoder),

    /// Decode payload using chunked transfer encoding
    Chunked(ChunkedDecoder),

    /// Decode everything until the channel closes
    Identity(IdentityDecoder),
}

impl PayloadDecoder {
    /// Creates a PayloadDecoder for messages with no body.
    pub fn empty() -> Self {
        Self::fix_length(0)
    }

    /// Creates a PayloadDecoder for chunked transfer encoding.
    pub fn chunked() -> Self {
        Self::chunked_with_limit(DEFAULT_MAX_LINE_LENGTH)
    }

    /// Creates a chunked PayloadDecoder bounding size lines and trailers to `max_line_length` bytes.
    pub fn chunked_with_limit(max_line_length: usize) -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new(max_line_length)) }
    }

    /// Creates a PayloadDecoder for a fixed-length payload.
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    /// Creates a PayloadDecoder reading until the channel closes.
    pub fn until_close() -> Self {
        Self { kind: Kind::Identity(IdentityDecoder::new()) }
    }

    pub fn from_strategy(strategy: TransferStrategy, max_line_length: usize) -> Self {
        match strategy {
            TransferStrategy::Identity => Self::until_close(),
            TransferStrategy::Length(size) => Self::fix_length(size),
            TransferStrategy::Chunked => Self::chunked_with_limit(max_line_length),
        }
    }

    /// Returns whether this decoder handles chunked transfer encoding.
    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    /// Returns whether this decoder handles fixed-length payloads.
    pub fn is_fix_length(&self) -> bool {
        matches!(self.kind, Kind::Length(_))
    }

    /// Returns whether the body ends only when the channel closes.
    pub fn is_until_close(&self) -> bool {
        matches!(self.kind, Kind::Identity(_))
    }

    /// Returns true once the whole body has been decoded.
    pub fn is_completed(&self) -> bool {
        match &self.kind {
            Kind::Length(decoder) => decoder.is_completed(),
            Kind::Chunked(decoder) => decoder.is_completed(),
            Kind::Identity(decoder) => decoder.is_completed(),
        }
    }

    pub fn state(&self) -> DecodeState {
        match &self.kind {
            Kind::Length(decoder) => decoder.state(),
            Kind::Chunked(decoder) => decoder.state(),
            Kind::Identity(decoder) => decoder.state(),
        }
    }

    /// Decodes the bytes available in `src` and hands the entity bytes to `consumer`.
    ///
    /// Returns how many entity bytes were produced by this call; `0` means more input is
    /// needed or the decoder reached a terminal state. Use [`PayloadDecoder::is_completed`]
    /// to tell the two apart. The consumer is told once when the body completes.
    pub fn decode_into(&mut self, src: &mut BytesMut, consumer: &mut dyn EntityConsumer) -> Result<usize, HttpError> {
        let mut produced = 0;
        while let Some(item) = self.decode(src)? {
            match item {
                PayloadItem::Chunk(bytes) => {
                    produced += bytes.len();
                    consumer.consume(bytes)?;
                }
                PayloadItem::Eof => {
                    consumer.on_complete();
                    break;
                }
            }
        }
        Ok(produced)
    }
}

impl From<TransferStrategy> for PayloadDecoder {
    fn from(strategy: TransferStrategy) -> Self {
        Self::from_strategy(strategy, DEFAULT_MAX_LINE_LENGTH)
    }
}

/// Delegates to the appropriate decoder based on the payload type.
impl Decoder for PayloadDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(decoder) => decoder.decode(src),
            Kind::Chunked(decoder) => decoder.decode(src),
            Kind::Identity(decoder) => decoder.decode(src),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(decoder) => decoder.decode_eof(src),
            Kind::Chunked(decoder) => decoder.decode_eof(src),
            Kind::Identity(decoder) => decoder.decode_eof(src),
        }
    }
}
