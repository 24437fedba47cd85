//! HTTP body handling module for processing message payloads
//!
//! This module encodes and decodes HTTP message bodies using the transfer strategies
//! of [`TransferStrategy`](crate::protocol::TransferStrategy).
//!
//! # Components
//!
//! ## Decoders
//! - [`ChunkedDecoder`]: Handles chunked transfer encoded payloads
//! - [`LengthDecoder`]: Processes fixed-length payloads
//! - [`IdentityDecoder`]: Reads until the channel closes
//! - [`PayloadDecoder`]: Main decoder that coordinates different decoding strategies
//!
//! ## Encoders
//! - [`ChunkedEncoder`]: Implements chunked transfer encoding
//! - [`LengthEncoder`]: Handles fixed-length payload encoding
//! - [`IdentityEncoder`]: Writes the payload verbatim
//! - [`PayloadEncoder`]: Main encoder that manages different encoding strategies
//!
//! Every decoder reports its progress as a [`DecodeState`]. `Completed` and `Failed` are
//! terminal: a decoder that reached either never produces another item.

mod chunked_decoder;
mod chunked_encoder;
mod identity_decoder;
mod identity_encoder;
mod length_decoder;
mod length_encoder;
mod payload_decoder;
mod payload_encoder;

pub use chunked_decoder::ChunkedDecoder;
pub use chunked_encoder::ChunkedEncoder;
pub use identity_decoder::IdentityDecoder;
pub use identity_encoder::IdentityEncoder;
pub use length_decoder::LengthDecoder;
pub use length_encoder::LengthEncoder;
pub use payload_decoder::{DEFAULT_MAX_LINE_LENGTH, PayloadDecoder};
pub use payload_encoder::PayloadEncoder;

use crate::protocol::FailureKind;

/// Observable progress of a content decoder.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DecodeState {
    /// Reading a chunk-size line, including extensions
    ChunkSize,
    /// Reading the data of a chunk
    ChunkData,
    /// Reading the CRLF after chunk data
    ChunkTerminator,
    /// Reading the trailer section after the zero-size chunk
    Trailers,
    /// Reading a body of known length
    FixedLength,
    /// Reading a body delimited by the closure of the channel
    UntilClose,
    /// The whole body was decoded
    Completed,
    /// The body can't be decoded any further
    Failed(FailureKind),
}

impl DecodeState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, DecodeState::Completed | DecodeState::Failed(_))
    }
}
