//! HTTP codec module for encoding and decoding HTTP messages
//!
//! This module provides streaming HTTP message processing on the client side: request
//! encoding and response decoding. It uses a state machine pattern to handle both heads
//! and payload data.
//!
//! # Architecture
//!
//! - Response handling:
//!   - [`ResponseDecoder`]: Decodes incoming HTTP responses
//!   - Head parsing via [`header`] module
//!   - Payload decoding via [`body`] module, reporting a [`DecodeState`]
//!
//! - Request handling:
//!   - [`RequestEncoder`]: Encodes outgoing HTTP requests
//!   - Head encoding via [`header`] module
//!   - Payload encoding via [`body`] module
//!
//! # Features
//!
//! - Streaming processing of HTTP messages
//! - Chunked transfer encoding with truncation detection
//! - Content-Length based payload handling
//! - Bodies delimited by connection close

pub mod body;
pub mod header;
mod request_encoder;
mod response_decoder;

pub use body::{ChunkedDecoder, ChunkedEncoder, DEFAULT_MAX_LINE_LENGTH, DecodeState, PayloadDecoder, PayloadEncoder};
pub use request_encoder::RequestEncoder;
pub use response_decoder::ResponseDecoder;
