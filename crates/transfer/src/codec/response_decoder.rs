//! HTTP response decoder module
//!
//! This module decodes HTTP responses using a streaming approach. It handles both head
//! parsing and content decoding through a state machine pattern.
//!
//! # Components
//!
//! - [`ResponseDecoder`]: Main decoder that coordinates head and payload parsing
//! - Head parsing: Uses [`HeaderDecoder`] for parsing response heads
//! - Payload handling: Uses [`PayloadDecoder`] for handling response bodies
//!
//! # Example
//!
//! ```
//! use micro_transfer::codec::ResponseDecoder;
//! use micro_transfer::protocol::Message;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = ResponseDecoder::new();
//! let mut buffer = BytesMut::from("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n");
//!
//! assert!(matches!(decoder.decode(&mut buffer), Ok(Some(Message::Header(_)))));
//! assert!(matches!(decoder.decode(&mut buffer), Ok(Some(Message::Payload(_)))));
//! ```

use crate::codec::body::{DEFAULT_MAX_LINE_LENGTH, DecodeState, PayloadDecoder};
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, ResponseHead, TransferStrategy};
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::warn;

/// A decoder for HTTP responses that handles both heads and payload
///
/// The decoder operates in two phases:
/// 1. Head parsing: Decodes the response head using [`HeaderDecoder`]
/// 2. Payload parsing: Decodes the response body using [`PayloadDecoder`]
///
/// # State Machine
///
/// The decoder maintains its state through the `payload_decoder` field:
/// - `None`: Currently parsing a head
/// - `Some(PayloadDecoder)`: Currently parsing payload
#[derive(Debug)]
pub struct ResponseDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<PayloadDecoder>,
    last_state: Option<DecodeState>,
    max_line_length: usize,
}

impl ResponseDecoder {
    /// Creates a new `ResponseDecoder` instance
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a decoder that bounds chunk-size lines and trailer sections to `max_line_length` bytes.
    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self { max_line_length, ..Default::default() }
    }

    /// Marks whether the next response answers a `HEAD` request.
    pub fn set_head_request(&mut self, head_request: bool) {
        self.header_decoder.set_head_request(head_request);
    }

    /// Returns true while a body is being decoded.
    #[inline]
    pub fn in_payload(&self) -> bool {
        self.payload_decoder.is_some()
    }

    /// State of the current body, or of the last body if the decoder is back at head parsing.
    pub fn payload_state(&self) -> Option<DecodeState> {
        self.payload_decoder.as_ref().map(PayloadDecoder::state).or(self.last_state)
    }

    fn on_payload(&mut self, item: Option<PayloadItem>) -> Option<Message<(ResponseHead, TransferStrategy)>> {
        match item {
            Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
            Some(item @ PayloadItem::Eof) => {
                // the body is done, the next bytes belong to another response
                self.last_state = self.payload_decoder.take().map(|decoder| decoder.state());
                Some(Message::Payload(item))
            }
            None => None,
        }
    }
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self {
            header_decoder: HeaderDecoder::new(),
            payload_decoder: None,
            last_state: None,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl Decoder for ResponseDecoder {
    type Item = Message<(ResponseHead, TransferStrategy)>;
    type Error = ParseError;

    /// Attempts to decode an HTTP response from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message::Header(_)))`: Successfully decoded a response head
    /// - `Ok(Some(Message::Payload(_)))`: Successfully decoded a payload chunk or the end of the body
    /// - `Ok(None)`: Need more data to proceed
    /// - `Err(_)`: Encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // parse payload if have payload_decoder
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let item = payload_decoder.decode(src)?;
            return Ok(self.on_payload(item));
        }

        // parse response head
        let message = match self.header_decoder.decode(src)? {
            Some((head, strategy)) => {
                self.payload_decoder = Some(PayloadDecoder::from_strategy(strategy, self.max_line_length));
                self.last_state = None;
                Some(Message::Header((head, strategy)))
            }
            None => None,
        };

        Ok(message)
    }

    /// Called once the channel reached end-of-input.
    ///
    /// An unfinished head or body is reported as [`ParseError::TruncatedStream`].
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let item = payload_decoder.decode_eof(src)?;
            return Ok(self.on_payload(item));
        }

        if let Some(message) = self.decode(src)? {
            return Ok(Some(message));
        }

        if src.is_empty() {
            return Ok(None);
        }

        warn!(buffered = src.len(), "channel closed in the middle of a response head");
        Err(ParseError::truncated(format!("connection closed before response head completed, {} bytes buffered", src.len())))
    }
}
