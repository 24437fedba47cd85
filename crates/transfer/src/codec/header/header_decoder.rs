//! HTTP header decoder implementation for parsing HTTP response heads
//!
//! This module decodes the status line and header fields of a response from raw bytes into
//! a [`ResponseHead`], and decides how the body that follows is delimited.
//!
//! # Features
//!
//! - Header parsing using `httparse`
//! - Support for HTTP/1.0 and HTTP/1.1
//! - Built-in protection against oversized heads
//! - Interim `1xx` responses are skipped, except `101 Switching Protocols`
//! - Transfer strategy selection following RFC 9112 section 6.3
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header size: 8KB

use bytes::{Buf, BytesMut};
use http::{HeaderName, HeaderValue, Response, StatusCode, Version};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

use crate::ensure;

use crate::protocol::{ParseError, ResponseHead, TransferStrategy, is_bodiless_status};

/// Maximum number of headers allowed in a response
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decoder for HTTP response heads implementing the [`Decoder`] trait.
///
/// Whether a body follows depends on the request too: the response to a `HEAD` request never
/// has one, so the caller tells the decoder via [`HeaderDecoder::set_head_request`].
#[derive(Debug, Clone, Default)]
pub struct HeaderDecoder {
    head_request: bool,
}

impl HeaderDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks whether the response being decoded answers a `HEAD` request.
    pub fn set_head_request(&mut self, head_request: bool) {
        self.head_request = head_request;
    }

    /// Parses one head from the start of `src` without consuming it.
    ///
    /// Returns the head together with the number of bytes it occupies.
    fn parse(src: &[u8]) -> Result<Option<(ResponseHead, usize)>, ParseError> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut resp = httparse::Response::new(&mut headers);

        let parsed_result = resp.parse(src).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            Error::Version => ParseError::InvalidVersion(None),
            Error::Status => ParseError::InvalidStatus,
            e => ParseError::invalid_header(e.to_string()),
        });

        let offset = match parsed_result? {
            Status::Complete(offset) => offset,
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                return Ok(None);
            }
        };

        trace!(head_size = offset, "parsed response head");
        ensure!(offset <= MAX_HEADER_BYTES, ParseError::too_large_header(offset, MAX_HEADER_BYTES));

        let version = match resp.version {
            Some(0) => Version::HTTP_10,
            Some(1) => Version::HTTP_11,
            v => return Err(ParseError::InvalidVersion(v)),
        };

        let status = resp.code.and_then(|code| StatusCode::from_u16(code).ok()).ok_or(ParseError::InvalidStatus)?;

        let mut head = Response::new(());
        *head.status_mut() = status;
        *head.version_mut() = version;

        let header_map = head.headers_mut();
        header_map.reserve(resp.headers.len());
        for header in resp.headers.iter() {
            let name = HeaderName::from_bytes(header.name.as_bytes()).map_err(ParseError::invalid_header)?;
            let value = HeaderValue::from_bytes(header.value).map_err(ParseError::invalid_header)?;
            header_map.append(name, value);
        }

        Ok(Some((head, offset)))
    }
}

impl Decoder for HeaderDecoder {
    type Item = (ResponseHead, TransferStrategy);
    type Error = ParseError;

    /// Attempts to decode a final response head from the provided bytes buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((head, strategy)))` once a final head was parsed; its bytes are consumed
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if parsing failed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some((head, offset)) = Self::parse(src)? else {
                return Ok(None);
            };
            src.advance(offset);

            if head.status().is_informational() && head.status() != StatusCode::SWITCHING_PROTOCOLS {
                debug!(status = head.status().as_u16(), "skip interim response");
                continue;
            }

            let strategy = parse_transfer_strategy(&head, self.head_request)?;
            return Ok(Some((head, strategy)));
        }
    }
}

/// Determines how the response body is delimited.
///
/// This function examines the request method, the status code, and the Content-Length and
/// Transfer-Encoding headers according to RFC 9112 section 6.3:
/// - no body for `HEAD` requests and for 1xx, 204 and 304 responses
/// - chunked if chunked is the final transfer coding
/// - until close if another transfer coding is final
/// - fixed length if Content-Length is present
/// - until close if neither is present
///
/// # Errors
///
/// Returns `ParseError` if:
/// - Both Content-Length and Transfer-Encoding headers are present
/// - Content-Length value is invalid
pub(crate) fn parse_transfer_strategy(head: &ResponseHead, head_request: bool) -> Result<TransferStrategy, ParseError> {
    if head_request || is_bodiless_status(head.status()) {
        return Ok(TransferStrategy::Length(0));
    }

    // refer: https://www.rfc-editor.org/rfc/rfc9112.html#name-message-body-length
    let te_header = head.headers().get(http::header::TRANSFER_ENCODING);
    let cl_header = head.headers().get(http::header::CONTENT_LENGTH);

    match (te_header, cl_header) {
        (None, None) => Ok(TransferStrategy::Identity),

        (te_value @ Some(_), None) => {
            if is_chunked(te_value) {
                Ok(TransferStrategy::Chunked)
            } else {
                Ok(TransferStrategy::Identity)
            }
        }

        (None, Some(cl_value)) => {
            let cl_str = cl_value.to_str().map_err(|_| ParseError::invalid_content_length("value can't to_str"))?;

            let length =
                cl_str.trim().parse::<u64>().map_err(|_| ParseError::invalid_content_length(format!("value {cl_str} is not u64")))?;

            Ok(TransferStrategy::Length(length))
        }

        (Some(_), Some(_)) => Err(ParseError::invalid_content_length("transfer_encoding and content_length both present in headers")),
    }
}

/// Checks if the Transfer-Encoding header indicates chunked encoding.
///
/// According to RFC 7230, chunked must be the last encoding if present.
fn is_chunked(header_value: Option<&HeaderValue>) -> bool {
    const CHUNKED: &[u8] = b"chunked";
    if let Some(value) = header_value {
        if let Some(bytes) = value.as_bytes().rsplit(|b| *b == b',').next() {
            return bytes.trim_ascii().eq_ignore_ascii_case(CHUNKED);
        }
    }
    false
}
