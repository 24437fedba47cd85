//! Decoder implementation for HTTP chunked transfer encoding.
//!
//! This module decodes message bodies that use chunked transfer encoding
//! as specified in [RFC 7230 Section 4.1](https://tools.ietf.org/html/rfc7230#section-4.1):
//!
//! ```text
//! chunk-size [ ";" chunk-ext ] CRLF chunk-data CRLF ... "0" CRLF [ trailer ] CRLF
//! ```
//!
//! The decoder is fed whatever bytes the channel has delivered so far. It never assumes that
//! a full chunk, or even a full chunk-size line, is available in one call. When the channel
//! reaches end-of-input before the terminal zero-size chunk and its trailer section have been
//! read, [`Decoder::decode_eof`] raises [`ParseError::TruncatedStream`] instead of reporting a
//! complete body.

use crate::codec::body::DecodeState;
use crate::protocol::{FailureKind, ParseError, PayloadItem};
use bytes::{Buf, Bytes, BytesMut};
use std::task::Poll;
use tokio_util::codec::Decoder;
use tracing::{trace, warn};
use ChunkedState::*;

/// Incremental reader of a chunked entity body.
///
/// Chunk data is handed out as soon as it arrives, so a chunk larger than the buffered
/// input is returned in several pieces. Extensions and trailer fields are skipped.
///
/// `Completed` and `Failed` are terminal: once reached, further calls produce nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    remaining_size: u64,
    /// bytes consumed by the current size line, or by the whole trailer section
    line_length: usize,
    max_line_length: usize,
    failure: Option<FailureKind>,
    eof_emitted: bool,
}

impl ChunkedDecoder {
    /// `max_line_length` bounds each size line and the trailer section as a whole.
    pub fn new(max_line_length: usize) -> Self {
        Self { state: SizeStart, remaining_size: 0, line_length: 0, max_line_length, failure: None, eof_emitted: false }
    }

    /// Returns true once the terminal zero-size chunk and the trailer section were read.
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.failure.is_none() && self.state == End
    }

    pub fn state(&self) -> DecodeState {
        if let Some(kind) = self.failure {
            return DecodeState::Failed(kind);
        }

        match self.state {
            SizeStart | Size | SizeLws | Extension | SizeLf => DecodeState::ChunkSize,
            Body => DecodeState::ChunkData,
            BodyCr | BodyLf => DecodeState::ChunkTerminator,
            Trailer | TrailerLf | EndCr | EndLf => DecodeState::Trailers,
            End => DecodeState::Completed,
        }
    }

    fn fail(&mut self, kind: FailureKind, e: ParseError) -> ParseError {
        warn!(state = ?self.state, cause = %e, "chunked decoding failed");
        self.failure = Some(kind);
        e
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    SizeStart,
    Size,
    /// whitespace between the size digits and the line end
    SizeLws,
    Extension,
    SizeLf,
    Body,
    BodyCr,
    BodyLf,
    Trailer,
    TrailerLf,
    EndCr,
    EndLf,
    End,
}

impl ChunkedState {
    /// States whose bytes count against the line length limit
    fn is_line(self) -> bool {
        !matches!(self, Body | End)
    }
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Yields the next piece of chunk data, or `Eof` exactly once after the trailer section.
    ///
    /// `Ok(None)` means more input is needed, or the decoder is already terminal. Framing
    /// violations fail with [`ParseError::MalformedFraming`] and leave the decoder `Failed`.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.failure.is_some() {
            return Ok(None);
        }

        loop {
            if self.state == End {
                if self.eof_emitted {
                    return Ok(None);
                }
                trace!("chunked body completed");
                self.eof_emitted = true;
                return Ok(Some(PayloadItem::Eof));
            }

            if src.is_empty() {
                // need more data
                return Ok(None);
            }

            let mut buf = None;
            let before = src.len();
            let current = self.state;

            self.state = match current.step(src, &mut self.remaining_size, &mut buf) {
                Poll::Pending => return Ok(None),
                Poll::Ready(Ok(new_state)) => new_state,
                Poll::Ready(Err(e)) => return Err(self.fail(FailureKind::MalformedFraming, e)),
            };

            if current.is_line() {
                self.line_length += before - src.len();
                if self.line_length > self.max_line_length {
                    let e = ParseError::malformed(format!("chunk line exceed the limit {}", self.max_line_length));
                    return Err(self.fail(FailureKind::MalformedFraming, e));
                }
            }
            if matches!(self.state, Body | SizeStart) {
                self.line_length = 0;
            }

            if let Some(bytes) = buf {
                trace!(len = bytes.len(), "chunk data");
                return Ok(Some(PayloadItem::Chunk(bytes)));
            }
        }
    }

    /// Decodes the bytes left when the channel reached end-of-input.
    ///
    /// Anything short of the completed zero-size chunk and trailer section is a
    /// truncated stream, including a chunk whose declared size was never delivered.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }

        if self.state == End || self.failure.is_some() {
            return Ok(None);
        }

        let e = match self.state() {
            DecodeState::ChunkData => {
                ParseError::truncated(format!("channel closed with {} bytes of chunk data still expected", self.remaining_size))
            }
            state => ParseError::truncated(format!("channel closed while reading {state:?}")),
        };
        Err(self.fail(FailureKind::TruncatedStream, e))
    }
}

macro_rules! try_next_byte {
    ($src:ident) => {{
        if $src.len() > 0 {
            $src.get_u8()
        } else {
            return Poll::Pending;
        }
    }};
}

impl ChunkedState {
    /// Advances one transition; chunk data read on the way is left in `buf`.
    fn step(
        &self,
        src: &mut BytesMut,
        remaining_size: &mut u64,
        buf: &mut Option<Bytes>,
    ) -> Poll<Result<ChunkedState, ParseError>> {
        match self {
            SizeStart => ChunkedState::read_size_start(src, remaining_size),
            Size => ChunkedState::read_size(src, remaining_size),
            SizeLws => ChunkedState::read_size_lws(src),
            Extension => ChunkedState::read_extension(src),
            SizeLf => ChunkedState::read_size_lf(src, remaining_size),
            Body => ChunkedState::read_body(src, remaining_size, buf),
            BodyCr => ChunkedState::read_body_cr(src),
            BodyLf => ChunkedState::read_body_lf(src),
            Trailer => ChunkedState::read_trailer(src),
            TrailerLf => ChunkedState::read_trailer_lf(src),
            EndCr => ChunkedState::read_end_cr(src),
            EndLf => ChunkedState::read_end_lf(src),
            End => Poll::Ready(Ok(End)),
        }
    }

    /// Reads the first digit of a chunk size; an empty size line is rejected here.
    fn read_size_start(src: &mut BytesMut, size_per_chunk: &mut u64) -> Poll<Result<ChunkedState, ParseError>> {
        let b = try_next_byte!(src);
        match hex_value(b) {
            Some(value) => {
                *size_per_chunk = u64::from(value);
                Poll::Ready(Ok(Size))
            }
            None => Poll::Ready(Err(ParseError::malformed(format!("invalid chunk size line: unexpected byte {b:#04x}")))),
        }
    }

    /// Accumulates further hex digits, rejecting sizes that overflow `u64`.
    fn read_size(src: &mut BytesMut, size_per_chunk: &mut u64) -> Poll<Result<ChunkedState, ParseError>> {
        let radix = 16;
        match try_next_byte!(src) {
            b'\t' | b' ' => Poll::Ready(Ok(SizeLws)),
            b';' => Poll::Ready(Ok(Extension)),
            b'\r' => Poll::Ready(Ok(SizeLf)),
            b => {
                let Some(value) = hex_value(b) else {
                    return Poll::Ready(Err(ParseError::malformed(format!("invalid chunk size line: unexpected byte {b:#04x}"))));
                };

                match size_per_chunk.checked_mul(radix).and_then(|size| size.checked_add(u64::from(value))) {
                    Some(size) => {
                        *size_per_chunk = size;
                        Poll::Ready(Ok(Size))
                    }
                    None => Poll::Ready(Err(ParseError::malformed("invalid overflow chunked length"))),
                }
            }
        }
    }

    fn read_size_lws(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        // no digits once whitespace was seen
        match try_next_byte!(src) {
            b' ' | b'\t' => Poll::Ready(Ok(SizeLws)),
            b';' => Poll::Ready(Ok(Extension)),
            b'\r' => Poll::Ready(Ok(SizeLf)),
            _ => Poll::Ready(Err(ParseError::malformed("invalid chunk size linear white space"))),
        }
    }

    /// Skips chunk extensions, which end at the next CRLF.
    ///
    /// A plain LF inside an extension is rejected rather than taken as the line end.
    fn read_extension(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(SizeLf)),
            b'\n' => Poll::Ready(Err(ParseError::malformed("invalid chunk extension contains newline"))),
            _ => Poll::Ready(Ok(Extension)),
        }
    }

    /// A zero size line leads into the trailer section.
    fn read_size_lf(src: &mut BytesMut, size_per_chunk: &mut u64) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' if *size_per_chunk == 0 => Poll::Ready(Ok(EndCr)),
            b'\n' => Poll::Ready(Ok(Body)),
            _ => Poll::Ready(Err(ParseError::malformed("invalid chunk size LF"))),
        }
    }

    /// Takes as much of the current chunk as is buffered.
    fn read_body(
        src: &mut BytesMut,
        size_per_chunk: &mut u64,
        buf: &mut Option<Bytes>,
    ) -> Poll<Result<ChunkedState, ParseError>> {
        if src.is_empty() {
            return Poll::Ready(Ok(Body));
        }

        if *size_per_chunk == 0 {
            return Poll::Ready(Ok(BodyCr));
        }

        let read_size = usize::try_from(*size_per_chunk).map_or(src.len(), |remaining| remaining.min(src.len()));

        *size_per_chunk -= read_size as u64;
        *buf = Some(src.split_to(read_size).freeze());

        if *size_per_chunk > 0 {
            Poll::Ready(Ok(Body))
        } else {
            Poll::Ready(Ok(BodyCr))
        }
    }

    fn read_body_cr(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(BodyLf)),
            _ => Poll::Ready(Err(ParseError::malformed("invalid chunk body CR"))),
        }
    }

    fn read_body_lf(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' => Poll::Ready(Ok(SizeStart)),
            _ => Poll::Ready(Err(ParseError::malformed("invalid chunk body LF"))),
        }
    }

    /// Reads and ignores a trailer field up to its CR.
    fn read_trailer(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(TrailerLf)),
            _ => Poll::Ready(Ok(Trailer)),
        }
    }

    fn read_trailer_lf(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' => Poll::Ready(Ok(EndCr)),
            _ => Poll::Ready(Err(ParseError::malformed("invalid trailer end LF"))),
        }
    }

    /// Reads the final CR, or the first byte of another trailer field.
    fn read_end_cr(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\r' => Poll::Ready(Ok(EndLf)),
            _ => Poll::Ready(Ok(Trailer)), // another trailer field
        }
    }

    fn read_end_lf(src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        match try_next_byte!(src) {
            b'\n' => Poll::Ready(Ok(End)),
            _ => Poll::Ready(Err(ParseError::malformed("invalid chunk end LF"))),
        }
    }
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b + 10 - b'a'),
        b'A'..=b'F' => Some(b + 10 - b'A'),
        _ => None,
    }
}
