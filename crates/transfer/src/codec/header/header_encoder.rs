//! HTTP header encoder implementation for serializing HTTP request heads
//!
//! This module encodes the request line and header fields into raw bytes. It adds the
//! `Host` header when the caller left it out and sets `Content-Length` or
//! `Transfer-Encoding` according to the [`TransferStrategy`] of the body.

use crate::protocol::{RequestHead, SendError, TransferStrategy, need_body};

use bytes::{BufMut, BytesMut};

use http::{HeaderValue, Version, header};
use std::io;
use std::io::{ErrorKind, Write};
use tokio_util::codec::Encoder;
use tracing::error;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for HTTP request heads implementing the [`Encoder`] trait.
#[derive(Debug, Clone, Default)]
pub struct HeaderEncoder;

impl Encoder<(RequestHead, TransferStrategy)> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the request head into the provided bytes buffer.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - HTTP version is not supported (only HTTP/1.0 and HTTP/1.1 are)
    /// - Writing to buffer fails
    fn encode(&mut self, item: (RequestHead, TransferStrategy), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (mut head, strategy) = item;

        let version = match head.version() {
            Version::HTTP_11 => "HTTP/1.1",
            Version::HTTP_10 => "HTTP/1.0",
            v => {
                error!(http_version = ?v, "unsupported http version");
                return Err(io::Error::from(ErrorKind::Unsupported).into());
            }
        };

        let target = head.uri().path_and_query().map_or("/", |path| path.as_str());

        dst.reserve(INIT_HEADER_SIZE);
        write!(FastWrite(dst), "{} {} {}\r\n", head.method(), target, version)?;

        if !head.headers().contains_key(header::HOST) {
            if let Some(host) = head.uri().authority().and_then(|authority| HeaderValue::from_str(authority.as_str()).ok()) {
                head.headers_mut().insert(header::HOST, host);
            }
        }

        // Set appropriate content length or transfer encoding header
        match strategy {
            TransferStrategy::Length(n) => {
                head.headers_mut().remove(header::TRANSFER_ENCODING);
                if n > 0 || need_body(head.method()) {
                    head.headers_mut().insert(header::CONTENT_LENGTH, n.into());
                } else {
                    head.headers_mut().remove(header::CONTENT_LENGTH);
                }
            }
            TransferStrategy::Chunked => {
                head.headers_mut().remove(header::CONTENT_LENGTH);
                head.headers_mut().insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
            }
            TransferStrategy::Identity => {}
        }

        // Write all headers
        for (header_name, header_value) in head.headers().iter() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, Request};

    fn encode(head: RequestHead, strategy: TransferStrategy) -> String {
        let mut dst = BytesMut::new();
        HeaderEncoder.encode((head, strategy), &mut dst).unwrap();
        String::from_utf8(dst.to_vec()).unwrap()
    }

    #[test]
    fn get_without_body() {
        let head = Request::get("http://example.com:8080/search?q=rust").body(()).unwrap();
        assert_eq!(encode(head, TransferStrategy::Length(0)), "GET /search?q=rust HTTP/1.1\r\nhost: example.com:8080\r\n\r\n");
    }

    #[test]
    fn explicit_host_is_kept() {
        let head = Request::get("/").header(header::HOST, "origin.local").body(()).unwrap();
        assert_eq!(encode(head, TransferStrategy::Length(0)), "GET / HTTP/1.1\r\nhost: origin.local\r\n\r\n");
    }

    #[test]
    fn framing_headers() {
        let head = Request::post("/upload").header(header::CONTENT_LENGTH, "99").body(()).unwrap();
        assert_eq!(encode(head, TransferStrategy::Chunked), "POST /upload HTTP/1.1\r\ntransfer-encoding: chunked\r\n\r\n");

        let head = Request::builder().method(Method::PUT).uri("/item").body(()).unwrap();
        assert_eq!(encode(head, TransferStrategy::Length(0)), "PUT /item HTTP/1.1\r\ncontent-length: 0\r\n\r\n");

        let head = Request::post("/upload").version(Version::HTTP_10).body(()).unwrap();
        assert_eq!(encode(head, TransferStrategy::Length(5)), "POST /upload HTTP/1.0\r\ncontent-length: 5\r\n\r\n");
    }

    #[test]
    fn rejects_http2() {
        let head = Request::get("/").version(Version::HTTP_2).body(()).unwrap();
        let result = HeaderEncoder.encode((head, TransferStrategy::Length(0)), &mut BytesMut::new());
        assert!(matches!(result, Err(SendError::Io { .. })));
    }
}
