//! The non-blocking transfer-encoding layer of an HTTP/1.1 client
//!
//! This crate turns the bytes arriving on a connection into discrete HTTP message bodies,
//! and request bodies into bytes on the wire, on top of tokio. It keeps partial state across
//! any number of reads, enforces the chunked transfer coding grammar incrementally, and tells
//! a cleanly finished body apart from one whose producer died mid-stream.
//!
//! # Features
//!
//! - Incremental chunked decoding, with truncation detection at end-of-input
//! - Content-Length and read-until-close bodies
//! - Chunked, fixed-length and verbatim request bodies
//! - Strict or lenient handling of truncated bodies
//! - Keep-alive reuse of a session across exchanges
//! - Idle timeout of the channel
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use http::Request;
//! use http_body_util::Empty;
//! use micro_transfer::connection::ClientSession;
//! use micro_transfer::entity::TruncationPolicy;
//! use tokio::net::TcpStream;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stream = TcpStream::connect("127.0.0.1:8080").await?;
//!     let (reader, writer) = stream.into_split();
//!     let mut session = ClientSession::new(reader, writer);
//!
//!     let request = Request::get("http://127.0.0.1:8080/").body(Empty::<Bytes>::new())?;
//!     let (response, mut entity) = session.execute(request, TruncationPolicy::Strict.consumer(None), ()).await.into_result()?;
//!
//!     println!("{} {:?}", response.status(), entity.content()?);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`buffer`]: the byte region shared by codecs and the channel
//! - [`codec`]: response decoding and request encoding
//! - [`entity`]: decoded bodies and the consumers that build them
//! - [`connection`]: the per-connection session driver
//! - [`job`]: correlation of outcomes with the requests that started them
//! - [`config`]: session configuration
//! - [`protocol`]: protocol types and errors
//!
//! # Error Handling
//!
//! - [`protocol::HttpError`]: Top-level error type
//! - [`protocol::ParseError`]: Response parsing errors, including malformed and truncated bodies
//! - [`protocol::SendError`]: Request sending errors
//! - [`protocol::EntityError`]: Entity access errors
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only
//! - No TLS support
//! - Maximum header size: 8KB
//! - Maximum number of headers: 64

pub mod buffer;
pub mod codec;
pub mod config;
pub mod connection;
pub mod entity;
pub mod job;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
