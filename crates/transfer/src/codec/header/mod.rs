//! HTTP header processing module for encoding and decoding heads
//!
//! # Components
//!
//! - [`HeaderDecoder`]: Decodes response heads from raw bytes
//!   - Handles header field validation
//!   - Manages header size limits
//!   - Selects the [`TransferStrategy`](crate::protocol::TransferStrategy) of the body
//!
//! - [`HeaderEncoder`]: Encodes request heads to bytes
//!   - Manages content-length and transfer-encoding headers

mod header_decoder;
mod header_encoder;

pub use header_decoder::{HeaderDecoder, MAX_HEADER_BYTES};
pub use header_encoder::HeaderEncoder;
