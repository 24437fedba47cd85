//! Core protocol types shared by the codecs and the session driver.
//!
//! - **Message Handling** ([`message`]): heads and payload items
//!   - [`Message`]: Represents either a head or a payload chunk
//!   - [`PayloadItem`]: Individual payload chunks and EOF
//!   - [`TransferStrategy`]: How a body is delimited on the wire
//!
//! - **Request / Response heads** ([`request`], [`response`])
//!
//! - **Error Handling** ([`error`]):
//!   - [`HttpError`]: Session level error
//!   - [`ParseError`]: Inbound errors, including the chunked framing failures
//!   - [`SendError`]: Outbound errors
//!   - [`EntityError`]: Entity access errors

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::TransferStrategy;

mod request;
pub use request::RequestHead;
pub use request::need_body;

mod response;
pub use response::ResponseHead;
pub use response::is_bodiless_status;
pub use response::is_keep_alive;

mod error;
pub use error::EntityError;
pub use error::FailureKind;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
