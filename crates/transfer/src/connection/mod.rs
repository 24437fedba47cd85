//! Client connection handling module
//!
//! This module drives HTTP exchanges over a connection: the request is encoded into an
//! outbound buffer, the response is decoded as the bytes arrive, and every exchange ends
//! in a tagged [`Outcome`].
//!
//! # Components
//!
//! - [`ClientSession`]: per-connection driver that:
//!   - Writes requests through [`MessageWriter`]
//!   - Decodes response heads and bodies
//!   - Detects truncated bodies and applies the truncation policy
//!   - Decides whether the connection can be reused
//!
//! - [`Outcome`] / [`OutcomeSink`]: results of exchanges and their receivers

mod client_session;
mod message_writer;
mod outcome;

pub use client_session::{ClientSession, SessionState};
pub use message_writer::MessageWriter;
pub use outcome::{Exchange, Outcome, OutcomeSink};
