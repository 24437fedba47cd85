//! Entities and the consumers that build them.
//!
//! - [`Entity`]: the decoded body, readable once after it was finished
//! - [`EntityConsumer`]: receives decoded bytes and decides what truncation means
//!   - [`StrictConsumer`]: a truncated body fails the exchange
//!   - [`LenientConsumer`]: a truncated body is kept as received
//! - [`TruncationPolicy`]: selects one of the above from configuration

mod consumer;
mod content;

pub use consumer::{EntityConsumer, LenientConsumer, StrictConsumer, TruncationPolicy};
pub use content::{BUFFER_SIZE, Entity};
