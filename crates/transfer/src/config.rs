//! Session configuration.
//!
//! ```
//! use micro_transfer::config::SessionConfig;
//! use micro_transfer::entity::TruncationPolicy;
//! use std::time::Duration;
//!
//! let config = SessionConfig::builder()
//!     .idle_timeout(Some(Duration::from_secs(5)))
//!     .truncation_policy(TruncationPolicy::Lenient)
//!     .build();
//!
//! assert_eq!(config.read_buffer_capacity(), 8 * 1024);
//! ```

use crate::codec::DEFAULT_MAX_LINE_LENGTH;
use crate::entity::{EntityConsumer, TruncationPolicy};
use std::time::Duration;

const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    read_buffer_capacity: usize,
    write_buffer_capacity: usize,
    idle_timeout: Option<Duration>,
    max_line_length: usize,
    max_entity_size: Option<usize>,
    truncation_policy: TruncationPolicy,
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::new()
    }

    #[inline]
    pub fn read_buffer_capacity(&self) -> usize {
        self.read_buffer_capacity
    }

    #[inline]
    pub fn write_buffer_capacity(&self) -> usize {
        self.write_buffer_capacity
    }

    /// How long a read may wait for data before the channel is treated as closed.
    #[inline]
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    #[inline]
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    #[inline]
    pub fn max_entity_size(&self) -> Option<usize> {
        self.max_entity_size
    }

    #[inline]
    pub fn truncation_policy(&self) -> TruncationPolicy {
        self.truncation_policy
    }

    /// Creates the entity consumer the configured policy asks for.
    pub fn consumer(&self) -> Box<dyn EntityConsumer> {
        self.truncation_policy.consumer(self.max_entity_size)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfigBuilder::new().build()
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    fn new() -> Self {
        Self {
            config: SessionConfig {
                read_buffer_capacity: DEFAULT_BUFFER_CAPACITY,
                write_buffer_capacity: DEFAULT_BUFFER_CAPACITY,
                idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
                max_line_length: DEFAULT_MAX_LINE_LENGTH,
                max_entity_size: None,
                truncation_policy: TruncationPolicy::Strict,
            },
        }
    }

    pub fn read_buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.read_buffer_capacity = capacity;
        self
    }

    pub fn write_buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.write_buffer_capacity = capacity;
        self
    }

    /// `None` waits forever.
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    pub fn max_line_length(mut self, max_line_length: usize) -> Self {
        self.config.max_line_length = max_line_length;
        self
    }

    pub fn max_entity_size(mut self, max_entity_size: Option<usize>) -> Self {
        self.config.max_entity_size = max_entity_size;
        self
    }

    pub fn truncation_policy(mut self, policy: TruncationPolicy) -> Self {
        self.config.truncation_policy = policy;
        self
    }

    pub fn build(self) -> SessionConfig {
        self.config
    }
}
