use std::io;
use std::time::Duration;
use thiserror::Error;

/// Top-level error reported by a session for a failed exchange.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to read response: {source}")]
    ResponseError {
        #[from]
        source: ParseError,
    },

    #[error("failed to send request: {source}")]
    RequestError {
        #[from]
        source: SendError,
    },

    #[error("entity error: {source}")]
    EntityError {
        #[from]
        source: EntityError,
    },

    #[error("connection idle for more than {0:?}")]
    Timeout(Duration),

    #[error("connection closed, session can't be reused")]
    ConnectionClosed,
}

impl HttpError {
    /// Returns the framing failure behind this error, if the inbound codec raised it.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            HttpError::ResponseError { source } => source.failure_kind(),
            _ => None,
        }
    }

    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.failure_kind() == Some(FailureKind::TruncatedStream)
    }

    #[inline]
    pub fn is_malformed(&self) -> bool {
        self.failure_kind() == Some(FailureKind::MalformedFraming)
    }
}

/// Why a content decoder reached its `Failed` state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The chunk-size line or a mandatory CRLF violated the chunked grammar
    MalformedFraming,
    /// The channel reached end-of-input before the body was complete
    TruncatedStream,
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("response head of {current_size} bytes exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("response carries more than {max_num} header fields")]
    TooManyHeaders { max_num: usize },

    #[error("invalid response head: {reason}")]
    InvalidHeader { reason: String },

    #[error("unsupported http version: {0:?}")]
    InvalidVersion(Option<u8>),

    #[error("invalid http status code")]
    InvalidStatus,

    #[error("invalid content-length: {reason}")]
    InvalidContentLength { reason: String },

    #[error("malformed chunk coding: {reason}")]
    MalformedFraming { reason: String },

    #[error("truncated stream: {reason}")]
    TruncatedStream { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn malformed<S: ToString>(str: S) -> Self {
        Self::MalformedFraming { reason: str.to_string() }
    }

    pub fn truncated<S: ToString>(str: S) -> Self {
        Self::TruncatedStream { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ParseError::MalformedFraming { .. } => Some(FailureKind::MalformedFraming),
            ParseError::TruncatedStream { .. } => Some(FailureKind::TruncatedStream),
            _ => None,
        }
    }

    #[inline]
    pub fn is_truncated(&self) -> bool {
        matches!(self, ParseError::TruncatedStream { .. })
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid request body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }
}

/// Errors raised while handing decoded bytes to an entity or reading them back out.
#[derive(Error, Debug)]
pub enum EntityError {
    #[error("illegal state: {reason}")]
    IllegalState { reason: String },

    #[error("entity size exceed the limit {limit}")]
    TooLarge { limit: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl EntityError {
    pub fn illegal_state<S: ToString>(str: S) -> Self {
        Self::IllegalState { reason: str.to_string() }
    }

    #[inline]
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, EntityError::IllegalState { .. })
    }
}
