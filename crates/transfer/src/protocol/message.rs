use bytes::{Buf, Bytes};
use http_body::SizeHint;

/// One item of an HTTP message as it flows through the codecs: the head first, then the
/// payload in pieces.
///
/// `T` is the head together with its transfer strategy.
#[derive(Debug)]
pub enum Message<T, Data: Buf = Bytes> {
    Header(T),
    Payload(PayloadItem<Data>),
}

/// A piece of entity body, or the end of it.
///
/// Content decoders yield these, content encoders accept them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    Chunk(Data),
    /// the body is complete, emitted once
    Eof,
}

/// How an entity body is delimited on the wire.
///
/// The strategy is decided by head parsing (`Content-Length` / `Transfer-Encoding`) on the
/// inbound side, and by the body size hint on the outbound side.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransferStrategy {
    /// No framing: inbound reads until the channel closes, outbound writes verbatim
    Identity,
    /// `Content-Length` framing
    Length(u64),
    /// `Transfer-Encoding: chunked`
    Chunked,
}

impl TransferStrategy {
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, TransferStrategy::Chunked)
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        matches!(self, TransferStrategy::Identity)
    }

    /// Returns true if there is no body to transfer
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, TransferStrategy::Length(0))
    }

    /// Returns true if the end of the body can be found without closing the channel
    #[inline]
    pub fn is_self_delimited(&self) -> bool {
        !self.is_identity()
    }
}

impl From<SizeHint> for TransferStrategy {
    fn from(size_hint: SizeHint) -> Self {
        match size_hint.exact() {
            Some(length) => TransferStrategy::Length(length),
            None => TransferStrategy::Chunked,
        }
    }
}

impl<D: Buf> PayloadItem<D> {
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }
}

impl PayloadItem {
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }

    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}
