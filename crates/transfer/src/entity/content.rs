use crate::ensure;
use crate::protocol::EntityError;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// Size of the slices handed to the sink by [`Entity::write_to`]
pub const BUFFER_SIZE: usize = 2048;

/// Decoded body of one response.
///
/// The content can be taken exactly once, and only after the entity was finished, either by
/// the decoder reaching its end or by a lenient consumer salvaging a truncated body.
#[derive(Debug, Default)]
pub struct Entity {
    content: BytesMut,
    finished: bool,
    consumed: bool,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, bytes: &[u8]) {
        self.content.extend_from_slice(bytes);
    }

    pub(crate) fn finish(&mut self) {
        self.finished = true;
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[inline]
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Number of bytes accumulated so far; doesn't consume the content.
    #[inline]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Takes the content out of the entity.
    ///
    /// # Errors
    ///
    /// [`EntityError::IllegalState`] if the entity isn't finished yet, or if the content was already read.
    pub fn content(&mut self) -> Result<Bytes, EntityError> {
        ensure!(self.finished, EntityError::illegal_state("entity content read before the entity was finished"));
        ensure!(!self.consumed, EntityError::illegal_state("entity content has already been consumed"));

        self.consumed = true;
        Ok(self.content.split().freeze())
    }

    /// Copies the content to `sink` in slices of at most [`BUFFER_SIZE`] bytes.
    ///
    /// This is a content read: the same rules as [`Entity::content`] apply.
    pub async fn write_to<W>(&mut self, sink: &mut W) -> Result<usize, EntityError>
    where
        W: AsyncWrite + Unpin,
    {
        let content = self.content()?;
        for slice in content.chunks(BUFFER_SIZE) {
            sink.write_all(slice).await?;
        }
        sink.flush().await?;
        trace!(written = content.len(), "entity written to sink");
        Ok(content.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_read_once_after_finish() {
        let mut entity = Entity::new();
        entity.append(b"12345");

        assert!(entity.content().unwrap_err().is_illegal_state());
        assert_eq!(entity.len(), 5);

        entity.finish();
        assert_eq!(&entity.content().unwrap()[..], b"12345");
        assert!(entity.is_consumed());
        assert!(entity.content().unwrap_err().is_illegal_state());
    }

    #[tokio::test]
    async fn write_to_copies_everything() {
        let mut entity = Entity::new();
        let body: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        entity.append(&body);
        entity.finish();

        let mut sink = Vec::new();
        assert_eq!(entity.write_to(&mut sink).await.unwrap(), 5000);
        assert_eq!(sink, body);
        assert!(entity.write_to(&mut sink).await.unwrap_err().is_illegal_state());
    }
}
