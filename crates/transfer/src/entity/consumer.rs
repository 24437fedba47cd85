use crate::entity::Entity;
use crate::protocol::{EntityError, ParseError};
use bytes::Bytes;
use std::fmt::Debug;
use tracing::warn;

/// Receives the bytes produced by a content decoder and decides what a truncated body becomes.
pub trait EntityConsumer: Send + Debug {
    /// Accepts the next decoded slice of the body.
    fn consume(&mut self, bytes: Bytes) -> Result<(), EntityError>;

    /// The decoder reached the end of the body.
    fn on_complete(&mut self);

    /// The channel ended before the body was complete.
    ///
    /// Returning the error fails the exchange; returning `Ok` keeps whatever was consumed
    /// as the final entity.
    fn on_truncated(&mut self, error: ParseError) -> Result<(), ParseError>;

    fn entity(&self) -> &Entity;

    fn into_entity(self: Box<Self>) -> Entity;
}

/// What a session does with a body whose producer died mid-stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TruncationPolicy {
    /// Report the truncation; the entity never becomes finished
    #[default]
    Strict,
    /// Keep the bytes received so far as the entity
    Lenient,
}

impl TruncationPolicy {
    pub fn consumer(self, max_size: Option<usize>) -> Box<dyn EntityConsumer> {
        match self {
            TruncationPolicy::Strict => Box::new(StrictConsumer::new(max_size)),
            TruncationPolicy::Lenient => Box::new(LenientConsumer::new(max_size)),
        }
    }
}

fn append(entity: &mut Entity, max_size: Option<usize>, bytes: &[u8]) -> Result<(), EntityError> {
    if let Some(limit) = max_size {
        if entity.len() + bytes.len() > limit {
            warn!(limit, received = entity.len() + bytes.len(), "entity exceed the size limit");
            return Err(EntityError::TooLarge { limit });
        }
    }
    entity.append(bytes);
    Ok(())
}

#[derive(Debug, Default)]
pub struct StrictConsumer {
    entity: Entity,
    max_size: Option<usize>,
}

impl StrictConsumer {
    pub fn new(max_size: Option<usize>) -> Self {
        Self { entity: Entity::new(), max_size }
    }
}

impl EntityConsumer for StrictConsumer {
    fn consume(&mut self, bytes: Bytes) -> Result<(), EntityError> {
        append(&mut self.entity, self.max_size, &bytes)
    }

    fn on_complete(&mut self) {
        self.entity.finish();
    }

    fn on_truncated(&mut self, error: ParseError) -> Result<(), ParseError> {
        Err(error)
    }

    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn into_entity(self: Box<Self>) -> Entity {
        self.entity
    }
}

#[derive(Debug, Default)]
pub struct LenientConsumer {
    entity: Entity,
    max_size: Option<usize>,
}

impl LenientConsumer {
    pub fn new(max_size: Option<usize>) -> Self {
        Self { entity: Entity::new(), max_size }
    }
}

impl EntityConsumer for LenientConsumer {
    fn consume(&mut self, bytes: Bytes) -> Result<(), EntityError> {
        append(&mut self.entity, self.max_size, &bytes)
    }

    fn on_complete(&mut self) {
        self.entity.finish();
    }

    fn on_truncated(&mut self, error: ParseError) -> Result<(), ParseError> {
        warn!(cause = %error, salvaged = self.entity.len(), "body truncated, keep the bytes received so far");
        self.entity.finish();
        Ok(())
    }

    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn into_entity(self: Box<Self>) -> Entity {
        self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_reports_truncation() {
        let mut consumer = TruncationPolicy::Strict.consumer(None);
        consumer.consume(Bytes::from_static(b"12345")).unwrap();

        let error = consumer.on_truncated(ParseError::truncated("closed mid chunk")).unwrap_err();
        assert!(error.is_truncated());

        let mut entity = consumer.into_entity();
        assert!(!entity.is_finished());
        assert!(entity.content().unwrap_err().is_illegal_state());
    }

    #[test]
    fn lenient_salvages_consumed_bytes() {
        let mut consumer = TruncationPolicy::Lenient.consumer(None);
        consumer.consume(Bytes::from_static(b"12345")).unwrap();
        consumer.on_truncated(ParseError::truncated("closed mid chunk")).unwrap();

        let mut entity = consumer.into_entity();
        assert_eq!(&entity.content().unwrap()[..], b"12345");
    }

    #[test]
    fn size_limit() {
        let mut consumer = StrictConsumer::new(Some(4));
        consumer.consume(Bytes::from_static(b"1234")).unwrap();
        assert!(matches!(consumer.consume(Bytes::from_static(b"5")), Err(EntityError::TooLarge { limit: 4 })));
        assert_eq!(consumer.entity().len(), 4);
    }
}
