use crate::entity::{Entity, EntityConsumer};
use crate::protocol::{HttpError, ResponseHead};
use http::Request;
use std::sync::Arc;

/// Final result of one exchange, tagged with the context supplied when the request was issued.
#[derive(Debug)]
pub enum Outcome<C> {
    Success { response: ResponseHead, entity: Entity, context: C },
    Failure { error: HttpError, context: C },
}

impl<C> Outcome<C> {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn context(&self) -> &C {
        match self {
            Outcome::Success { context, .. } | Outcome::Failure { context, .. } => context,
        }
    }

    /// Hands the outcome to the matching callback of `sink`.
    pub fn dispatch<S>(self, sink: &S)
    where
        S: OutcomeSink<C> + ?Sized,
    {
        match self {
            Outcome::Success { response, entity, context } => sink.on_entity_complete(response, entity, context),
            Outcome::Failure { error, context } => sink.on_fatal_error(error, context),
        }
    }

    pub fn into_result(self) -> Result<(ResponseHead, Entity), HttpError> {
        match self {
            Outcome::Success { response, entity, .. } => Ok((response, entity)),
            Outcome::Failure { error, .. } => Err(error),
        }
    }
}

/// Receives the outcome of every exchange driven by [`ClientSession::run`](crate::connection::ClientSession::run).
pub trait OutcomeSink<C> {
    fn on_entity_complete(&self, response: ResponseHead, entity: Entity, context: C);

    fn on_fatal_error(&self, error: HttpError, context: C);
}

impl<C, S> OutcomeSink<C> for Arc<S>
where
    S: OutcomeSink<C> + ?Sized,
{
    fn on_entity_complete(&self, response: ResponseHead, entity: Entity, context: C) {
        (**self).on_entity_complete(response, entity, context);
    }

    fn on_fatal_error(&self, error: HttpError, context: C) {
        (**self).on_fatal_error(error, context);
    }
}

/// A request waiting to be executed, with the consumer for its response body.
#[derive(Debug)]
pub struct Exchange<B, C> {
    pub request: Request<B>,
    pub consumer: Box<dyn EntityConsumer>,
    pub context: C,
}

impl<B, C> Exchange<B, C> {
    pub fn new(request: Request<B>, consumer: Box<dyn EntityConsumer>, context: C) -> Self {
        Self { request, consumer, context }
    }
}
