use std::fmt::Display;

use http::{Method, Request};
use http_body::Body;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Decoder;
use tracing::{debug, error, info, trace, warn};

use crate::buffer::{ReadStatus, TransferBuffer};
use crate::codec::{DecodeState, ResponseDecoder};
use crate::config::SessionConfig;
use crate::connection::message_writer::MessageWriter;
use crate::connection::outcome::{Exchange, Outcome, OutcomeSink};
use crate::entity::{Entity, EntityConsumer};
use crate::protocol::{HttpError, Message, ParseError, PayloadItem, ResponseHead, TransferStrategy, is_keep_alive};

/// Where a [`ClientSession`] stands in its exchange cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No exchange has run yet
    Idle,
    /// The request was written and flushed
    RequestSent,
    AwaitingResponseHead,
    ConsumingResponseBody,
    /// The last body ended, but the connection can't carry another exchange
    Completed,
    /// The last body ended and the connection can carry another exchange
    Reusable,
    /// The connection was closed after a failure or a truncated body
    Closed,
}

impl SessionState {
    /// Returns true if another exchange may start.
    #[inline]
    pub fn is_reusable(&self) -> bool {
        matches!(self, SessionState::Idle | SessionState::Reusable)
    }
}

/// Drives request/response exchanges over one connection.
///
/// Every completed read pumps the available bytes through the response decoder into the
/// entity consumer of the current exchange. A channel that ends, or stays idle longer than
/// the configured timeout, before the body is complete goes through the decoder's truncation
/// check: the consumer then decides whether the exchange fails or keeps what it received.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct ClientSession<R, W> {
    reader: R,
    read_buffer: TransferBuffer,
    writer: MessageWriter<W>,
    decoder: ResponseDecoder,
    config: SessionConfig,
    state: SessionState,
}

/// How the body of one exchange ended.
enum BodyEnd {
    Completed { eof: bool },
    Salvaged,
}

/// What one read from the channel produced.
enum Filled {
    Data,
    Eof,
    /// nothing arrived within the idle timeout
    Idle,
}

impl<R, W> ClientSession<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, SessionConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: SessionConfig) -> Self {
        Self {
            reader,
            read_buffer: TransferBuffer::with_capacity(config.read_buffer_capacity()),
            writer: MessageWriter::with_capacity(writer, config.write_buffer_capacity()),
            decoder: ResponseDecoder::with_max_line_length(config.max_line_length()),
            config,
            state: SessionState::Idle,
        }
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// State of the content decoder for the current or last body.
    pub fn decode_state(&self) -> Option<DecodeState> {
        self.decoder.payload_state()
    }

    /// Sends `request` and decodes its response into `consumer`.
    ///
    /// Any failure closes the session; the outcome carries `context` either way.
    pub async fn execute<B, C>(&mut self, request: Request<B>, consumer: Box<dyn EntityConsumer>, context: C) -> Outcome<C>
    where
        B: Body + Unpin,
        B::Error: Display,
    {
        if !self.state.is_reusable() {
            warn!(state = ?self.state, "session can't run another exchange");
            return Outcome::Failure { error: HttpError::ConnectionClosed, context };
        }

        match self.do_execute(request, consumer).await {
            Ok((response, entity)) => Outcome::Success { response, entity, context },
            Err(error) => {
                error!(cause = %error, "exchange failed, close the session");
                self.close().await;
                Outcome::Failure { error, context }
            }
        }
    }

    /// Executes `exchanges` in order and reports each outcome to `sink`.
    ///
    /// Once the session can't be reused, the remaining exchanges fail with
    /// [`HttpError::ConnectionClosed`].
    pub async fn run<B, C, I, S>(&mut self, exchanges: I, sink: &S)
    where
        I: IntoIterator<Item = Exchange<B, C>>,
        B: Body + Unpin,
        B::Error: Display,
        S: OutcomeSink<C> + ?Sized,
    {
        for Exchange { request, consumer, context } in exchanges {
            self.execute(request, consumer, context).await.dispatch(sink);
        }
    }

    /// Closes the connection; calling it again is a no-op.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        self.state = SessionState::Closed;
        self.read_buffer.clear();
        if let Err(e) = self.writer.shutdown().await {
            debug!(cause = %e, "shutdown channel error");
        }
    }

    async fn do_execute<B>(&mut self, request: Request<B>, mut consumer: Box<dyn EntityConsumer>) -> Result<(ResponseHead, Entity), HttpError>
    where
        B: Body + Unpin,
        B::Error: Display,
    {
        self.decoder.set_head_request(request.method() == Method::HEAD);

        self.writer.send_request(request).await?;
        self.state = SessionState::RequestSent;

        let (head, strategy, end) = self.read_response(&mut *consumer).await?;

        match end {
            BodyEnd::Completed { eof } => {
                self.state = if !eof && strategy.is_self_delimited() && is_keep_alive(&head) {
                    SessionState::Reusable
                } else {
                    SessionState::Completed
                };
                info!(status = head.status().as_u16(), state = ?self.state, "exchange completed");
            }
            BodyEnd::Salvaged => self.close().await,
        }

        Ok((head, consumer.into_entity()))
    }

    async fn read_response(
        &mut self,
        consumer: &mut dyn EntityConsumer,
    ) -> Result<(ResponseHead, TransferStrategy, BodyEnd), HttpError> {
        let mut response = None;
        let mut eof = false;
        self.state = SessionState::AwaitingResponseHead;

        loop {
            let decoded = if eof {
                self.decoder.decode_eof(self.read_buffer.bytes_mut())
            } else {
                self.decoder.decode(self.read_buffer.bytes_mut())
            };

            let message = match decoded {
                Ok(message) => message,
                Err(e) if e.is_truncated() && response.is_some() => {
                    consumer.on_truncated(e)?;
                    let (head, strategy) = response.ok_or(HttpError::ConnectionClosed)?;
                    return Ok((head, strategy, BodyEnd::Salvaged));
                }
                Err(e) => return Err(e.into()),
            };

            match message {
                Some(Message::Header((head, strategy))) => {
                    trace!(status = head.status().as_u16(), ?strategy, "receive response head");
                    self.state = SessionState::ConsumingResponseBody;
                    response = Some((head, strategy));
                }
                Some(Message::Payload(PayloadItem::Chunk(bytes))) => consumer.consume(bytes)?,
                Some(Message::Payload(PayloadItem::Eof)) => {
                    consumer.on_complete();
                    let (head, strategy) = response.ok_or(HttpError::ConnectionClosed)?;
                    return Ok((head, strategy, BodyEnd::Completed { eof }));
                }
                None if eof => {
                    let reason = if response.is_some() { "connection closed mid body" } else { "connection closed before any response was received" };
                    return Err(ParseError::truncated(reason).into());
                }
                None => match self.fill().await? {
                    Filled::Data => {}
                    Filled::Eof => eof = true,
                    // a close delimited body can't tell a stalled peer from its end
                    Filled::Idle if response.as_ref().is_some_and(|(_, strategy)| strategy.is_identity()) => {
                        consumer.on_truncated(ParseError::truncated("channel idle before the close delimited body ended"))?;
                        let (head, strategy) = response.ok_or(HttpError::ConnectionClosed)?;
                        return Ok((head, strategy, BodyEnd::Salvaged));
                    }
                    Filled::Idle => eof = true,
                },
            }
        }
    }

    /// Reads more bytes from the channel, bounded by the idle timeout.
    async fn fill(&mut self) -> Result<Filled, HttpError> {
        let read = self.read_buffer.fill_from(&mut self.reader);

        let status = match self.config.idle_timeout() {
            Some(timeout) => match tokio::time::timeout(timeout, read).await {
                Ok(status) => status.map_err(ParseError::io)?,
                Err(_) => {
                    if self.state == SessionState::AwaitingResponseHead && self.read_buffer.is_empty() {
                        warn!(?timeout, "no response before the idle timeout");
                        return Err(HttpError::Timeout(timeout));
                    }
                    warn!(?timeout, "channel idle, treat it as closed");
                    return Ok(Filled::Idle);
                }
            },
            None => read.await.map_err(ParseError::io)?,
        };

        Ok(match status {
            ReadStatus::Data(_) => Filled::Data,
            ReadStatus::Eof => Filled::Eof,
        })
    }
}
