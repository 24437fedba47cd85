use crate::buffer::TransferBuffer;
use crate::codec::RequestEncoder;
use crate::protocol::{Message, PayloadItem, RequestHead, SendError, TransferStrategy};
use bytes::Buf;
use http::Request;
use http_body::Body;
use http_body_util::BodyExt;
use std::fmt::Display;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::{debug, trace};

/// Encodes requests into an outbound [`TransferBuffer`] and flushes it to the channel.
#[derive(Debug)]
pub struct MessageWriter<W> {
    writer: W,
    buffer: TransferBuffer,
    buffer_size: usize,
    encoder: RequestEncoder,
}

impl<W> MessageWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn with_capacity(writer: W, buffer_size: usize) -> Self {
        Self { writer, buffer: TransferBuffer::with_capacity(buffer_size), buffer_size, encoder: RequestEncoder::new() }
    }

    #[inline]
    pub fn write<D>(&mut self, item: Message<(RequestHead, TransferStrategy), D>) -> Result<(), SendError>
    where
        D: Buf,
    {
        self.encoder.encode(item, self.buffer.bytes_mut())
    }

    #[inline]
    pub async fn flush(&mut self) -> Result<usize, SendError> {
        if self.buffer.is_empty() {
            return Ok(0);
        }

        Ok(self.buffer.flush_to(&mut self.writer).await?)
    }

    /// Writes the request head and streams the body through the content encoder.
    ///
    /// The transfer strategy comes from the body size hint: an exact hint is sent with
    /// `Content-Length`, anything else chunked.
    pub async fn send_request<B>(&mut self, request: Request<B>) -> Result<(), SendError>
    where
        B: Body + Unpin,
        B::Error: Display,
    {
        let (parts, mut body) = request.into_parts();
        let strategy = TransferStrategy::from(body.size_hint());
        debug!(method = %parts.method, uri = %parts.uri, ?strategy, "send request");

        self.write(Message::<_, B::Data>::Header((RequestHead::from_parts(parts, ()), strategy)))?;

        loop {
            match body.frame().await {
                Some(Ok(frame)) => {
                    // trailers of the outbound body are not sent
                    if let Ok(data) = frame.into_data() {
                        self.write(Message::Payload(PayloadItem::Chunk(data)))?;
                    }

                    if self.buffer.len() >= self.buffer_size {
                        let written = self.flush().await?;
                        trace!(written, "flush request body");
                    }
                }
                Some(Err(e)) => return Err(SendError::invalid_body(format!("resolve request body error: {e}"))),
                None => {
                    self.write(Message::<(RequestHead, TransferStrategy), B::Data>::Payload(PayloadItem::Eof))?;
                    break;
                }
            }
        }

        self.flush().await?;
        Ok(())
    }

    /// Closes the outbound side of the channel.
    pub async fn shutdown(&mut self) -> Result<(), SendError> {
        self.buffer.clear();
        Ok(self.writer.shutdown().await?)
    }
}
