//! HTTP request encoder module
//!
//! Serializes a request head followed by its body. The head decides the [`TransferStrategy`]
//! and the payload items that follow are framed with the matching [`PayloadEncoder`].

use crate::codec::body::PayloadEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{Message, RequestHead, SendError, TransferStrategy};
use bytes::{Buf, BytesMut};
use std::io;
use std::io::ErrorKind;
use tokio_util::codec::Encoder;
use tracing::error;

#[derive(Debug, Default)]
pub struct RequestEncoder {
    header_encoder: HeaderEncoder,
    payload_encoder: Option<PayloadEncoder>,
}

impl RequestEncoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl<D: Buf> Encoder<Message<(RequestHead, TransferStrategy), D>> for RequestEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Message<(RequestHead, TransferStrategy), D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Message::Header((head, strategy)) => {
                if self.payload_encoder.is_some() {
                    error!("expect payload item but receive request head");
                    return Err(io::Error::from(ErrorKind::InvalidInput).into());
                }

                self.payload_encoder = Some(strategy.into());
                self.header_encoder.encode((head, strategy), dst)
            }

            Message::Payload(payload_item) => {
                let payload_encoder = if let Some(encoder) = &mut self.payload_encoder {
                    encoder
                } else {
                    error!("expect request head but receive payload item");
                    return Err(io::Error::from(ErrorKind::InvalidInput).into());
                };

                let is_eof = payload_item.is_eof();
                let result = payload_encoder.encode(payload_item, dst);

                if is_eof {
                    self.payload_encoder.take();
                }

                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PayloadItem;
    use bytes::Bytes;
    use http::Request;

    #[test]
    fn encodes_chunked_request() {
        let mut encoder = RequestEncoder::new();
        let mut dst = BytesMut::new();

        let head = Request::post("/upload").header("host", "localhost").body(()).unwrap();
        encoder.encode(Message::<_, Bytes>::Header((head, TransferStrategy::Chunked)), &mut dst).unwrap();
        encoder.encode(Message::<(RequestHead, TransferStrategy), _>::Payload(PayloadItem::Chunk(Bytes::from_static(b"abc"))), &mut dst).unwrap();
        encoder.encode(Message::<(RequestHead, TransferStrategy), Bytes>::Payload(PayloadItem::Eof), &mut dst).unwrap();

        assert_eq!(&dst[..], &b"POST /upload HTTP/1.1\r\nhost: localhost\r\ntransfer-encoding: chunked\r\n\r\n3\r\nabc\r\n0\r\n\r\n"[..]);
    }

    #[test]
    fn payload_without_head_is_rejected() {
        let mut encoder = RequestEncoder::new();
        let result =
            encoder.encode(Message::<(RequestHead, TransferStrategy), Bytes>::Payload(PayloadItem::Eof), &mut BytesMut::new());
        assert!(result.is_err());
    }
}
