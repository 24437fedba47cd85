use bytes::{Bytes, BytesMut};
use criterion::{Criterion, criterion_group, criterion_main};
use futures::executor::block_on;
use http::Request;
use http_body_util::Empty;
use micro_transfer::codec::{PayloadEncoder, RequestEncoder, ResponseDecoder};
use micro_transfer::config::SessionConfig;
use micro_transfer::connection::ClientSession;
use micro_transfer::protocol::{Message, PayloadItem, RequestHead, TransferStrategy};
use std::hint::black_box;
use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_util::codec::{Decoder, Encoder};

const CHUNKED_RESPONSE: &[u8] =
    b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nHello\r\n1;ext=1\r\n \r\n6\r\nWorld!\r\n0\r\n\r\n";

// Mock IO for testing
#[derive(Clone)]
struct MockIO {
    read_data: Vec<u8>,
    write_data: Vec<u8>,
    read_pos: usize,
}

impl MockIO {
    fn new(read_data: Vec<u8>) -> Self {
        Self { read_data, write_data: Vec::new(), read_pos: 0 }
    }
}

impl AsyncRead for MockIO {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let remaining = &self.read_data[self.read_pos..];
        let amt = std::cmp::min(remaining.len(), buf.remaining());
        buf.put_slice(&remaining[..amt]);
        self.read_pos += amt;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockIO {
    fn poll_write(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        self.write_data.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

fn bench_response_decoder(c: &mut Criterion) {
    c.bench_function("decode_chunked_response", |b| {
        b.iter(|| {
            let mut decoder = ResponseDecoder::new();
            let mut bytes = BytesMut::from(CHUNKED_RESPONSE);
            while let Some(message) = decoder.decode(&mut bytes).unwrap() {
                black_box(message);
            }
        });
    });
}

fn bench_request_encoder(c: &mut Criterion) {
    c.bench_function("encode_chunked_request", |b| {
        b.iter(|| {
            let mut encoder = RequestEncoder::new();
            let mut bytes = BytesMut::new();
            let head = Request::post("http://localhost/upload").body(()).unwrap();
            encoder.encode(Message::<_, Bytes>::Header((head, TransferStrategy::Chunked)), &mut bytes).unwrap();
            encoder
                .encode(Message::<(RequestHead, TransferStrategy), _>::Payload(PayloadItem::Chunk(Bytes::from_static(b"Hello World!"))), &mut bytes)
                .unwrap();
            encoder.encode(Message::<(RequestHead, TransferStrategy), Bytes>::Payload(PayloadItem::Eof), &mut bytes).unwrap();
            black_box(bytes);
        });
    });

    c.bench_function("encode_chunks", |b| {
        let data = Bytes::from(vec![b'a'; 16 * 1024]);
        b.iter(|| {
            let mut encoder = PayloadEncoder::chunked();
            let mut bytes = BytesMut::with_capacity(20 * 1024);
            for chunk in data.chunks(1024) {
                encoder.encode_buf(&mut &chunk[..], &mut bytes).unwrap();
            }
            encoder.complete(&mut bytes).unwrap();
            black_box(bytes);
        });
    });
}

fn bench_client_session(c: &mut Criterion) {
    let config = SessionConfig::builder().idle_timeout(None).build();

    c.bench_function("execute_simple_request", |b| {
        b.iter(|| {
            let mock_io = MockIO::new(CHUNKED_RESPONSE.to_vec());
            let (reader, writer) = (mock_io.clone(), mock_io);
            let mut session = ClientSession::with_config(reader, writer, config.clone());
            let request = Request::get("http://localhost/").body(Empty::<Bytes>::new()).unwrap();
            let outcome = block_on(session.execute(request, config.consumer(), ()));
            black_box(outcome.into_result().unwrap());
        });
    });
}

criterion_group!(benches, bench_response_decoder, bench_request_encoder, bench_client_session);
criterion_main!(benches);
