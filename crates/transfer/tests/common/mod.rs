#![allow(dead_code, reason = "each test file uses part of the helpers")]

use bytes::BytesMut;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf, duplex};
use tokio::task::JoinHandle;

pub type ClientRead = ReadHalf<DuplexStream>;
pub type ClientWrite = WriteHalf<DuplexStream>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::DEBUG).try_init();
}

/// What the fake server does once every response was written.
#[derive(Debug, Clone, Copy)]
pub enum AfterResponses {
    Close,
    HoldOpen(Duration),
}

/// Starts a server on an in-memory channel that answers each request head with the next response.
///
/// The task resolves to the request heads it received.
pub fn serve(responses: Vec<Vec<u8>>, after: AfterResponses) -> (ClientRead, ClientWrite, JoinHandle<Vec<String>>) {
    let (client, server) = duplex(64 * 1024);
    let (reader, writer) = tokio::io::split(client);
    let handle = tokio::spawn(run_server(server, responses, after));
    (reader, writer, handle)
}

async fn run_server(mut stream: DuplexStream, responses: Vec<Vec<u8>>, after: AfterResponses) -> Vec<String> {
    let mut received = Vec::new();
    let mut buf = BytesMut::new();

    for response in responses {
        let head = loop {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break buf.split_to(pos + 4);
            }
            match stream.read_buf(&mut buf).await {
                Ok(0) | Err(_) => return received,
                Ok(_) => {}
            }
        };
        received.push(String::from_utf8_lossy(&head).into_owned());

        if stream.write_all(&response).await.is_err() {
            return received;
        }
        let _ = stream.flush().await;
    }

    if let AfterResponses::HoldOpen(duration) = after {
        tokio::time::sleep(duration).await;
    }
    received
}

pub fn chunked_head() -> Vec<u8> {
    b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec()
}

pub fn concat(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}
