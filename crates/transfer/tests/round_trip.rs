mod common;

use bytes::{Bytes, BytesMut};
use common::{AfterResponses, init_tracing, serve};
use http::{Request, StatusCode};
use http_body_util::{Empty, Full};
use micro_transfer::codec::{DecodeState, PayloadDecoder, PayloadEncoder};
use micro_transfer::connection::{ClientSession, Exchange, SessionState};
use micro_transfer::entity::{EntityConsumer, StrictConsumer, TruncationPolicy};
use micro_transfer::job::{Job, JobCorrelator};
use micro_transfer::protocol::{HttpError, PayloadItem};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::codec::{Decoder, Encoder};

fn chunked_wire(parts: &[&[u8]]) -> BytesMut {
    let mut encoder = PayloadEncoder::chunked();
    let mut wire = BytesMut::new();
    for part in parts {
        encoder.encode(PayloadItem::Chunk(Bytes::copy_from_slice(part)), &mut wire).unwrap();
    }
    encoder.encode(PayloadItem::<Bytes>::Eof, &mut wire).unwrap();
    wire
}

fn decode_all(decoder: &mut PayloadDecoder, src: &mut BytesMut) -> Vec<u8> {
    let mut consumer = StrictConsumer::new(None);
    decoder.decode_into(src, &mut consumer).unwrap();
    let mut entity = Box::new(consumer).into_entity();
    entity.content().map(|bytes| bytes.to_vec()).unwrap_or_default()
}

#[test]
fn chunked_round_trip() {
    let large = vec![0u8; 5000];
    let inputs: Vec<Vec<&[u8]>> =
        vec![vec![], vec![&b""[..]], vec![&b"hello world"[..]], vec![&b"a"[..], &b""[..], &b"bc"[..], &large[..]]];

    for parts in &inputs {
        let expected = parts.concat();
        let mut wire = chunked_wire(parts);
        let terminal_at = wire.len() - 5;

        let mut decoder = PayloadDecoder::chunked();
        let mut head = wire.split_to(terminal_at);
        let mut consumer = StrictConsumer::new(None);
        decoder.decode_into(&mut head, &mut consumer).unwrap();
        assert!(!decoder.is_completed());

        decoder.decode_into(&mut wire, &mut consumer).unwrap();
        assert!(decoder.is_completed());
        assert_eq!(decoder.state(), DecodeState::Completed);

        let mut entity = Box::new(consumer).into_entity();
        assert_eq!(entity.content().unwrap().to_vec(), expected);
    }
}

#[test]
fn byte_at_a_time_matches_all_at_once() {
    let mut wire = BytesMut::from(&b"5;name=value\r\nhello\r\n1A \r\n"[..]);
    wire.extend_from_slice(&[b'x'; 26]);
    wire.extend_from_slice(b"\r\n0\r\nExpires: never\r\nX-Trailer: 1\r\n\r\n");
    let wire = wire.freeze();

    let all_at_once = decode_all(&mut PayloadDecoder::chunked(), &mut BytesMut::from(&wire[..]));

    let mut decoder = PayloadDecoder::chunked();
    let mut consumer = StrictConsumer::new(None);
    let mut src = BytesMut::new();
    let mut produced = 0;
    for (index, byte) in wire.iter().enumerate() {
        assert!(!decoder.is_completed(), "completed early at byte {index}");
        src.extend_from_slice(&[*byte]);
        produced += decoder.decode_into(&mut src, &mut consumer).unwrap();
    }
    assert!(decoder.is_completed());
    assert_eq!(produced, 31);

    let mut entity = Box::new(consumer).into_entity();
    assert_eq!(entity.content().unwrap().to_vec(), all_at_once);
    assert_eq!(all_at_once.len(), 31);
}

#[test]
fn identity_body_ends_at_close() {
    let mut decoder = PayloadDecoder::until_close();
    let mut consumer = StrictConsumer::new(None);
    let mut src = BytesMut::from(&b"partial"[..]);

    decoder.decode_into(&mut src, &mut consumer).unwrap();
    assert!(!decoder.is_completed());

    src.extend_from_slice(b" body");
    while let Some(item) = decoder.decode_eof(&mut src).unwrap() {
        match item {
            PayloadItem::Chunk(bytes) => consumer.consume(bytes).unwrap(),
            PayloadItem::Eof => consumer.on_complete(),
        }
    }
    assert!(decoder.is_completed());

    let mut entity = Box::new(consumer).into_entity();
    assert_eq!(&entity.content().unwrap()[..], b"partial body");
}

#[tokio::test]
async fn entity_is_consumed_once() {
    init_tracing();
    let response = b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\nabab".to_vec();
    let (reader, writer, _server) = serve(vec![response], AfterResponses::Close);
    let mut session = ClientSession::new(reader, writer);

    let request = Request::get("/abx2").body(Empty::<Bytes>::new()).unwrap();
    let (_, mut entity) = session.execute(request, Box::new(StrictConsumer::new(None)), ()).await.into_result().unwrap();

    assert_eq!(entity.len(), 4);
    let mut sink = Vec::new();
    assert_eq!(entity.write_to(&mut sink).await.unwrap(), 4);
    assert_eq!(sink, b"abab");
    assert!(entity.content().unwrap_err().is_illegal_state());
}

#[tokio::test]
async fn keep_alive_session_serves_two_exchanges() {
    init_tracing();
    let responses = vec![
        b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\nabab".to_vec(),
        b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nxyz\r\n3\r\nxyz\r\n0\r\n\r\n".to_vec(),
    ];
    let (reader, writer, server) = serve(responses, AfterResponses::Close);
    let mut session = ClientSession::new(reader, writer);

    let request = Request::get("http://localhost/abx2").body(Empty::<Bytes>::new()).unwrap();
    let first = session.execute(request, session.config().consumer(), 1).await;
    assert!(first.is_success());
    assert_eq!(session.state(), SessionState::Reusable);

    let request = Request::post("http://localhost/xyzx2").body(Full::new(Bytes::from_static(b"payload"))).unwrap();
    let (_, mut entity) = session.execute(request, session.config().consumer(), 2).await.into_result().unwrap();
    assert_eq!(&entity.content().unwrap()[..], b"xyzxyz");
    assert_eq!(session.state(), SessionState::Reusable);

    let requests = server.await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].starts_with("POST /xyzx2 HTTP/1.1\r\n"));
    assert!(requests[1].contains("content-length: 7\r\n"));
}

#[tokio::test]
async fn identity_response_completes_at_close() {
    init_tracing();
    let response = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nuntil close".to_vec();
    let (reader, writer, _server) = serve(vec![response], AfterResponses::Close);
    let mut session = ClientSession::new(reader, writer);

    let (_, mut entity) = session
        .execute(Request::get("/").body(Empty::<Bytes>::new()).unwrap(), TruncationPolicy::Strict.consumer(None), ())
        .await
        .into_result()
        .unwrap();

    assert_eq!(&entity.content().unwrap()[..], b"until close");
    assert_eq!(session.state(), SessionState::Completed);

    let request = Request::get("/").body(Empty::<Bytes>::new()).unwrap();
    let outcome = session.execute(request, TruncationPolicy::Strict.consumer(None), ()).await;
    assert!(matches!(outcome.into_result(), Err(HttpError::ConnectionClosed)));
}

#[tokio::test]
async fn run_reports_every_exchange_to_the_correlator() {
    init_tracing();
    let responses = vec![
        b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\nabab".to_vec(),
        b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\nConnection: close\r\n\r\nccc".to_vec(),
    ];
    let (reader, writer, _server) = serve(responses, AfterResponses::Close);
    let mut session = ClientSession::new(reader, writer);

    let correlator = Arc::new(JobCorrelator::new());
    let jobs = [Job::new("ab", 2), Job::new("c", 3), Job::new("d", 1)].map(Arc::new);

    let exchanges: Vec<_> = jobs
        .iter()
        .map(|job| {
            let id = correlator.register(Arc::clone(job));
            let request = Request::get(job.request_path()).body(Empty::<Bytes>::new()).unwrap();
            Exchange::new(request, session.config().consumer(), id)
        })
        .collect();

    session.run(exchanges, &correlator).await;

    for job in &jobs[..2] {
        job.wait_for(Duration::from_secs(1)).await.unwrap();
        assert!(job.is_successful());
        assert_eq!(job.status_code(), Some(StatusCode::OK));
        assert_eq!(job.body(), Some(job.expected().as_str()));
    }

    assert!(jobs[2].is_completed());
    assert!(!jobs[2].is_successful());
    assert_eq!(session.state(), SessionState::Completed);
    assert!(correlator.is_empty());
}
