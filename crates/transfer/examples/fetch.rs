//! Fetches one path over a plain TCP connection and prints the outcome.
//!
//! ```text
//! cargo run --example fetch -- 127.0.0.1:8080 /abx5 lenient
//! ```

use bytes::Bytes;
use http::Request;
use http_body_util::Empty;
use micro_transfer::config::SessionConfig;
use micro_transfer::connection::{ClientSession, Outcome};
use micro_transfer::entity::TruncationPolicy;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut args = std::env::args().skip(1);
    let address = args.next().unwrap_or_else(|| "127.0.0.1:8080".to_string());
    let path = args.next().unwrap_or_else(|| "/".to_string());
    let policy = match args.next().as_deref() {
        Some("lenient") => TruncationPolicy::Lenient,
        _ => TruncationPolicy::Strict,
    };

    let tcp_stream = match TcpStream::connect(&address).await {
        Ok(tcp_stream) => tcp_stream,
        Err(e) => {
            error!(cause = %e, %address, "connect error");
            return;
        }
    };

    let config = SessionConfig::builder().idle_timeout(Some(Duration::from_secs(10))).truncation_policy(policy).build();
    let (reader, writer) = tcp_stream.into_split();
    let mut session = ClientSession::with_config(reader, writer, config);

    let request = match Request::get(format!("http://{address}{path}")).body(Empty::<Bytes>::new()) {
        Ok(request) => request,
        Err(e) => {
            error!(cause = %e, "invalid request");
            return;
        }
    };

    match session.execute(request, session.config().consumer(), path).await {
        Outcome::Success { response, mut entity, context } => {
            info!(path = %context, status = response.status().as_u16(), len = entity.len(), state = ?session.state(), "exchange finished");
            let mut stdout = tokio::io::stdout();
            if let Err(e) = entity.write_to(&mut stdout).await {
                warn!(cause = %e, "can't write entity");
            }
        }
        Outcome::Failure { error, context } => {
            error!(path = %context, cause = %error, failure = ?error.failure_kind(), "exchange failed");
        }
    }

    session.close().await;
}
