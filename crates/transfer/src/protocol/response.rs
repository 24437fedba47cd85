//! HTTP response head handling implementation.
//!
//! The response head uses the standard `http::Response` type with an empty body
//! placeholder; the decoded entity is handed out separately by the session.

use http::header::CONNECTION;
use http::{Response, StatusCode, Version};

/// Type alias for HTTP response heads.
pub type ResponseHead = Response<()>;

/// Returns true if a response with this status never carries a body.
///
/// See RFC 9112 section 6.3: 1xx, 204 and 304 responses end at the empty line after the head.
pub fn is_bodiless_status(status: StatusCode) -> bool {
    status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED
}

/// Returns true if the peer allows another exchange on the same connection.
///
/// HTTP/1.1 defaults to keep-alive unless `Connection: close` is present, while HTTP/1.0
/// needs an explicit `Connection: keep-alive`.
pub fn is_keep_alive(head: &ResponseHead) -> bool {
    let has_token = |token: &str| {
        head.headers()
            .get_all(CONNECTION)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .any(|value| value.trim().eq_ignore_ascii_case(token))
    };

    match head.version() {
        Version::HTTP_11 => !has_token("close"),
        Version::HTTP_10 => has_token("keep-alive"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head(version: Version, connection: Option<&str>) -> ResponseHead {
        let mut builder = Response::builder().version(version).status(StatusCode::OK);
        if let Some(value) = connection {
            builder = builder.header(CONNECTION, value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn keep_alive_defaults() {
        assert!(is_keep_alive(&head(Version::HTTP_11, None)));
        assert!(!is_keep_alive(&head(Version::HTTP_11, Some("close"))));
        assert!(!is_keep_alive(&head(Version::HTTP_11, Some("Upgrade, Close"))));
        assert!(!is_keep_alive(&head(Version::HTTP_10, None)));
        assert!(is_keep_alive(&head(Version::HTTP_10, Some("Keep-Alive"))));
    }

    #[test]
    fn bodiless_statuses() {
        assert!(is_bodiless_status(StatusCode::CONTINUE));
        assert!(is_bodiless_status(StatusCode::NO_CONTENT));
        assert!(is_bodiless_status(StatusCode::NOT_MODIFIED));
        assert!(!is_bodiless_status(StatusCode::OK));
    }
}
