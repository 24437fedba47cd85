//! HTTP request head handling.
//!
//! The outbound request head is the standard `http::Request` with an empty body
//! placeholder; the body travels separately through the content encoder.

use http::{Method, Request};

/// Type alias for HTTP request heads before the body is written.
pub type RequestHead = Request<()>;

/// Determines if a request with this method carries a body when none is declared.
///
/// Returns false for methods that typically don't have bodies:
/// - GET
/// - HEAD
/// - DELETE
/// - OPTIONS
/// - CONNECT
pub fn need_body(method: &Method) -> bool {
    !matches!(method, &Method::GET | &Method::HEAD | &Method::DELETE | &Method::OPTIONS | &Method::CONNECT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_methods() {
        assert!(need_body(&Method::POST));
        assert!(need_body(&Method::PUT));
        assert!(!need_body(&Method::GET));
        assert!(!need_body(&Method::HEAD));
    }
}
