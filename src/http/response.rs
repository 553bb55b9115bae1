//! HTTP response building module
//!
//! Builders for the handful of responses the server produces. Error bodies
//! are fixed strings so no internal detail ever reaches a client.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, ETAG,
    LAST_MODIFIED,
};
use hyper::{Response, StatusCode};

/// Headers attached to a served file
#[derive(Debug, Clone, Copy)]
pub struct FileHeaders<'a> {
    pub content_type: &'a str,
    pub etag: &'a str,
    pub last_modified: Option<&'a str>,
    pub cache_control: &'a str,
    pub allow_all_origins: bool,
}

/// Build 200 response carrying a file
///
/// `Content-Length` always reflects the file size, including for HEAD
/// requests where the body is left empty.
pub fn build_file_response(
    data: Bytes,
    headers: &FileHeaders<'_>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, headers.content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(ETAG, headers.etag)
        .header(CACHE_CONTROL, headers.cache_control);
    if let Some(last_modified) = headers.last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }
    if headers.allow_all_origins {
        builder = builder.header(ACCESS_CONTROL_ALLOW_ORIGIN, "*");
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        build_500_response()
    })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, cache_control: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, etag)
        .header(CACHE_CONTROL, cache_control)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response for a static file
pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed");
    response
        .headers_mut()
        .insert(ALLOW, hyper::header::HeaderValue::from_static("GET, HEAD"));
    response
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    text_response(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(CONTENT_LENGTH, hyper::header::HeaderValue::from(body.len()));
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    tracing::error!("Failed to build {status} response: {error}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> FileHeaders<'static> {
        FileHeaders {
            content_type: "text/plain; charset=utf-8",
            etag: "\"abc\"",
            last_modified: Some("Sun, 06 Nov 1994 08:49:37 GMT"),
            cache_control: "public, max-age=60",
            allow_all_origins: true,
        }
    }

    #[test]
    fn test_file_response_headers() {
        let resp = build_file_response(Bytes::from_static(b"some text"), &headers(), false);
        assert_eq!(resp.status(), StatusCode::OK);
        let h = resp.headers();
        assert_eq!(h[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(h[CONTENT_LENGTH], "9");
        assert_eq!(h[ETAG], "\"abc\"");
        assert_eq!(h[CACHE_CONTROL], "public, max-age=60");
        assert_eq!(h[LAST_MODIFIED], "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(h[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_file_response_optional_headers() {
        let mut headers = headers();
        headers.last_modified = None;
        headers.allow_all_origins = false;
        let resp = build_file_response(Bytes::from_static(b"x"), &headers, false);
        assert!(resp.headers().get(LAST_MODIFIED).is_none());
        assert!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn test_head_keeps_content_length() {
        let resp = build_file_response(Bytes::from_static(b"some text"), &headers(), true);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "9");
    }

    #[test]
    fn test_error_responses() {
        assert_eq!(build_404_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(build_500_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        let resp = build_405_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], "GET, HEAD");
        assert_eq!(build_304_response("\"a\"", "no-cache").status(), StatusCode::NOT_MODIFIED);
    }
}
