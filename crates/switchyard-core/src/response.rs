//! Response sink written by handlers

use crate::Result;
use bytes::{Bytes, BytesMut};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{header, Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;

/// Body type alias
pub type Body = Full<Bytes>;

/// Buffered response owned by a request [`Context`](crate::Context).
///
/// Handlers write a status, headers and body bytes; the router turns the
/// writer into an [`http::Response`] once the chain has unwound.
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    written: bool,
}

impl ResponseWriter {
    /// Create an empty `200 OK` writer
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
            written: false,
        }
    }

    /// Current status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Set the status code
    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self.written = true;
        self
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable response headers
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Insert a header, replacing any previous value
    pub fn header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Append raw bytes to the body
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) -> &mut Self {
        self.body.extend_from_slice(bytes.as_ref());
        self.written = true;
        self
    }

    /// Body written so far
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Whether any handler has set a status or written body bytes
    pub fn is_written(&self) -> bool {
        self.written
    }

    /// Replace the response with a plain-text body
    pub fn text(&mut self, status: StatusCode, body: impl AsRef<str>) -> &mut Self {
        self.body.clear();
        self.header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.set_status(status);
        self.write(body.as_ref())
    }

    /// Replace the response with a JSON body
    pub fn json<T: Serialize>(&mut self, status: StatusCode, body: &T) -> Result<&mut Self> {
        let json = serde_json::to_vec(body)?;
        self.body.clear();
        self.header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.set_status(status);
        Ok(self.write(json))
    }

    /// Discard status, headers and body
    pub fn reset(&mut self) {
        self.status = StatusCode::OK;
        self.headers.clear();
        self.body.clear();
        self.written = false;
    }

    /// Take the buffered response, leaving an empty writer behind
    pub fn take(&mut self) -> Response<Body> {
        let body = self.body.split().freeze();
        let mut response = Response::new(Full::new(body));
        *response.status_mut() = self.status;
        *response.headers_mut() = std::mem::take(&mut self.headers);
        self.reset();
        response
    }
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}
