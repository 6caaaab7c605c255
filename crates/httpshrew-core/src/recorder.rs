//! In-process response recorder handed to handlers
//!
//! Handlers never see a network transport. They write their status, headers
//! and body into a [`ResponseRecorder`], which the dispatcher then turns into
//! an [`http::Response`] and encodes onto the wire.

use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use http::{Response, StatusCode};

/// Captures what a handler writes.
///
/// Semantics follow the usual response-writer contract:
/// - headers can be changed until the header is written, later changes are
///   not part of the result;
/// - only the first [`write_header`](Self::write_header) counts;
/// - the first [`write`](Self::write) implies a `200 OK` header.
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    headers: HeaderMap,
    snapshot: Option<HeaderMap>,
    status: Option<StatusCode>,
    body: Vec<u8>,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers that will be sent. Mutations after the header is written are ignored.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn headers(&self) -> &HeaderMap {
        self.snapshot.as_ref().unwrap_or(&self.headers)
    }

    pub fn write_header(&mut self, status: StatusCode) {
        if let Some(written) = self.status {
            log::debug!("superfluous write_header({}) after {}", status, written);
            return;
        }
        self.status = Some(status);
        self.snapshot = Some(self.headers.clone());
    }

    /// Append to the body, writing a `200 OK` header first if none was written.
    pub fn write(&mut self, bytes: &[u8]) {
        if self.status.is_none() {
            self.write_header(StatusCode::OK);
        }
        self.body.extend_from_slice(bytes);
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn is_written(&self) -> bool {
        self.status.is_some()
    }

    /// Build the final response.
    ///
    /// A handler that wrote nothing yields `200 OK` with an empty body. When
    /// the body is non-empty and no `Content-Type` was set, one is filled in:
    /// `text/plain; charset=utf-8` for UTF-8 bodies, `application/octet-stream`
    /// otherwise.
    pub fn finish(self) -> Response<Vec<u8>> {
        let status = self.status.unwrap_or(StatusCode::OK);
        let mut headers = self.snapshot.unwrap_or(self.headers);
        if !self.body.is_empty() && !headers.contains_key(CONTENT_TYPE) {
            let sniffed = if std::str::from_utf8(&self.body).is_ok() {
                "text/plain; charset=utf-8"
            } else {
                "application/octet-stream"
            };
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(sniffed));
        }

        let mut response = Response::new(self.body);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

impl std::io::Write for ResponseRecorder {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        ResponseRecorder::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
