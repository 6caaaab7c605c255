//! Host-side wire format: requests out, responses in

use http::header::{HeaderName, HeaderValue, CONTENT_LENGTH};
use http::{Request, Response, StatusCode, Version};
use httpshrew_core::codec::{canonical_header_name, MAX_HEADERS};

/// Serialize a request the way the guest's decoder expects it.
///
/// A `Content-Length` header is added for non-empty bodies that do not
/// already declare one.
pub fn encode_request(request: &Request<Vec<u8>>) -> Vec<u8> {
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let version = match request.version() {
        Version::HTTP_10 => "HTTP/1.0",
        _ => "HTTP/1.1",
    };

    let mut out = Vec::with_capacity(64 + request.body().len());
    out.extend_from_slice(format!("{} {} {}\r\n", request.method(), target, version).as_bytes());
    for (name, value) in request.headers() {
        out.extend_from_slice(canonical_header_name(name.as_str()).as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    let body = request.body();
    if !body.is_empty() && !request.headers().contains_key(CONTENT_LENGTH) {
        out.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

/// Parse the bytes returned by `Handle`.
///
/// Never fails: bytes that are not a well-formed HTTP response come back
/// as `502 Bad Gateway` carrying the raw bytes as body.
pub fn decode_response(bytes: &[u8]) -> Response<Vec<u8>> {
    match parse_response(bytes) {
        Some(response) => response,
        None => {
            log::warn!("guest returned {} bytes that are not an HTTP response", bytes.len());
            let mut response = Response::new(bytes.to_vec());
            *response.status_mut() = StatusCode::BAD_GATEWAY;
            response
        }
    }
}

fn parse_response(bytes: &[u8]) -> Option<Response<Vec<u8>>> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut parsed = httparse::Response::new(&mut headers);
    let head_len = match parsed.parse(bytes) {
        Ok(httparse::Status::Complete(len)) => len,
        _ => return None,
    };

    let status = StatusCode::from_u16(parsed.code?).ok()?;
    let mut response = Response::new(Vec::new());
    *response.status_mut() = status;
    *response.version_mut() = match parsed.version? {
        0 => Version::HTTP_10,
        _ => Version::HTTP_11,
    };

    let mut declared = None;
    for header in parsed.headers.iter() {
        let name = HeaderName::from_bytes(header.name.as_bytes()).ok()?;
        let value = HeaderValue::from_bytes(header.value).ok()?;
        if name == CONTENT_LENGTH {
            declared = value.to_str().ok()?.trim().parse::<usize>().ok();
        }
        response.headers_mut().append(name, value);
    }

    let rest = &bytes[head_len..];
    let body = match declared {
        Some(length) if length <= rest.len() => &rest[..length],
        Some(_) => return None,
        None => rest,
    };
    *response.body_mut() = body.to_vec();
    Some(response)
}
