//! HTTP/1.x wire codec for boundary payloads
//!
//! Requests arrive as raw bytes copied out of linear memory and are parsed
//! with `httparse` into an [`http::Request`]. Responses recorded from the
//! handler are serialized back into a complete HTTP/1.1 message. There is no
//! envelope around either direction.

use http::header::{HeaderName, HeaderValue, CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{Method, Request, Response, StatusCode, Uri, Version};
use thiserror::Error;

/// Upper bound on the number of request headers accepted.
pub const MAX_HEADERS: usize = 100;

/// Sent when the request bytes cannot be parsed.
pub const BAD_REQUEST: &[u8] = b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n";

/// Sent when no handler has been registered.
pub const INTERNAL_SERVER_ERROR: &[u8] =
    b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n";

/// Sent when the configured response timeout expires.
pub const GATEWAY_TIMEOUT: &[u8] = b"HTTP/1.1 504 Gateway Timeout\r\nContent-Length: 0\r\n\r\n";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("incomplete request head")]
    Incomplete,

    #[error("malformed request head: {0}")]
    Parse(#[from] httparse::Error),

    #[error("invalid method: {0}")]
    Method(#[from] http::method::InvalidMethod),

    #[error("invalid request target: {0}")]
    Uri(#[from] http::uri::InvalidUri),

    #[error("invalid header name: {0}")]
    HeaderName(#[from] http::header::InvalidHeaderName),

    #[error("invalid header value: {0}")]
    HeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("invalid content-length: {0}")]
    ContentLength(String),

    #[error("body truncated: expected {expected} bytes, found {found}")]
    TruncatedBody { expected: usize, found: usize },

    #[error("malformed chunked body")]
    Chunked,

    #[error("unsupported transfer-encoding: {0}")]
    TransferEncoding(String),
}

pub fn bad_request() -> Vec<u8> {
    BAD_REQUEST.to_vec()
}

pub fn internal_server_error() -> Vec<u8> {
    INTERNAL_SERVER_ERROR.to_vec()
}

pub fn gateway_timeout() -> Vec<u8> {
    GATEWAY_TIMEOUT.to_vec()
}

/// Parse a complete HTTP/1.0 or HTTP/1.1 request.
///
/// The body is framed by `Transfer-Encoding: chunked` when present (the
/// header is removed once the body is de-chunked), otherwise by
/// `Content-Length`, otherwise it is empty. Bytes past the framed body are
/// ignored.
pub fn decode_request(bytes: &[u8]) -> Result<Request<Vec<u8>>, CodecError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut parsed = httparse::Request::new(&mut headers);
    let head_len = match parsed.parse(bytes)? {
        httparse::Status::Complete(len) => len,
        httparse::Status::Partial => return Err(CodecError::Incomplete),
    };

    let method = Method::from_bytes(parsed.method.ok_or(CodecError::Incomplete)?.as_bytes())?;
    let uri = parsed.path.ok_or(CodecError::Incomplete)?.parse::<Uri>()?;
    let version = match parsed.version {
        Some(0) => Version::HTTP_10,
        _ => Version::HTTP_11,
    };

    let mut request = Request::new(Vec::new());
    *request.method_mut() = method;
    *request.uri_mut() = uri;
    *request.version_mut() = version;
    for header in parsed.headers.iter() {
        request.headers_mut().append(
            HeaderName::from_bytes(header.name.as_bytes())?,
            HeaderValue::from_bytes(header.value)?,
        );
    }

    let rest = &bytes[head_len..];
    let body = if is_chunked(&request)? {
        request.headers_mut().remove(TRANSFER_ENCODING);
        decode_chunked(rest)?
    } else {
        match content_length(&request)? {
            Some(expected) if expected > rest.len() => {
                return Err(CodecError::TruncatedBody {
                    expected,
                    found: rest.len(),
                })
            }
            Some(expected) => rest[..expected].to_vec(),
            None => Vec::new(),
        }
    };
    *request.body_mut() = body;
    Ok(request)
}

fn is_chunked<B>(request: &Request<B>) -> Result<bool, CodecError> {
    let mut codings = Vec::new();
    for value in request.headers().get_all(TRANSFER_ENCODING) {
        let value = value
            .to_str()
            .map_err(|_| CodecError::TransferEncoding("<non-ascii>".to_string()))?;
        codings.extend(
            value
                .split(',')
                .map(|coding| coding.trim().to_ascii_lowercase())
                .filter(|coding| !coding.is_empty()),
        );
    }
    match codings.as_slice() {
        [] => Ok(false),
        [only] if only == "chunked" => Ok(true),
        _ => Err(CodecError::TransferEncoding(codings.join(", "))),
    }
}

fn content_length<B>(request: &Request<B>) -> Result<Option<usize>, CodecError> {
    let mut length: Option<usize> = None;
    for value in request.headers().get_all(CONTENT_LENGTH) {
        let text = value
            .to_str()
            .map_err(|_| CodecError::ContentLength("<non-ascii>".to_string()))?
            .trim();
        let parsed = parse_digits(text, 10)
            .ok_or_else(|| CodecError::ContentLength(text.to_string()))?;
        match length {
            Some(previous) if previous != parsed => {
                return Err(CodecError::ContentLength(format!("{} and {}", previous, parsed)))
            }
            _ => length = Some(parsed),
        }
    }
    Ok(length)
}

/// Decode a `Transfer-Encoding: chunked` body, discarding extensions and trailers.
pub fn decode_chunked(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut body = Vec::new();
    let mut pos = 0;
    loop {
        let (line, next) = read_line(bytes, pos)?;
        let size_text = std::str::from_utf8(line).map_err(|_| CodecError::Chunked)?;
        let size_text = size_text.split(';').next().unwrap_or("").trim();
        let size = parse_digits(size_text, 16).ok_or(CodecError::Chunked)?;
        pos = next;

        if size == 0 {
            // trailer section ends with an empty line
            loop {
                let (trailer, next) = read_line(bytes, pos)?;
                pos = next;
                if trailer.is_empty() {
                    return Ok(body);
                }
            }
        }

        let end = pos.checked_add(size).ok_or(CodecError::Chunked)?;
        let after = end.checked_add(2).ok_or(CodecError::Chunked)?;
        if after > bytes.len() || &bytes[end..after] != b"\r\n" {
            return Err(CodecError::Chunked);
        }
        body.extend_from_slice(&bytes[pos..end]);
        pos = after;
    }
}

/// Digits only: `usize::from_str_radix` would also take a leading `+`.
fn parse_digits(text: &str, radix: u32) -> Option<usize> {
    if text.is_empty() || !text.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    usize::from_str_radix(text, radix).ok()
}

fn read_line(bytes: &[u8], start: usize) -> Result<(&[u8], usize), CodecError> {
    let rest = bytes.get(start..).ok_or(CodecError::Chunked)?;
    let offset = rest
        .windows(2)
        .position(|window| window == b"\r\n")
        .ok_or(CodecError::Chunked)?;
    Ok((&rest[..offset], start + offset + 2))
}

/// Serialize a response as an HTTP/1.1 message.
///
/// `Content-Length` always reflects the body actually sent; any value set by
/// the handler is replaced, and `Transfer-Encoding` is dropped since the body
/// is never streamed. Informational, `204 No Content` and `304 Not Modified`
/// responses carry neither a length nor a body.
pub fn encode_response(response: &Response<Vec<u8>>) -> Vec<u8> {
    let status = response.status();
    let bodyless = status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED;
    let body: &[u8] = if bodyless { &[] } else { response.body() };

    let mut out = Vec::with_capacity(128 + body.len());
    out.extend_from_slice(format!("HTTP/1.1 {} {}\r\n", status.as_str(), reason(status)).as_bytes());
    for (name, value) in response.headers() {
        if *name == CONTENT_LENGTH || *name == TRANSFER_ENCODING {
            continue;
        }
        out.extend_from_slice(canonical_header_name(name.as_str()).as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    if !bodyless {
        out.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

fn reason(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => format!("status code {}", status.as_u16()),
    }
}

/// `content-type` -> `Content-Type`
pub fn canonical_header_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        upper = c == '-';
    }
    out
}
