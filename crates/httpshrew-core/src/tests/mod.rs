//! Tests for httpshrew-core
//!
//! Covers the allocator table, the wire codec, the response recorder, the
//! dispatcher's pool behaviour and the bridge's Handle path.


#[cfg(test)]
pub mod bridge_test;





/// Install a test logger once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Split an encoded response into (status line, header lines, body).
pub fn split_response(raw: &[u8]) -> (String, Vec<String>, Vec<u8>) {
    let end = raw
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .expect("response has no header terminator");
    let head = String::from_utf8(raw[..end].to_vec()).expect("response head is not utf-8");
    let mut lines = head.split("\r\n").map(str::to_string);
    let status = lines.next().unwrap_or_default();
    (status, lines.collect(), raw[end + 4..].to_vec())
}
