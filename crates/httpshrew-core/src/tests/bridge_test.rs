//! Tests for the Handle path: copy-in, dispatch, packed response, free

use super::{init_logging, split_response};
use crate::bridge::Bridge;
use crate::config::{BridgeConfig, DispatcherConfig};
use crate::recorder::ResponseRecorder;
use http::{Request, StatusCode};
use httpshrew_support::compat::{view, view_mut, Region};

fn small_bridge() -> Bridge {
    Bridge::new(BridgeConfig {
        dispatcher: DispatcherConfig {
            workers: 2,
            queue_depth: 4,
            response_timeout: None,
            enable_logging: false,
        },
    })
}

/// Host side of one round trip: write the request, call Handle, copy the
/// response out and free both buffers.
fn round_trip(bridge: &Bridge, request: &[u8]) -> Vec<u8> {
    let request_address = bridge.alloc(request.len());
    unsafe { view_mut(request_address, request.len()) }.copy_from_slice(request);

    let region = unsafe { bridge.handle(request_address, request.len()) };
    let response = unsafe { view(region.address, region.length) }.to_vec();

    bridge.free(request_address, request.len());
    bridge.free(region.address, region.length);
    response
}

#[test]
fn test_bad_input_returns_400() {
    init_logging();
    let bridge = small_bridge();
    let (status, _, body) = split_response(&round_trip(&bridge, b"definitely not http\r\n\r\n"));
    assert_eq!(status, "HTTP/1.1 400 Bad Request");
    assert!(body.is_empty());
}

#[test]
fn test_no_handler_returns_500() {
    let bridge = small_bridge();
    let (status, _, body) =
        split_response(&round_trip(&bridge, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n"));
    assert_eq!(status, "HTTP/1.1 500 Internal Server Error");
    assert!(body.is_empty());
}

#[test]
fn test_end_to_end_hello() {
    init_logging();
    let bridge = small_bridge();
    bridge.set_handler(|_request: Request<Vec<u8>>, response: &mut ResponseRecorder| {
        response.write_header(StatusCode::OK);
        response.write(b"hello from user code");
    });

    let (status, headers, body) =
        split_response(&round_trip(&bridge, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n"));
    assert_eq!(status, "HTTP/1.1 200 OK");
    assert!(headers.contains(&"Content-Length: 20".to_string()));
    assert_eq!(body, b"hello from user code");
}

#[test]
fn test_handle_leaves_only_caller_owned_buffers() {
    let bridge = small_bridge();
    bridge.set_handler(|request: Request<Vec<u8>>, response: &mut ResponseRecorder| {
        response.write(request.body());
    });

    let request = b"POST /echo HTTP/1.1\r\nContent-Length: 4\r\n\r\nping";
    let request_address = bridge.alloc(request.len());
    unsafe { view_mut(request_address, request.len()) }.copy_from_slice(request);

    let region = unsafe { bridge.handle(request_address, request.len()) };
    assert_eq!(bridge.allocator().live_allocations(), 2);
    assert_eq!(bridge.allocator().len_of(region.address), Some(region.length));

    // the request buffer may be released before the response is read
    bridge.free(request_address, request.len());
    let (_, _, body) = split_response(unsafe { view(region.address, region.length) });
    assert_eq!(body, b"ping");

    bridge.free(region.address, region.length);
    bridge.free(region.address, region.length);
    assert_eq!(bridge.allocator().live_allocations(), 0);
}

#[test]
fn test_request_is_copied_before_dispatch() {
    let bridge = small_bridge();
    bridge.set_handler(|request: Request<Vec<u8>>, response: &mut ResponseRecorder| {
        response.write(request.uri().path().as_bytes());
    });

    let request = b"GET /original HTTP/1.1\r\n\r\n";
    let address = bridge.alloc(request.len());
    unsafe { view_mut(address, request.len()) }.copy_from_slice(request);

    let region = bridge.handle_bytes(unsafe { view(address, request.len()) }.to_vec());
    unsafe { view_mut(address, request.len()) }.fill(b'x');

    let (_, _, body) = split_response(unsafe { view(region.address, region.length) });
    assert_eq!(body, b"/original");
}

#[cfg(target_pointer_width = "32")]
#[test]
fn test_region_packs_on_32_bit_targets() {
    let bridge = small_bridge();
    let region = bridge.handle_bytes(b"bad".to_vec());
    let word = region.pack().unwrap();
    assert_eq!(Region::unpack(word), region);
}

#[test]
fn test_response_region_length_matches_bytes() {
    let bridge = small_bridge();
    let region: Region = bridge.handle_bytes(b"garbage".to_vec());
    assert_eq!(region.length, crate::codec::BAD_REQUEST.len());
    assert_eq!(unsafe { view(region.address, region.length) }, crate::codec::BAD_REQUEST);
}

#[test]
fn test_global_bridge_uses_registered_handler() {
    crate::set_handler(|_request: Request<Vec<u8>>, response: &mut ResponseRecorder| {
        response.write_header(StatusCode::IM_A_TEAPOT);
    });
    let region = crate::bridge().handle_bytes(b"GET /tea HTTP/1.1\r\n\r\n".to_vec());
    let (status, _, _) = split_response(unsafe { view(region.address, region.length) });
    assert_eq!(status, "HTTP/1.1 418 I'm a teapot");
    crate::bridge().free(region.address, region.length);
}

#[test]
fn test_pack_response_matches_region() {
    let bridge = small_bridge();
    let region = Region::new(0x40, 12);
    assert_eq!(bridge.pack_response(region), (12u64 << 32) | 0x40);
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_unpackable_response_is_released() {
    let bridge = small_bridge();
    let address = bridge.allocator().allocate_from(b"response");
    let too_long = Region::new(address, u32::MAX as usize + 1);

    assert_eq!(bridge.pack_response(too_long), 0);
    assert!(!bridge.allocator().contains(address));
    assert_eq!(bridge.allocator().live_allocations(), 0);
}
