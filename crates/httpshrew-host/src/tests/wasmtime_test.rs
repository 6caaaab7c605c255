use super::init_logging;
use crate::adapter::HostAdapter;
use crate::guest::GuestExports;
use crate::wasmtime_guest::WasmtimeGuest;
use http::{Request, StatusCode};
use wasmtime::{Engine, Module};

/// A bump-allocating guest that answers every request with a canned
/// response, or 500 until `_initialize` has run.
const CANNED_GUEST: &str = r#"
(module
  (memory (export "memory") 1)
  (global $next (mut i32) (i32.const 1024))
  (global $ready (mut i32) (i32.const 0))
  (data (i32.const 16) "HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok")
  (data (i32.const 256) "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n")
  (func (export "_initialize")
    (global.set $ready (i32.const 1)))
  (func (export "Alloc") (param $size i32) (result i32)
    (local $address i32)
    (local.set $address (global.get $next))
    (global.set $next (i32.add (global.get $next) (local.get $size)))
    (local.get $address))
  (func (export "Free") (param i32 i32))
  (func (export "Handle") (param i32 i32) (result i64)
    (if (result i64) (global.get $ready)
      (then (i64.or (i64.shl (i64.const 40) (i64.const 32)) (i64.const 16)))
      (else (i64.or (i64.shl (i64.const 57) (i64.const 32)) (i64.const 256)))))
)
"#;

#[test]
fn test_initialized_guest_serves_requests() {
    init_logging();
    let guest = WasmtimeGuest::from_bytes(CANNED_GUEST).unwrap();
    let mut host = HostAdapter::new(guest);

    let response = host
        .forward(&Request::get("/").body(Vec::new()).unwrap())
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"ok");
}

#[test]
fn test_guest_memory_access() {
    let mut guest = WasmtimeGuest::from_bytes(CANNED_GUEST).unwrap();
    let address = guest.alloc(5).unwrap();
    guest.write_memory(address, b"hello").unwrap();
    assert_eq!(guest.read_memory(address, 5).unwrap(), b"hello");

    let past_end = guest.memory_size();
    assert!(guest.write_memory(past_end, b"x").is_err());
}

#[test]
fn test_missing_exports_fail_to_load() {
    assert!(WasmtimeGuest::from_bytes(r#"(module (memory (export "memory") 1))"#).is_err());
    assert!(WasmtimeGuest::from_bytes(b"not a module").is_err());
}

/// Like a guest built for `wasm32-wasip1`: `_initialize` reads the size of
/// the WASI environment (what `std::env::var` does first) and stores the
/// variable count at address 0.
const WASI_GUEST: &str = r#"
(module
  (import "wasi_snapshot_preview1" "environ_sizes_get"
    (func $environ_sizes_get (param i32 i32) (result i32)))
  (memory (export "memory") 1)
  (global $next (mut i32) (i32.const 1024))
  (data (i32.const 16) "HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok")
  (func (export "_initialize")
    (drop (call $environ_sizes_get (i32.const 0) (i32.const 4))))
  (func (export "Alloc") (param $size i32) (result i32)
    (local $address i32)
    (local.set $address (global.get $next))
    (global.set $next (i32.add (global.get $next) (local.get $size)))
    (local.get $address))
  (func (export "Free") (param i32 i32))
  (func (export "Handle") (param i32 i32) (result i64)
    (i64.or (i64.shl (i64.const 40) (i64.const 32)) (i64.const 16)))
)
"#;

#[test]
fn test_wasi_guest_initializes_and_serves() {
    init_logging();
    let guest = WasmtimeGuest::from_bytes(WASI_GUEST).unwrap();
    let mut host = HostAdapter::new(guest);

    let count = host.guest_mut().read_memory(0, 4).unwrap();
    assert_eq!(count, 0u32.to_le_bytes());

    let response = host
        .forward(&Request::get("/").body(Vec::new()).unwrap())
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"ok");
}

#[test]
fn test_wasi_guest_sees_configured_environment() {
    let engine = Engine::default();
    let module = Module::new(&engine, WASI_GUEST).unwrap();
    let env = [("HTTPSHREW_WORKERS", "2"), ("HTTPSHREW_QUEUE_DEPTH", "8")];
    let mut guest = WasmtimeGuest::instantiate(&engine, &module, &env).unwrap();

    let count = guest.read_memory(0, 4).unwrap();
    assert_eq!(count, 2u32.to_le_bytes());
}
