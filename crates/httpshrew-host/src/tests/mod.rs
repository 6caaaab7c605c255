//! Tests for httpshrew-host



#[cfg(all(test, feature = "wasmtime"))]
pub mod wasmtime_test;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
