//! httpshrew Test Suite
//!
//! End-to-end tests that drive the echo guest through the host adapter,
//! exercising the full Alloc / Handle / Free protocol.

pub mod tests;

// Re-export test utilities for external use
pub use tests::{TestConfig, TestUtils};
