//! Tests for httpshrew-support
