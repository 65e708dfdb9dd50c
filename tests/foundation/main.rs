//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, Type, keys, Entity handles, and Error.

mod errors;
mod keys;
mod values;
