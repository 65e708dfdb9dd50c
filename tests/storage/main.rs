//! Integration tests for Layer 1: Storage
//!
//! Tests for the dual-indexed store, the relation lookup, the identity
//! table, and inheritance traversal.

mod identity;
mod lookup;
