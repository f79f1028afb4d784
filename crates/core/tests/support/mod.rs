//! Shared test helpers for `cadence-core` integration tests.
//!
//! These helpers provide an in-memory catalog store, a provider that counts
//! acquisitions and teardowns, and a predictable data source so workload tests
//! can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod data;
pub mod stores;
