//! Unit tests for hoster CLI
//!
//! These tests use mocked dependencies and run fast without external I/O.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod infra_adapters;
mod mocks;
mod property_tests;
