//! Integration tests for hoster CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.
