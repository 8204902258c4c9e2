//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, config
//! and cache files, Terragrunt and git lookups, and OpenSSH sessions.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod credentials;
pub mod git;
pub mod ip_cache;
pub mod ssh;
pub mod terragrunt;
