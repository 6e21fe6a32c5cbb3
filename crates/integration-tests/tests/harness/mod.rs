//! Shared helpers for integration tests
//!
//! Each test binary pulls in the pieces it needs; the rest stays
//! unused, hence the allow.

#![allow(dead_code)]

pub mod config;
pub mod mock;
pub mod server;
