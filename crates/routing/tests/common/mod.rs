//! Common test utilities for the routing crate.
//!
//! - [`mocks`] - recording collaborators for handler contract tests
//! - [`fixtures`] - resource fixtures
//! - [`harness`] - an HTTP test server over the in-memory collaborators

#![allow(dead_code)]

pub mod fixtures;
pub mod harness;
pub mod mocks;
