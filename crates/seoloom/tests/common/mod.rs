//! Shared test utilities for seoloom integration tests.
//!
//! - `TestHarness` for an isolated on-disk job database
//! - Collaborator fakes that count calls or fail on demand

pub mod fakes;
pub mod harness;

pub use fakes::*;
pub use harness::TestHarness;
