//! Test helpers shared by unit tests and the integration tests.

pub mod fixtures;
