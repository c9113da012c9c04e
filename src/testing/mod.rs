//! Testing utilities and fixtures
//!
//! Builders for pipeline configurations used across unit tests,
//! integration tests and benchmarks.

pub mod builders;

pub use builders::PipelineConfigBuilder;
