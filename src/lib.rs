//! # mapreduce-framework
//!
//! Plans the channel topology of a parallel map-reduce kernel and renders it
//! into program source.
//!
//! ## Usage
//!
//! ```bash
//! generate-framework generate --config reco.yml --output mapreduce.go
//! generate-framework plan --config reco.yml --format yaml
//! ```
//!
//! ## Modules
//!
//! - `app` - Process configuration, logging and fatal error handling
//! - `config` - Pipeline configuration model and YAML loading
//! - `planner` - Channel index assignment for lanes, context groups and the reduce tree
//! - `render` - Template rendering of a planned topology
//! - `format` - Source tidying and external formatter support
//! - `generate` - End-to-end generation driver
//! - `testing` - Builders shared by tests and benchmarks
pub mod app;
pub mod config;
pub mod error;
pub mod format;
pub mod generate;
pub mod planner;
pub mod render;

pub mod testing;

pub use error::{Error, Result};
