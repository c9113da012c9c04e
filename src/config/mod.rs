//! Pipeline configuration model
//!
//! Declarative shape of a generated map-reduce pipeline: how many map lanes
//! run in parallel, how deep the reduce tree is, which user functions do the
//! work, and whether a broadcast context feeds every lane.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub mod loader;

pub use loader::load_config;

/// Word size the generated program moves data in, in bits.
pub const WORD_BITS: u32 = 32;

/// Per-lane map stage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Element type consumed by each lane
    #[serde(rename = "type")]
    pub type_name: String,

    /// Width of one element in bits
    #[serde(rename = "typeWidth")]
    pub type_width: u32,

    /// Function turning the raw word stream into elements
    pub deserialize: String,

    /// Per-element transform applied by every lane
    pub function: String,

    /// Number of parallel map lanes. Must be a power of two.
    #[serde(rename = "replicate")]
    pub lane_count: usize,
}

/// Binary-tree reduce stage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducerConfig {
    /// Accumulator type produced by the combine function
    #[serde(rename = "type")]
    pub type_name: String,

    /// Width of one accumulator in bits
    #[serde(rename = "typeWidth")]
    pub type_width: u32,

    /// Function turning accumulators back into words
    pub serialize: String,

    /// Pairwise combine function
    pub function: String,

    /// Number of halving levels in the reduce tree
    pub depth: usize,

    /// Constructor for the identity accumulator
    pub empty: String,
}

/// Broadcast context handed to every lane before it maps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Type of the per-lane context value
    pub output: String,

    /// Function materializing a lane's context from the broadcast word
    pub function: String,
}

/// Complete pipeline description, as read from `reco.yml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ContextConfig>,
    pub mapper: MapperConfig,
    pub reducer: ReducerConfig,
}

impl PipelineConfig {
    /// Parse and validate a pipeline description from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn lane_count(&self) -> usize {
        self.mapper.lane_count
    }

    pub fn depth(&self) -> usize {
        self.reducer.depth
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// Depth that reduces all lanes to a single value, `log2(lane_count)`.
    ///
    /// Only meaningful for a power-of-two lane count.
    pub fn complete_depth(&self) -> usize {
        self.lane_count().trailing_zeros() as usize
    }

    pub fn is_complete_reduction(&self) -> bool {
        self.depth() == self.complete_depth()
    }

    /// Check every planning precondition, reporting the first violation.
    pub fn validate(&self) -> Result<()> {
        let lanes = self.lane_count();
        if lanes == 0 {
            return Err(Error::Configuration(
                "mapper.replicate must be at least 1".to_string(),
            ));
        }
        if !lanes.is_power_of_two() {
            return Err(Error::Configuration(format!(
                "mapper.replicate must be a power of two, got {lanes}"
            )));
        }
        if self.depth() > self.complete_depth() {
            return Err(Error::Configuration(format!(
                "reducer.depth {} exceeds log2(mapper.replicate) = {} for {} lanes",
                self.depth(),
                self.complete_depth(),
                lanes
            )));
        }

        check_width("mapper.typeWidth", self.mapper.type_width)?;
        check_width("reducer.typeWidth", self.reducer.type_width)?;

        check_identifier("mapper.type", &self.mapper.type_name)?;
        check_identifier("mapper.deserialize", &self.mapper.deserialize)?;
        check_identifier("mapper.function", &self.mapper.function)?;
        check_identifier("reducer.type", &self.reducer.type_name)?;
        check_identifier("reducer.serialize", &self.reducer.serialize)?;
        check_identifier("reducer.function", &self.reducer.function)?;
        check_identifier("reducer.empty", &self.reducer.empty)?;
        if let Some(context) = &self.context {
            check_identifier("context.output", &context.output)?;
            check_identifier("context.function", &context.function)?;
        }

        Ok(())
    }
}

fn check_width(field: &str, width: u32) -> Result<()> {
    if width == 0 || width % WORD_BITS != 0 {
        return Err(Error::Configuration(format!(
            "{field} must be a positive multiple of {WORD_BITS}, got {width}"
        )));
    }
    Ok(())
}

fn check_identifier(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Configuration(format!("{field} must not be empty")));
    }
    Ok(())
}
