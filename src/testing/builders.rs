//! Test data builders for pipeline configurations

use crate::config::{ContextConfig, MapperConfig, PipelineConfig, ReducerConfig};

/// Builder for creating test pipeline configurations
///
/// Defaults to the `max` demo: `uint32` elements, identity map, `Max` reduce.
/// The reduce depth follows the lane count unless set explicitly.
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
    depth: Option<usize>,
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig {
                context: None,
                mapper: MapperConfig {
                    type_name: "uint32".to_string(),
                    type_width: 32,
                    deserialize: "Deserialize".to_string(),
                    function: "Identity".to_string(),
                    lane_count: 4,
                },
                reducer: ReducerConfig {
                    type_name: "uint32".to_string(),
                    type_width: 32,
                    serialize: "Serialize".to_string(),
                    function: "Max".to_string(),
                    depth: 2,
                    empty: "Uint32Init".to_string(),
                },
            },
            depth: None,
        }
    }

    pub fn with_lanes(mut self, lanes: usize) -> Self {
        self.config.mapper.lane_count = lanes;
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_context(mut self, output: &str, function: &str) -> Self {
        self.config.context = Some(ContextConfig {
            output: output.to_string(),
            function: function.to_string(),
        });
        self
    }

    pub fn with_mapper_width(mut self, width: u32) -> Self {
        self.config.mapper.type_width = width;
        self
    }

    pub fn with_reducer_width(mut self, width: u32) -> Self {
        self.config.reducer.type_width = width;
        self
    }

    pub fn build(mut self) -> PipelineConfig {
        self.config.reducer.depth = self
            .depth
            .unwrap_or_else(|| self.config.lane_count().max(1).trailing_zeros() as usize);
        self.config
    }
}
