//! Topology planning for generated map-reduce pipelines
//!
//! Every intermediate value of the generated program lives in a channel
//! identified by an integer in one flat index space. The planner decides
//! those indices:
//!
//! - map lanes own indices `0..lane_count`, one per lane output;
//! - each reduce level combines adjacent pairs of the previous level's
//!   outputs and writes into a fresh block of indices above them;
//! - the broadcast context reaches lanes through one forwarding channel per
//!   group of `1 << GROUP_SHIFT` lanes, so the broadcast source never feeds
//!   more than one group directly.
//!
//! All derivations are pure functions of a validated [`PipelineConfig`].

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use std::iter;
use tracing::{debug, trace};

mod types;

pub use types::{ContextGroupSpec, MapperLaneSpec, ReduceLevel, ReduceNodeSpec, Topology};

/// log2 of the number of lanes sharing one context forwarding channel.
pub const GROUP_SHIFT: u32 = 4;

/// Largest lane count the planner will lay out. A plan holds about two
/// specs per lane, so this keeps a plan well under a hundred megabytes.
pub const MAX_PLANNED_LANES: usize = 1 << 20;

/// Position of the reduce tree between two levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stage {
    /// First channel index holding this level's inputs
    read_offset: usize,
    /// Base of the output block; node `k` writes to `write_ptr + width + k`
    write_ptr: usize,
    /// Live values entering this level
    width: usize,
}

impl Stage {
    fn initial(lane_count: usize) -> Self {
        Self {
            read_offset: 0,
            write_ptr: 0,
            width: lane_count,
        }
    }

    fn nodes(self, final_level: bool) -> impl Iterator<Item = ReduceNodeSpec> {
        (0..self.width / 2).map(move |k| {
            let input_a = self.read_offset + 2 * k;
            ReduceNodeSpec {
                output_index: self.write_ptr + self.width + k,
                input_a,
                input_b: input_a + 1,
                last: final_level && 2 * k + 2 == self.width,
            }
        })
    }

    /// Skip the level's outputs: one slot per pair plus a reserved half
    /// block, which is `width` because every reduced level has even width.
    fn advance(self) -> Self {
        Self {
            read_offset: self.read_offset + self.width,
            write_ptr: self.write_ptr + self.width,
            width: self.width / 2,
        }
    }
}

/// Derives channel index assignments from a pipeline configuration
#[derive(Debug, Clone, Copy)]
pub struct TopologyPlanner<'a> {
    config: &'a PipelineConfig,
}

impl<'a> TopologyPlanner<'a> {
    /// Validate the configuration and wrap it for planning.
    ///
    /// Lane counts above [`MAX_PLANNED_LANES`] are rejected here, before
    /// any per-lane storage is allocated.
    pub fn new(config: &'a PipelineConfig) -> Result<Self> {
        config.validate()?;
        if config.lane_count() > MAX_PLANNED_LANES {
            return Err(Error::Configuration(format!(
                "mapper.replicate {} exceeds the planning limit of {MAX_PLANNED_LANES} lanes",
                config.lane_count()
            )));
        }
        Ok(Self { config })
    }

    pub fn context_shift(&self) -> u32 {
        GROUP_SHIFT
    }

    fn group_count(&self) -> usize {
        self.config.lane_count() >> GROUP_SHIFT
    }

    /// Whether lanes read the context through intermediate group channels.
    pub fn has_context_fanout(&self) -> bool {
        self.group_count() > 0
    }

    pub fn context_groups(&self) -> Vec<ContextGroupSpec> {
        (0..self.group_count())
            .map(|index| ContextGroupSpec { index })
            .collect()
    }

    pub fn mapper_lanes(&self) -> Vec<MapperLaneSpec> {
        (0..self.config.lane_count())
            .map(|index| MapperLaneSpec {
                index,
                context_index: index >> GROUP_SHIFT,
            })
            .collect()
    }

    /// Stages entered by each reduce level, in order.
    fn stages(&self) -> impl Iterator<Item = Stage> {
        iter::successors(Some(Stage::initial(self.config.lane_count())), |stage| {
            Some(stage.advance())
        })
    }

    pub fn reduce_levels(&self) -> Vec<ReduceLevel> {
        let depth = self.config.depth();
        self.stages()
            .take(depth)
            .enumerate()
            .map(|(level, stage)| {
                let nodes: ReduceLevel = stage.nodes(level + 1 == depth).collect();
                trace!(
                    level,
                    width = stage.width,
                    nodes = nodes.len(),
                    "Planned reduce level"
                );
                nodes
            })
            .collect()
    }

    /// Channel index holding the value left after every reduce level.
    pub fn final_index(&self) -> usize {
        self.stages()
            .nth(self.config.depth())
            .map(|stage| stage.write_ptr)
            .unwrap_or_default()
    }

    /// Collect every derivation into one view.
    pub fn plan(&self) -> Topology {
        let topology = Topology {
            lane_count: self.config.lane_count(),
            context_shift: self.context_shift(),
            use_intermediate: self.has_context_fanout(),
            contexts: self.context_groups(),
            mappers: self.mapper_lanes(),
            reducers: self.reduce_levels(),
            last_index: self.final_index(),
        };

        debug!(
            lanes = topology.lane_count,
            groups = topology.contexts.len(),
            levels = topology.reducers.len(),
            nodes = topology.node_count(),
            final_index = topology.last_index,
            "Planned pipeline topology"
        );

        topology
    }
}

/// Validate `config` and plan its topology in one step.
pub fn plan(config: &PipelineConfig) -> Result<Topology> {
    Ok(TopologyPlanner::new(config)?.plan())
}
