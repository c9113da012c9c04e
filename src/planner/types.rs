//! Index specs derived by the topology planner

use serde::{Deserialize, Serialize};

/// One intermediate forwarding channel for the broadcast context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextGroupSpec {
    pub index: usize,
}

/// One parallel map lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapperLaneSpec {
    /// Lane position, also the channel index of the lane's mapped output
    pub index: usize,
    /// Context group the lane pulls its broadcast value from
    pub context_index: usize,
}

/// One pairwise combine node of the reduce tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReduceNodeSpec {
    pub output_index: usize,
    pub input_a: usize,
    pub input_b: usize,
    /// Set on the node of the final level whose first input is that level's
    /// penultimate input channel. Nothing in rendering branches on it.
    pub last: bool,
}

/// All combine nodes of one tree level, in input order
pub type ReduceLevel = Vec<ReduceNodeSpec>;

/// Read-only view of a planned pipeline, as consumed by the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub lane_count: usize,
    pub context_shift: u32,
    pub use_intermediate: bool,
    pub contexts: Vec<ContextGroupSpec>,
    pub mappers: Vec<MapperLaneSpec>,
    pub reducers: Vec<ReduceLevel>,
    pub last_index: usize,
}

impl Topology {
    /// Number of combine nodes across all levels
    pub fn node_count(&self) -> usize {
        self.reducers.iter().map(Vec::len).sum()
    }

    /// Output channel of the first node of the final level.
    ///
    /// Matches `last_index` whenever at least one level exists; for a
    /// complete reduction it is the single root node.
    pub fn final_level_output(&self) -> Option<usize> {
        self.reducers
            .last()
            .and_then(|level| level.first())
            .map(|node| node.output_index)
    }
}
