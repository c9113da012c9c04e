//! Channel index space of a planned pipeline

use crate::error::{Error, Result};
use crate::planner::Topology;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Slot {
    declared: bool,
    readers: usize,
}

/// One slot per channel index a topology declares.
///
/// Lane outputs are declared first, then every combine node's output in
/// level order. A declared channel is read by at most one consumer: a
/// combine node, or the final collector for the last index.
#[derive(Debug, Clone, Default)]
pub struct ChannelArena {
    slots: Vec<Slot>,
    order: Vec<usize>,
}

impl ChannelArena {
    /// Walk `topology` in declaration order, checking every read.
    pub fn from_topology(topology: &Topology) -> Result<Self> {
        let mut arena = Self::default();

        for lane in &topology.mappers {
            arena.declare(lane.index)?;
        }
        for (level, nodes) in topology.reducers.iter().enumerate() {
            for node in nodes {
                arena.read(node.input_a, level)?;
                arena.read(node.input_b, level)?;
                arena.declare(node.output_index)?;
            }
        }

        if !arena.is_declared(topology.last_index) {
            return Err(Error::Consistency(format!(
                "final index {} names no declared channel",
                topology.last_index
            )));
        }
        arena.slot_mut(topology.last_index).readers += 1;

        if let Some(&shared) = arena.order.iter().find(|&&i| arena.slots[i].readers > 1) {
            return Err(Error::Consistency(format!(
                "channel {} has {} readers",
                shared, arena.slots[shared].readers
            )));
        }

        Ok(arena)
    }

    fn slot_mut(&mut self, index: usize) -> &mut Slot {
        if index >= self.slots.len() {
            self.slots.resize(index + 1, Slot::default());
        }
        &mut self.slots[index]
    }

    fn declare(&mut self, index: usize) -> Result<()> {
        let slot = self.slot_mut(index);
        if slot.declared {
            return Err(Error::Consistency(format!(
                "channel {index} declared twice"
            )));
        }
        slot.declared = true;
        self.order.push(index);
        Ok(())
    }

    fn read(&mut self, index: usize, level: usize) -> Result<()> {
        if !self.is_declared(index) {
            return Err(Error::Consistency(format!(
                "reduce level {level} reads channel {index} before it is declared"
            )));
        }
        self.slots[index].readers += 1;
        Ok(())
    }

    pub fn is_declared(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| slot.declared)
    }

    /// Number of declared channels
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Declared channel indices in declaration order
    pub fn indices(&self) -> &[usize] {
        &self.order
    }

    /// Declared channels nothing reads, in declaration order
    pub fn unread(&self) -> Vec<usize> {
        self.order
            .iter()
            .copied()
            .filter(|&i| self.slots[i].readers == 0)
            .collect()
    }

    /// Highest declared index plus one; the size of a dense channel table.
    pub fn span(&self) -> usize {
        self.order.iter().max().map_or(0, |max| max + 1)
    }
}
