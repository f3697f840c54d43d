//! Structural change sets.
//!
//! Drag, resize, and delete gestures arrive as batches of tagged changes
//! keyed by id. `FlowStore` applies a whole batch as one atomic snapshot
//! transition, so observers never render a torn intermediate state.
//! Unknown ids are ignored, not errors.

use crate::id::NodeId;
use crate::model::{Position, Size};
use serde::{Deserialize, Serialize};

/// A structural change to one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NodeChange {
    /// Drag moved the node to a new position.
    Moved { id: NodeId, position: Position },
    /// Resize grip changed the node's dimensions.
    Resized { id: NodeId, size: Size },
    /// The node was removed (selection + delete key).
    Removed { id: NodeId },
    /// Selection state flipped.
    Selected { id: NodeId, selected: bool },
}

impl NodeChange {
    pub fn id(&self) -> NodeId {
        match self {
            NodeChange::Moved { id, .. }
            | NodeChange::Resized { id, .. }
            | NodeChange::Removed { id }
            | NodeChange::Selected { id, .. } => *id,
        }
    }
}

/// A structural change to one edge. Edges have no position of their own,
/// so only removal and selection apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeChange {
    Removed { id: NodeId },
    Selected { id: NodeId, selected: bool },
}

impl EdgeChange {
    pub fn id(&self) -> NodeId {
        match self {
            EdgeChange::Removed { id } | EdgeChange::Selected { id, .. } => *id,
        }
    }
}
