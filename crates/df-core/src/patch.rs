//! Merge-style edge restyling.
//!
//! A patch distinguishes three intents per field: leave it alone, clear it,
//! or set a new value. Field omission in the original object-spread merge
//! was ambiguous with explicit removal; the tri-state makes "clear this
//! marker" unmistakable from "don't touch it".

use crate::model::{Color, Edge, EdgeStroke, Marker};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One field of a merge patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Patch<T> {
    /// Preserve the prior value.
    Keep,
    /// Remove the value — or reset it to the stroke default for fields
    /// that always have one.
    Clear,
    /// Overwrite with a new value.
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    /// Apply this patch to an optional field.
    pub fn apply_opt(self, field: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Clear => *field = None,
            Patch::Set(v) => *field = Some(v),
        }
    }

    /// Apply this patch to a required field, using `reset` for `Clear`.
    pub fn apply_or(self, field: &mut T, reset: T) {
        match self {
            Patch::Keep => {}
            Patch::Clear => *field = reset,
            Patch::Set(v) => *field = v,
        }
    }
}

/// A partial edge restyle. Defaults to all-`Keep`: an empty patch is a no-op.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeStylePatch {
    pub color: Patch<Color>,
    pub width: Patch<f32>,
    pub dash: Patch<SmallVec<[f32; 4]>>,
    pub start_marker: Patch<Marker>,
    pub end_marker: Patch<Marker>,
}

impl EdgeStylePatch {
    /// The `5,5` dotted-line preset from the edge menu.
    pub fn dotted() -> Self {
        Self {
            dash: Patch::Set(SmallVec::from_slice(&[5.0, 5.0])),
            ..Default::default()
        }
    }

    /// Merge this patch into an edge. Fields left at `Keep` preserve the
    /// edge's prior values.
    pub fn apply_to(self, edge: &mut Edge) {
        let defaults = EdgeStroke::default();
        self.color.apply_or(&mut edge.stroke.color, defaults.color);
        self.width.apply_or(&mut edge.stroke.width, defaults.width);
        self.dash.apply_opt(&mut edge.stroke.dash);
        self.start_marker.apply_opt(&mut edge.start_marker);
        self.end_marker.apply_opt(&mut edge.end_marker);
    }
}
