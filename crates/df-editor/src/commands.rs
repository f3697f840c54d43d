//! Context-menu commands.
//!
//! Right-clicking a node or edge opens a small menu; each entry maps to
//! exactly one `FlowStore` call, so a menu action is always a single
//! atomic commit with one notification.

use df_core::model::{Color, Marker};
use df_core::patch::{EdgeStylePatch, Patch};
use df_core::store::FlowStore;
use df_core::NodeId;

/// Fill swatches offered by the node menu.
pub const NODE_FILL_SWATCHES: [&str; 7] = [
    "#FFFFFF", "#FFADAD", "#FFD6A5", "#FDFFB6", "#CAFFBF", "#9BF6FF", "#A0C4FF",
];

/// Text-color swatches offered by the node menu.
pub const NODE_TEXT_SWATCHES: [&str; 6] = [
    "#000000", "#EF4444", "#3B82F6", "#10B981", "#F59E0B", "#8B5CF6",
];

/// Stroke-color swatches offered by the edge menu.
pub const EDGE_COLOR_SWATCHES: [&str; 6] = [
    "#000000", "#EF4444", "#10B981", "#3B82F6", "#F59E0B", "#8B5CF6",
];

/// Stroke widths offered by the edge menu, in pixels.
pub const EDGE_STROKE_WIDTHS: [f32; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];

/// One entry in the node context menu.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeMenuAction {
    Fill(Color),
    TextColor(Color),
    Delete,
}

/// One entry in the edge context menu.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeMenuAction {
    /// Closed arrowhead at the target end only.
    ArrowRight,
    /// Closed arrowhead at the source end only.
    ArrowLeft,
    /// No arrowheads at either end.
    ArrowNone,
    /// 5-on/5-off dash pattern.
    DottedLine,
    SolidLine,
    StrokeWidth(f32),
    StrokeColor(Color),
    Delete,
}

/// Apply a node menu entry. Unknown ids are absorbed by the store.
pub fn apply_node_action(store: &mut FlowStore, id: NodeId, action: NodeMenuAction) {
    match action {
        NodeMenuAction::Fill(color) => store.update_node_color(id, color),
        NodeMenuAction::TextColor(color) => store.update_node_text_color(id, color),
        NodeMenuAction::Delete => store.delete_node(id),
    }
}

/// Apply an edge menu entry.
pub fn apply_edge_action(store: &mut FlowStore, id: NodeId, action: EdgeMenuAction) {
    match action {
        EdgeMenuAction::ArrowRight => store.update_edge_style(
            id,
            EdgeStylePatch {
                start_marker: Patch::Clear,
                end_marker: Patch::Set(Marker::ArrowClosed),
                ..EdgeStylePatch::default()
            },
        ),
        EdgeMenuAction::ArrowLeft => store.update_edge_style(
            id,
            EdgeStylePatch {
                start_marker: Patch::Set(Marker::ArrowClosed),
                end_marker: Patch::Clear,
                ..EdgeStylePatch::default()
            },
        ),
        EdgeMenuAction::ArrowNone => store.remove_edge_markers(id, true, true),
        EdgeMenuAction::DottedLine => store.update_edge_style(id, EdgeStylePatch::dotted()),
        EdgeMenuAction::SolidLine => store.update_edge_style(
            id,
            EdgeStylePatch {
                dash: Patch::Clear,
                ..EdgeStylePatch::default()
            },
        ),
        EdgeMenuAction::StrokeWidth(width) => store.update_edge_stroke_width(id, width),
        EdgeMenuAction::StrokeColor(color) => store.update_edge_color(id, color),
        EdgeMenuAction::Delete => store.delete_edge(id),
    }
}
