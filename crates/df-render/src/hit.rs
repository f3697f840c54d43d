//! Hit testing: point → node / handle / edge lookup.
//!
//! Nodes are tested front-to-back (reverse of paint order) against their
//! actual shape outline, not just the bounding box. Edges are tested by
//! distance to the flattened curve.

use crate::shape::{edge_path, handle_position, node_rect, shape_path};
use df_core::NodeId;
use df_core::model::HandleSide;
use df_core::store::Snapshot;
use kurbo::{ParamCurve, Point, Rect, Shape};

/// Pixel radius around a handle dot that still counts as a handle hit.
pub const HANDLE_HIT_RADIUS: f64 = 8.0;

/// Find the topmost node at position (px, py). `None` means background.
pub fn hit_test_node(snapshot: &Snapshot, px: f64, py: f64) -> Option<NodeId> {
    let p = Point::new(px, py);
    for node in snapshot.nodes.iter().rev() {
        let r = node_rect(node);
        // Cheap reject before the path test.
        if !r.inflate(1.0, 1.0).contains(p) {
            continue;
        }
        if shape_path(node.kind, r).contains(p) {
            return Some(node.id);
        }
    }
    None
}

/// Find a connection handle near (px, py). Topmost node wins.
pub fn hit_test_handle(snapshot: &Snapshot, px: f64, py: f64) -> Option<(NodeId, HandleSide)> {
    let p = Point::new(px, py);
    for node in snapshot.nodes.iter().rev() {
        let r = node_rect(node);
        for side in HandleSide::ALL {
            if (handle_position(r, side) - p).hypot() <= HANDLE_HIT_RADIUS {
                return Some((node.id, side));
            }
        }
    }
    None
}

/// Find the edge closest to (px, py) within `tolerance` pixels.
pub fn hit_test_edge(snapshot: &Snapshot, px: f64, py: f64, tolerance: f64) -> Option<NodeId> {
    let p = Point::new(px, py);
    let mut best: Option<(NodeId, f64)> = None;

    for edge in &snapshot.edges {
        let (Some(src), Some(dst)) = (snapshot.node(edge.source), snapshot.node(edge.target))
        else {
            continue;
        };
        let p0 = handle_position(node_rect(src), edge.source_handle);
        let p1 = handle_position(node_rect(dst), edge.target_handle);
        let path = edge_path(p0, edge.source_handle, p1, edge.target_handle);

        for seg in path.segments() {
            // Sampling is plenty at pointer precision.
            for i in 0..=32 {
                let t = i as f64 / 32.0;
                let d = (seg.eval(t) - p).hypot();
                if d <= tolerance && best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((edge.id, d));
                }
            }
        }
    }
    best.map(|(id, _)| id)
}

/// All nodes whose bounds intersect the marquee rectangle.
pub fn nodes_in_rect(snapshot: &Snapshot, rect: Rect) -> Vec<NodeId> {
    snapshot
        .nodes
        .iter()
        .filter(|n| !node_rect(n).intersect(rect).is_zero_area())
        .map(|n| n.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_core::model::{Connection, Position, ShapeKind};
    use df_core::store::FlowStore;
    use pretty_assertions::assert_eq;

    fn store_with_two() -> (FlowStore, NodeId, NodeId) {
        let mut store = FlowStore::new();
        let a = store.add_node(ShapeKind::Rectangle, Position::new(0.0, 0.0));
        let b = store.add_node(ShapeKind::Rectangle, Position::new(300.0, 0.0));
        (store, a, b)
    }

    #[test]
    fn topmost_node_wins() {
        let mut store = FlowStore::new();
        let below = store.add_node(ShapeKind::Rectangle, Position::new(0.0, 0.0));
        // Later node fully overlaps — painted on top.
        let above = store.add_node(ShapeKind::Rectangle, Position::new(0.0, 0.0));

        let snap = store.snapshot();
        assert_eq!(hit_test_node(&snap, 75.0, 25.0), Some(above));
        assert_ne!(hit_test_node(&snap, 75.0, 25.0), Some(below));
    }

    #[test]
    fn diamond_corner_misses() {
        let mut store = FlowStore::new();
        let d = store.add_node(ShapeKind::Decision, Position::new(0.0, 0.0));
        let snap = store.snapshot();

        assert_eq!(hit_test_node(&snap, 75.0, 25.0), Some(d));
        // Inside the bbox but outside the diamond outline.
        assert_eq!(hit_test_node(&snap, 3.0, 3.0), None);
    }

    #[test]
    fn handle_hit_within_radius() {
        let (store, a, _) = store_with_two();
        let snap = store.snapshot();
        // Bottom handle of a default 150×50 node at origin: (75, 50).
        assert_eq!(
            hit_test_handle(&snap, 75.0, 53.0),
            Some((a, HandleSide::Bottom))
        );
        assert_eq!(hit_test_handle(&snap, 75.0, 120.0), None);
    }

    #[test]
    fn edge_hit_near_midpoint() {
        let (mut store, a, b) = store_with_two();
        let e = store.connect(Connection {
            source: a,
            source_handle: HandleSide::Right,
            target: b,
            target_handle: HandleSide::Left,
        });
        let snap = store.snapshot();

        // Straight-ish horizontal run between (150,25) and (300,25).
        assert_eq!(hit_test_edge(&snap, 225.0, 25.0, 6.0), Some(e));
        assert_eq!(hit_test_edge(&snap, 225.0, 120.0, 6.0), None);
    }

    #[test]
    fn marquee_collects_intersecting_nodes() {
        let (store, a, b) = store_with_two();
        let snap = store.snapshot();

        let hits = nodes_in_rect(&snap, Rect::new(-10.0, -10.0, 50.0, 60.0));
        assert_eq!(hits, vec![a]);

        let all = nodes_in_rect(&snap, Rect::new(-10.0, -10.0, 500.0, 100.0));
        assert_eq!(all, vec![a, b]);
    }
}
