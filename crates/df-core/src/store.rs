//! The Graph Store — the single source of truth for nodes and edges.
//!
//! `FlowStore` is constructed once at application start and handed to the
//! presentation layer; there is no ambient global. Every mutation runs
//! synchronously on the caller's thread, applies as one atomic snapshot
//! transition, bumps the revision, and notifies subscribers with the fresh
//! snapshot. Operations referencing an unknown id degrade to a logged no-op
//! — the UI only holds live references, so these paths are defensive.

use crate::change::{EdgeChange, NodeChange};
use crate::id::NodeId;
use crate::model::{
    Color, Connection, Edge, EdgeStroke, Marker, Node, Position, ShapeKind, Size,
};
use crate::patch::EdgeStylePatch;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The complete, immutable state of the diagram at one instant.
/// Recomputed on every mutation; views hold no other graph truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Monotonically increasing; bumped once per mutation.
    pub revision: u64,
    /// Creation order is preserved.
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Snapshot {
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: NodeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Subscriber = Box<dyn FnMut(&Snapshot)>;

/// Authoritative mutable state for nodes and edges.
pub struct FlowStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    revision: u64,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_subscriber: u64,
}

impl Default for FlowStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowStore {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            revision: 0,
            subscribers: Vec::new(),
            next_subscriber: 0,
        }
    }

    // ── Observation ──────────────────────────────────────────────────────

    /// Register a callback invoked synchronously after every mutation.
    pub fn subscribe(&mut self, callback: Subscriber) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.subscribers.push((id, callback));
        id
    }

    /// Remove a subscriber. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    /// A read-only snapshot of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Bump the revision and notify every subscriber with one fresh
    /// snapshot. Called exactly once per mutation, after all structural
    /// work is done — subscribers never see a half-applied change set.
    fn commit(&mut self) {
        self.revision += 1;
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = Snapshot {
            revision: self.revision,
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        };
        for (_, callback) in &mut self.subscribers {
            callback(&snapshot);
        }
    }

    // ── Node operations ──────────────────────────────────────────────────

    /// Place a new shape. Returns the fresh node id.
    pub fn add_node(&mut self, kind: ShapeKind, position: Position) -> NodeId {
        let id = NodeId::with_prefix(kind.as_str());
        self.nodes.push(Node::new(id, kind, position));
        self.commit();
        id
    }

    /// Apply a batch of structural node changes as one atomic transition.
    /// Removals cascade to incident edges; unknown ids are skipped.
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
        if changes.is_empty() {
            return;
        }
        let mut removed: HashSet<NodeId> = HashSet::new();
        for change in changes {
            match *change {
                NodeChange::Moved { id, position } => {
                    if let Some(node) = self.node_mut(id) {
                        node.position = position;
                    }
                }
                NodeChange::Resized { id, size } => {
                    if let Some(node) = self.node_mut(id) {
                        node.size = size;
                    }
                }
                NodeChange::Selected { id, selected } => {
                    if let Some(node) = self.node_mut(id) {
                        node.selected = selected;
                    }
                }
                NodeChange::Removed { id } => {
                    removed.insert(id);
                }
            }
        }
        if !removed.is_empty() {
            self.nodes.retain(|n| !removed.contains(&n.id));
            self.edges
                .retain(|e| !removed.contains(&e.source) && !removed.contains(&e.target));
        }
        self.commit();
    }

    /// Apply a batch of structural edge changes, same policy as nodes.
    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
        if changes.is_empty() {
            return;
        }
        let mut removed: HashSet<NodeId> = HashSet::new();
        for change in changes {
            match *change {
                EdgeChange::Selected { id, selected } => {
                    if let Some(edge) = self.edge_mut_silent(id) {
                        edge.selected = selected;
                    }
                }
                EdgeChange::Removed { id } => {
                    removed.insert(id);
                }
            }
        }
        if !removed.is_empty() {
            self.edges.retain(|e| !removed.contains(&e.id));
        }
        self.commit();
    }

    pub fn update_node_label(&mut self, id: NodeId, label: &str) {
        if let Some(node) = self.node_mut(id) {
            node.label = label.to_string();
            self.commit();
        }
    }

    pub fn update_node_color(&mut self, id: NodeId, fill: Color) {
        if let Some(node) = self.node_mut(id) {
            node.fill = fill;
            self.commit();
        }
    }

    pub fn update_node_text_color(&mut self, id: NodeId, text_color: Color) {
        if let Some(node) = self.node_mut(id) {
            node.text_color = text_color;
            self.commit();
        }
    }

    pub fn update_node_size(&mut self, id: NodeId, width: f32, height: f32) {
        if let Some(node) = self.node_mut(id) {
            node.size = Size::new(width, height);
            self.commit();
        }
    }

    /// Remove a node and every edge referencing it as source or target, in
    /// the same atomic update — observers never see a dangling edge.
    /// Deleting an already-removed id is a no-op.
    pub fn delete_node(&mut self, id: NodeId) {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            log::debug!("delete_node: unknown node {id}, ignoring");
            return;
        }
        self.edges.retain(|e| e.source != id && e.target != id);
        self.commit();
    }

    // ── Edge operations ──────────────────────────────────────────────────

    /// Create a new edge from a drag-connect gesture: fresh id, default
    /// black 2px stroke, closed end arrow. Returns the edge id.
    pub fn connect(&mut self, connection: Connection) -> NodeId {
        let id = NodeId::with_prefix("edge");
        self.edges.push(Edge {
            id,
            source: connection.source,
            target: connection.target,
            source_handle: connection.source_handle,
            target_handle: connection.target_handle,
            stroke: EdgeStroke::default(),
            start_marker: None,
            end_marker: Some(Marker::ArrowClosed),
            selected: false,
        });
        self.commit();
        id
    }

    /// Merge the given style fields into the edge's existing style.
    /// Fields left at `Keep` are preserved; `Clear` removes markers/dash.
    pub fn update_edge_style(&mut self, id: NodeId, patch: EdgeStylePatch) {
        if let Some(edge) = self.edge_mut(id) {
            patch.apply_to(edge);
            self.commit();
        }
    }

    /// Independently strip the start and/or end arrow marker.
    pub fn remove_edge_markers(&mut self, id: NodeId, remove_start: bool, remove_end: bool) {
        if let Some(edge) = self.edge_mut(id) {
            if remove_start {
                edge.start_marker = None;
            }
            if remove_end {
                edge.end_marker = None;
            }
            self.commit();
        }
    }

    pub fn update_edge_stroke_width(&mut self, id: NodeId, width: f32) {
        if let Some(edge) = self.edge_mut(id) {
            edge.stroke.width = width;
            self.commit();
        }
    }

    pub fn update_edge_color(&mut self, id: NodeId, color: Color) {
        if let Some(edge) = self.edge_mut(id) {
            edge.stroke.color = color;
            self.commit();
        }
    }

    /// Direct removal; edges have no dependents, so no cascade.
    pub fn delete_edge(&mut self, id: NodeId) {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        if self.edges.len() == before {
            log::debug!("delete_edge: unknown edge {id}, ignoring");
            return;
        }
        self.commit();
    }

    // ── Lookup helpers ───────────────────────────────────────────────────

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let found = self.nodes.iter_mut().find(|n| n.id == id);
        if found.is_none() {
            log::debug!("unknown node {id}, ignoring");
        }
        found
    }

    fn edge_mut(&mut self, id: NodeId) -> Option<&mut Edge> {
        let found = self.edges.iter_mut().find(|e| e.id == id);
        if found.is_none() {
            log::debug!("unknown edge {id}, ignoring");
        }
        found
    }

    /// Change-set path: unknown ids are expected there, skip the log.
    fn edge_mut_silent(&mut self, id: NodeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_connected_nodes(store: &mut FlowStore) -> (NodeId, NodeId, NodeId) {
        let a = store.add_node(ShapeKind::Rectangle, Position::new(0.0, 0.0));
        let b = store.add_node(ShapeKind::Ellipse, Position::new(10.0, 10.0));
        let e = store.connect(Connection {
            source: a,
            source_handle: crate::model::HandleSide::Bottom,
            target: b,
            target_handle: crate::model::HandleSide::Top,
        });
        (a, b, e)
    }

    #[test]
    fn add_node_assigns_unique_ids_in_order() {
        let mut store = FlowStore::new();
        let ids: Vec<NodeId> = (0..20)
            .map(|i| store.add_node(ShapeKind::Process, Position::new(i as f32, 0.0)))
            .collect();

        let unique: HashSet<NodeId> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());

        let stored: Vec<NodeId> = store.nodes().iter().map(|n| n.id).collect();
        assert_eq!(stored, ids);
    }

    #[test]
    fn delete_node_cascades_to_incident_edges() {
        let mut store = FlowStore::new();
        let (a, b, _) = two_connected_nodes(&mut store);
        // A second edge pointing the other way; cascade must take both.
        store.connect(Connection {
            source: b,
            source_handle: crate::model::HandleSide::Left,
            target: a,
            target_handle: crate::model::HandleSide::Right,
        });

        store.delete_node(a);

        assert_eq!(store.nodes().len(), 1);
        assert_eq!(store.nodes()[0].id, b);
        assert!(
            store
                .edges()
                .iter()
                .all(|e| e.source != a && e.target != a),
            "no edge may reference the deleted node"
        );
        assert_eq!(store.edges().len(), 0);
    }

    #[test]
    fn delete_node_twice_is_noop() {
        let mut store = FlowStore::new();
        let (a, _, _) = two_connected_nodes(&mut store);
        store.delete_node(a);
        let rev = store.revision();
        store.delete_node(a);
        assert_eq!(store.revision(), rev, "second delete must not commit");
        assert_eq!(store.nodes().len(), 1);
    }

    #[test]
    fn connect_defaults() {
        let mut store = FlowStore::new();
        let (_, _, e) = two_connected_nodes(&mut store);
        let edge = store.snapshot().edge(e).cloned().unwrap();
        assert_eq!(edge.stroke.color, Color::BLACK);
        assert_eq!(edge.stroke.width, 2.0);
        assert_eq!(edge.stroke.dash, None);
        assert_eq!(edge.start_marker, None);
        assert_eq!(edge.end_marker, Some(Marker::ArrowClosed));
    }

    #[test]
    fn self_loops_and_parallel_edges_are_permitted() {
        let mut store = FlowStore::new();
        let a = store.add_node(ShapeKind::Connector, Position::default());
        let loop_edge = store.connect(Connection {
            source: a,
            source_handle: crate::model::HandleSide::Right,
            target: a,
            target_handle: crate::model::HandleSide::Left,
        });
        let parallel = store.connect(Connection {
            source: a,
            source_handle: crate::model::HandleSide::Right,
            target: a,
            target_handle: crate::model::HandleSide::Left,
        });
        assert_ne!(loop_edge, parallel);
        assert_eq!(store.edges().len(), 2);
    }

    #[test]
    fn style_patch_merges_instead_of_replacing() {
        let mut store = FlowStore::new();
        let (_, _, e) = two_connected_nodes(&mut store);

        store.update_edge_style(
            e,
            EdgeStylePatch {
                width: crate::patch::Patch::Set(5.0),
                ..Default::default()
            },
        );
        store.update_edge_color(e, Color::from_hex("#FF0000").unwrap());

        let edge = store.snapshot().edge(e).cloned().unwrap();
        assert_eq!(edge.stroke.width, 5.0);
        assert_eq!(edge.stroke.color.to_hex(), "#FF0000");
        // Markers untouched by either call.
        assert_eq!(edge.end_marker, Some(Marker::ArrowClosed));
    }

    #[test]
    fn remove_markers_independently() {
        let mut store = FlowStore::new();
        let (_, _, e) = two_connected_nodes(&mut store);
        store.update_edge_style(
            e,
            EdgeStylePatch {
                start_marker: crate::patch::Patch::Set(Marker::ArrowClosed),
                ..Default::default()
            },
        );

        store.remove_edge_markers(e, true, false);
        let edge = store.snapshot().edge(e).cloned().unwrap();
        assert_eq!(edge.start_marker, None);
        assert_eq!(
            edge.end_marker,
            Some(Marker::ArrowClosed),
            "end marker must be unchanged"
        );
    }

    #[test]
    fn change_set_applies_atomically() {
        let mut store = FlowStore::new();
        let (a, b, _) = two_connected_nodes(&mut store);

        let mut notified = 0u32;
        // The observer sees the batch's end state only.
        let observed: std::rc::Rc<std::cell::RefCell<Vec<Snapshot>>> =
            std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = observed.clone();
        store.subscribe(Box::new(move |snap| {
            sink.borrow_mut().push(snap.clone());
        }));

        store.apply_node_changes(&[
            NodeChange::Moved {
                id: a,
                position: Position::new(100.0, 100.0),
            },
            NodeChange::Removed { id: b },
            // Unknown id in the same batch: ignored, not an error.
            NodeChange::Moved {
                id: NodeId::intern("ghost"),
                position: Position::default(),
            },
        ]);
        notified += observed.borrow().len() as u32;

        assert_eq!(notified, 1, "one batch, one notification");
        let snap = observed.borrow().last().cloned().unwrap();
        assert_eq!(snap.nodes.len(), 1);
        assert_eq!(snap.node(a).unwrap().position, Position::new(100.0, 100.0));
        // Cascade happened inside the same snapshot transition.
        assert!(snap.edges.is_empty());
    }

    #[test]
    fn subscribe_notify_unsubscribe() {
        let mut store = FlowStore::new();
        let count = std::rc::Rc::new(std::cell::Cell::new(0u32));
        let c = count.clone();
        let sub = store.subscribe(Box::new(move |_| c.set(c.get() + 1)));

        store.add_node(ShapeKind::Data, Position::default());
        assert_eq!(count.get(), 1);

        store.unsubscribe(sub);
        store.add_node(ShapeKind::Data, Position::default());
        assert_eq!(count.get(), 1, "unsubscribed observers stay silent");
    }

    #[test]
    fn node_setters_commit_once_each() {
        let mut store = FlowStore::new();
        let a = store.add_node(ShapeKind::Document, Position::default());
        let rev = store.revision();

        store.update_node_label(a, "Invoice");
        store.update_node_color(a, Color::from_hex("#FFADAD").unwrap());
        store.update_node_text_color(a, Color::from_hex("#EF4444").unwrap());
        store.update_node_size(a, 200.0, 120.0);

        assert_eq!(store.revision(), rev + 4);
        let node = store.snapshot().node(a).cloned().unwrap();
        assert_eq!(node.label, "Invoice");
        assert_eq!(node.fill.to_hex(), "#FFADAD");
        assert_eq!(node.text_color.to_hex(), "#EF4444");
        assert_eq!(node.size, Size::new(200.0, 120.0));
    }

    #[test]
    fn targeted_mutations_on_unknown_ids_are_noops() {
        let mut store = FlowStore::new();
        let ghost = NodeId::intern("ghost_node");
        let rev = store.revision();

        store.update_node_label(ghost, "boo");
        store.update_node_color(ghost, Color::WHITE);
        store.update_node_text_color(ghost, Color::BLACK);
        store.update_node_size(ghost, 80.0, 80.0);
        store.update_edge_style(ghost, EdgeStylePatch::dotted());
        store.update_edge_stroke_width(ghost, 3.0);
        store.update_edge_color(ghost, Color::BLACK);
        store.remove_edge_markers(ghost, true, true);
        store.delete_edge(ghost);

        assert_eq!(store.revision(), rev, "no-ops must not commit");
    }
}
