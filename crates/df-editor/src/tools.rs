//! Tool system for canvas interactions.
//!
//! Each tool translates pointer events into `EditorAction` values that the
//! host applies to the `FlowStore`. Tools hold gesture state only — the
//! selection itself lives in the store, on the `selected` flags.
//!
//! ## Modifier behaviors
//!
//! | Modifier  | Select Tool               |
//! |-----------|---------------------------|
//! | **Shift** | Toggle node in selection; axis-constrain drag |

use crate::input::{InputEvent, Modifiers};
use df_core::NodeId;
use df_core::change::NodeChange;
use df_core::model::{Connection, HandleSide, Position, Size};
use df_core::store::Snapshot;
use df_render::node_rect;

/// The active tool determines how input events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Select,
    Connect,
    Resize,
}

/// What the pointer is currently over, precomputed by the host from the
/// render-side hit tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct HitInfo {
    pub node: Option<NodeId>,
    pub handle: Option<(NodeId, HandleSide)>,
    pub edge: Option<NodeId>,
}

/// An action a tool wants applied to the store.
#[derive(Debug, Clone)]
pub enum EditorAction {
    NodeChanges(Vec<NodeChange>),
    EdgeChanges(Vec<df_core::change::EdgeChange>),
    Connect(Connection),
}

/// Trait for tools that handle input and produce store actions.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Handle an input event against the current snapshot.
    fn handle(&mut self, event: &InputEvent, hit: &HitInfo, snapshot: &Snapshot)
    -> Vec<EditorAction>;
}

// ─── Select Tool ─────────────────────────────────────────────────────────

/// Click/shift-click selection, node dragging, marquee selection.
pub struct SelectTool {
    /// Pointer position at drag start.
    drag_origin: Option<(f32, f32)>,
    /// Start position of every node being dragged.
    drag_starts: Vec<(NodeId, Position)>,
    /// Marquee start, set when pointer-down hits empty space.
    pub marquee_start: Option<(f32, f32)>,
    /// Current marquee rectangle (x, y, w, h), updated during drag.
    pub marquee_rect: Option<(f32, f32, f32, f32)>,
}

impl Default for SelectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectTool {
    pub fn new() -> Self {
        Self {
            drag_origin: None,
            drag_starts: Vec::new(),
            marquee_start: None,
            marquee_rect: None,
        }
    }

    fn normalize_rect(x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32, f32, f32) {
        (x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs())
    }

    fn selected_ids(snapshot: &Snapshot) -> Vec<NodeId> {
        snapshot
            .nodes
            .iter()
            .filter(|n| n.selected)
            .map(|n| n.id)
            .collect()
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn handle(
        &mut self,
        event: &InputEvent,
        hit: &HitInfo,
        snapshot: &Snapshot,
    ) -> Vec<EditorAction> {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.marquee_start = None;
                self.marquee_rect = None;

                if let Some(hit_id) = hit.node {
                    let selected = Self::selected_ids(snapshot);
                    let mut changes = Vec::new();

                    // The drag set is the selection as it stands AFTER this
                    // click, so a shift-toggle off never drags the node.
                    let mut dragging = selected.clone();
                    if modifiers.shift {
                        // Shift+click: toggle node in/out of selection.
                        let was = selected.contains(&hit_id);
                        changes.push(NodeChange::Selected {
                            id: hit_id,
                            selected: !was,
                        });
                        if was {
                            dragging.retain(|id| *id != hit_id);
                        } else {
                            dragging.push(hit_id);
                        }
                    } else if !selected.contains(&hit_id) {
                        // Click on unselected node: replace selection.
                        for id in &selected {
                            changes.push(NodeChange::Selected {
                                id: *id,
                                selected: false,
                            });
                        }
                        changes.push(NodeChange::Selected {
                            id: hit_id,
                            selected: true,
                        });
                        dragging = vec![hit_id];
                    }
                    // Clicking an already-selected node keeps the selection
                    // so the whole group drags together.

                    self.drag_origin = Some((*x, *y));
                    self.drag_starts = snapshot
                        .nodes
                        .iter()
                        .filter(|n| dragging.contains(&n.id))
                        .map(|n| (n.id, n.position))
                        .collect();

                    if changes.is_empty() {
                        vec![]
                    } else {
                        vec![EditorAction::NodeChanges(changes)]
                    }
                } else {
                    // Empty space: clear selection (unless shift) and start
                    // a marquee.
                    self.drag_origin = None;
                    self.drag_starts.clear();
                    self.marquee_start = Some((*x, *y));
                    self.marquee_rect = Some((*x, *y, 0.0, 0.0));

                    if modifiers.shift {
                        return vec![];
                    }
                    let deselect: Vec<NodeChange> = Self::selected_ids(snapshot)
                        .into_iter()
                        .map(|id| NodeChange::Selected {
                            id,
                            selected: false,
                        })
                        .collect();
                    if deselect.is_empty() {
                        vec![]
                    } else {
                        vec![EditorAction::NodeChanges(deselect)]
                    }
                }
            }

            InputEvent::PointerMove { x, y, modifiers } => {
                if let Some((sx, sy)) = self.marquee_start {
                    self.marquee_rect = Some(Self::normalize_rect(sx, sy, *x, *y));
                    return vec![];
                }

                let Some((ox, oy)) = self.drag_origin else {
                    return vec![];
                };
                let mut dx = x - ox;
                let mut dy = y - oy;

                // Shift: constrain to dominant axis.
                if modifiers.shift {
                    if dx.abs() > dy.abs() {
                        dy = 0.0;
                    } else {
                        dx = 0.0;
                    }
                }

                let moves: Vec<NodeChange> = self
                    .drag_starts
                    .iter()
                    .map(|(id, start)| NodeChange::Moved {
                        id: *id,
                        position: Position::new(start.x + dx, start.y + dy),
                    })
                    .collect();
                if moves.is_empty() {
                    vec![]
                } else {
                    vec![EditorAction::NodeChanges(moves)]
                }
            }

            InputEvent::PointerUp { .. } => {
                // Marquee completion: select everything intersecting.
                let result = if let Some((rx, ry, rw, rh)) = self.marquee_rect {
                    let rect = kurbo::Rect::new(
                        rx as f64,
                        ry as f64,
                        (rx + rw) as f64,
                        (ry + rh) as f64,
                    );
                    let hits = df_render::hit::nodes_in_rect(snapshot, rect);
                    let changes: Vec<NodeChange> = hits
                        .into_iter()
                        .map(|id| NodeChange::Selected { id, selected: true })
                        .collect();
                    if changes.is_empty() {
                        vec![]
                    } else {
                        vec![EditorAction::NodeChanges(changes)]
                    }
                } else {
                    vec![]
                };
                self.drag_origin = None;
                self.drag_starts.clear();
                self.marquee_start = None;
                self.marquee_rect = None;
                result
            }

            _ => vec![],
        }
    }
}

// ─── Connect Tool ────────────────────────────────────────────────────────

/// Drag from one handle to another to create an edge. Releasing anywhere
/// else cancels. Self-targets are allowed.
pub struct ConnectTool {
    pending: Option<(NodeId, HandleSide)>,
    /// Live endpoint of the preview line while dragging.
    pub preview: Option<(f32, f32)>,
}

impl Default for ConnectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectTool {
    pub fn new() -> Self {
        Self {
            pending: None,
            preview: None,
        }
    }

    /// The anchor of the in-progress connection, for preview rendering.
    pub fn pending_source(&self) -> Option<(NodeId, HandleSide)> {
        self.pending
    }
}

impl Tool for ConnectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Connect
    }

    fn handle(
        &mut self,
        event: &InputEvent,
        hit: &HitInfo,
        _snapshot: &Snapshot,
    ) -> Vec<EditorAction> {
        match event {
            InputEvent::PointerDown { x, y, .. } => {
                if let Some((node, side)) = hit.handle {
                    self.pending = Some((node, side));
                    self.preview = Some((*x, *y));
                }
                vec![]
            }
            InputEvent::PointerMove { x, y, .. } => {
                if self.pending.is_some() {
                    self.preview = Some((*x, *y));
                }
                vec![]
            }
            InputEvent::PointerUp { .. } => {
                let pending = self.pending.take();
                self.preview = None;
                match (pending, hit.handle) {
                    (Some((source, source_handle)), Some((target, target_handle))) => {
                        vec![EditorAction::Connect(Connection {
                            source,
                            source_handle,
                            target,
                            target_handle,
                        })]
                    }
                    (Some((source, _)), None) => {
                        log::debug!("connect from {source} released on empty space, cancelled");
                        vec![]
                    }
                    _ => vec![],
                }
            }
            _ => vec![],
        }
    }
}

// ─── Resize Tool ─────────────────────────────────────────────────────────

/// Corner-grip resizing. The 50×50 minimum is enforced here, in the UI
/// layer — the store itself only clamps sizes non-negative.
pub struct ResizeTool {
    active: Option<(NodeId, Position)>,
}

/// Minimum node dimensions while resizing.
pub const MIN_NODE_SIZE: f32 = 50.0;

/// Pixel radius around the bottom-right grip that starts a resize.
const GRIP_RADIUS: f64 = 8.0;

impl Default for ResizeTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ResizeTool {
    pub fn new() -> Self {
        Self { active: None }
    }

    pub fn is_resizing(&self) -> bool {
        self.active.is_some()
    }

    /// Whether (x, y) is on the resize grip of a selected node.
    pub fn grip_at(snapshot: &Snapshot, x: f32, y: f32) -> Option<NodeId> {
        let p = kurbo::Point::new(x as f64, y as f64);
        snapshot
            .nodes
            .iter()
            .rev()
            .filter(|n| n.selected)
            .find(|n| {
                let r = node_rect(n);
                (kurbo::Point::new(r.x1, r.y1) - p).hypot() <= GRIP_RADIUS
            })
            .map(|n| n.id)
    }
}

impl Tool for ResizeTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Resize
    }

    fn handle(
        &mut self,
        event: &InputEvent,
        _hit: &HitInfo,
        snapshot: &Snapshot,
    ) -> Vec<EditorAction> {
        match event {
            InputEvent::PointerDown { x, y, .. } => {
                if let Some(id) = Self::grip_at(snapshot, *x, *y) {
                    let origin = snapshot
                        .node(id)
                        .map(|n| n.position)
                        .unwrap_or_default();
                    self.active = Some((id, origin));
                }
                vec![]
            }
            InputEvent::PointerMove { x, y, .. } => {
                let Some((id, origin)) = self.active else {
                    return vec![];
                };
                let size = Size::new(
                    (x - origin.x).max(MIN_NODE_SIZE),
                    (y - origin.y).max(MIN_NODE_SIZE),
                );
                vec![EditorAction::NodeChanges(vec![NodeChange::Resized {
                    id,
                    size,
                }])]
            }
            InputEvent::PointerUp { .. } => {
                self.active = None;
                vec![]
            }
            _ => vec![],
        }
    }
}

/// Convenience used by host shortcut handling: change set that removes the
/// whole current selection (nodes cascade their edges in the store).
pub fn delete_selection_changes(snapshot: &Snapshot) -> (Vec<NodeChange>, Vec<df_core::change::EdgeChange>) {
    let nodes = snapshot
        .nodes
        .iter()
        .filter(|n| n.selected)
        .map(|n| NodeChange::Removed { id: n.id })
        .collect();
    let edges = snapshot
        .edges
        .iter()
        .filter(|e| e.selected)
        .map(|e| df_core::change::EdgeChange::Removed { id: e.id })
        .collect();
    (nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_core::model::ShapeKind;
    use df_core::store::FlowStore;
    use pretty_assertions::assert_eq;

    fn press(x: f32, y: f32) -> InputEvent {
        InputEvent::pointer_down(x, y, Modifiers::NONE)
    }

    fn drag(x: f32, y: f32) -> InputEvent {
        InputEvent::pointer_move(x, y, Modifiers::NONE)
    }

    fn release(x: f32, y: f32) -> InputEvent {
        InputEvent::pointer_up(x, y, Modifiers::NONE)
    }

    #[test]
    fn select_tool_click_then_drag_moves_absolute() {
        let mut store = FlowStore::new();
        let a = store.add_node(ShapeKind::Rectangle, Position::new(100.0, 100.0));
        let mut tool = SelectTool::new();

        let hit = HitInfo {
            node: Some(a),
            ..Default::default()
        };
        let actions = tool.handle(&press(110.0, 110.0), &hit, &store.snapshot());
        // Selection change for the clicked node.
        match &actions[..] {
            [EditorAction::NodeChanges(changes)] => {
                assert_eq!(
                    changes[..],
                    [NodeChange::Selected {
                        id: a,
                        selected: true
                    }]
                );
                store.apply_node_changes(changes);
            }
            other => panic!("expected selection changes, got {other:?}"),
        }

        let actions = tool.handle(&drag(120.0, 115.0), &HitInfo::default(), &store.snapshot());
        match &actions[..] {
            [EditorAction::NodeChanges(changes)] => {
                assert_eq!(
                    changes[..],
                    [NodeChange::Moved {
                        id: a,
                        position: Position::new(110.0, 105.0)
                    }]
                );
            }
            other => panic!("expected move changes, got {other:?}"),
        }
    }

    #[test]
    fn shift_drag_constrains_to_dominant_axis() {
        let mut store = FlowStore::new();
        let a = store.add_node(ShapeKind::Process, Position::new(0.0, 0.0));
        let mut tool = SelectTool::new();
        let hit = HitInfo {
            node: Some(a),
            ..Default::default()
        };

        for action in tool.handle(&press(10.0, 10.0), &hit, &store.snapshot()) {
            if let EditorAction::NodeChanges(c) = action {
                store.apply_node_changes(&c);
            }
        }

        let shift = Modifiers {
            shift: true,
            ..Modifiers::NONE
        };
        let actions = tool.handle(
            &InputEvent::pointer_move(40.0, 20.0, shift),
            &HitInfo::default(),
            &store.snapshot(),
        );
        match &actions[..] {
            [EditorAction::NodeChanges(changes)] => match changes[0] {
                NodeChange::Moved { position, .. } => {
                    assert_eq!(position, Position::new(30.0, 0.0));
                }
                other => panic!("expected Moved, got {other:?}"),
            },
            other => panic!("expected move changes, got {other:?}"),
        }
    }

    #[test]
    fn shift_toggle_off_excludes_node_from_drag() {
        let mut store = FlowStore::new();
        let a = store.add_node(ShapeKind::Rectangle, Position::new(0.0, 0.0));
        let b = store.add_node(ShapeKind::Rectangle, Position::new(300.0, 0.0));
        store.apply_node_changes(&[
            NodeChange::Selected {
                id: a,
                selected: true,
            },
            NodeChange::Selected {
                id: b,
                selected: true,
            },
        ]);
        let mut tool = SelectTool::new();

        // Shift+click on b drops it from the selection.
        let shift = Modifiers {
            shift: true,
            ..Modifiers::NONE
        };
        let hit = HitInfo {
            node: Some(b),
            ..Default::default()
        };
        for action in tool.handle(
            &InputEvent::pointer_down(310.0, 10.0, shift),
            &hit,
            &store.snapshot(),
        ) {
            if let EditorAction::NodeChanges(c) = action {
                store.apply_node_changes(&c);
            }
        }

        // The subsequent drag moves only the still-selected node.
        let actions = tool.handle(&drag(330.0, 10.0), &HitInfo::default(), &store.snapshot());
        match &actions[..] {
            [EditorAction::NodeChanges(changes)] => {
                assert_eq!(
                    changes[..],
                    [NodeChange::Moved {
                        id: a,
                        position: Position::new(20.0, 0.0)
                    }]
                );
            }
            other => panic!("expected move changes, got {other:?}"),
        }
    }

    #[test]
    fn marquee_selects_intersecting_nodes_on_release() {
        let mut store = FlowStore::new();
        let a = store.add_node(ShapeKind::Rectangle, Position::new(0.0, 0.0));
        let _far = store.add_node(ShapeKind::Rectangle, Position::new(500.0, 500.0));
        let mut tool = SelectTool::new();

        tool.handle(&press(-20.0, -20.0), &HitInfo::default(), &store.snapshot());
        tool.handle(&drag(200.0, 200.0), &HitInfo::default(), &store.snapshot());
        assert!(tool.marquee_rect.is_some());

        let actions = tool.handle(&release(200.0, 200.0), &HitInfo::default(), &store.snapshot());
        match &actions[..] {
            [EditorAction::NodeChanges(changes)] => {
                assert_eq!(
                    changes[..],
                    [NodeChange::Selected {
                        id: a,
                        selected: true
                    }]
                );
            }
            other => panic!("expected marquee selection, got {other:?}"),
        }
        assert_eq!(tool.marquee_rect, None);
    }

    #[test]
    fn connect_tool_produces_connection_between_handles() {
        let mut store = FlowStore::new();
        let a = store.add_node(ShapeKind::StartEnd, Position::new(0.0, 0.0));
        let b = store.add_node(ShapeKind::Process, Position::new(0.0, 200.0));
        let mut tool = ConnectTool::new();

        let on_source = HitInfo {
            handle: Some((a, HandleSide::Bottom)),
            ..Default::default()
        };
        tool.handle(&press(75.0, 50.0), &on_source, &store.snapshot());
        assert_eq!(tool.pending_source(), Some((a, HandleSide::Bottom)));

        tool.handle(&drag(75.0, 150.0), &HitInfo::default(), &store.snapshot());
        assert_eq!(tool.preview, Some((75.0, 150.0)));

        let on_target = HitInfo {
            handle: Some((b, HandleSide::Top)),
            ..Default::default()
        };
        let actions = tool.handle(&release(75.0, 200.0), &on_target, &store.snapshot());
        match &actions[..] {
            [EditorAction::Connect(c)] => {
                assert_eq!(c.source, a);
                assert_eq!(c.source_handle, HandleSide::Bottom);
                assert_eq!(c.target, b);
                assert_eq!(c.target_handle, HandleSide::Top);
            }
            other => panic!("expected Connect, got {other:?}"),
        }
    }

    #[test]
    fn connect_released_on_empty_space_cancels() {
        let mut store = FlowStore::new();
        let a = store.add_node(ShapeKind::Data, Position::new(0.0, 0.0));
        let mut tool = ConnectTool::new();

        let on_source = HitInfo {
            handle: Some((a, HandleSide::Right)),
            ..Default::default()
        };
        tool.handle(&press(150.0, 25.0), &on_source, &store.snapshot());
        let actions = tool.handle(&release(400.0, 400.0), &HitInfo::default(), &store.snapshot());
        assert!(actions.is_empty());
        assert_eq!(tool.pending_source(), None);
    }

    #[test]
    fn resize_enforces_minimum_size() {
        let mut store = FlowStore::new();
        let a = store.add_node(ShapeKind::Rectangle, Position::new(100.0, 100.0));
        store.apply_node_changes(&[NodeChange::Selected {
            id: a,
            selected: true,
        }]);
        let mut tool = ResizeTool::new();

        // Default 150×50 node at (100,100): grip at (250, 150).
        tool.handle(&press(250.0, 150.0), &HitInfo::default(), &store.snapshot());
        assert!(tool.is_resizing());

        // Drag far above/left of the minimum.
        let actions = tool.handle(&drag(110.0, 105.0), &HitInfo::default(), &store.snapshot());
        match &actions[..] {
            [EditorAction::NodeChanges(changes)] => match changes[0] {
                NodeChange::Resized { size, .. } => {
                    assert_eq!(size.width, MIN_NODE_SIZE);
                    assert_eq!(size.height, MIN_NODE_SIZE);
                }
                other => panic!("expected Resized, got {other:?}"),
            },
            other => panic!("expected resize changes, got {other:?}"),
        }
    }

    #[test]
    fn delete_selection_builds_removals_for_nodes_and_edges() {
        let mut store = FlowStore::new();
        let a = store.add_node(ShapeKind::Rectangle, Position::new(0.0, 0.0));
        let b = store.add_node(ShapeKind::Rectangle, Position::new(300.0, 0.0));
        let e = store.connect(Connection {
            source: a,
            source_handle: HandleSide::Right,
            target: b,
            target_handle: HandleSide::Left,
        });
        store.apply_node_changes(&[NodeChange::Selected {
            id: a,
            selected: true,
        }]);
        store.apply_edge_changes(&[df_core::change::EdgeChange::Selected {
            id: e,
            selected: true,
        }]);

        let (node_changes, edge_changes) = delete_selection_changes(&store.snapshot());
        assert_eq!(node_changes, vec![NodeChange::Removed { id: a }]);
        assert_eq!(
            edge_changes,
            vec![df_core::change::EdgeChange::Removed { id: e }]
        );

        store.apply_node_changes(&node_changes);
        store.apply_edge_changes(&edge_changes);
        assert_eq!(store.nodes().len(), 1);
        assert_eq!(store.edges().len(), 0);
    }
}
