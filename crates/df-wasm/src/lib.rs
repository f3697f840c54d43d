//! WASM bridge for DiagramFlow — exposes the flowchart engine to JavaScript.
//!
//! Compiled via `wasm-pack build --target web` and loaded by the browser
//! host page. All interaction goes through `FlowCanvas`.

pub mod render2d;
pub mod svg;

use df_core::model::{Color, Position, ShapeKind};
use df_core::store::FlowStore;
use df_core::NodeId;
use df_editor::commands::{
    apply_edge_action, apply_node_action, EdgeMenuAction, NodeMenuAction,
};
use df_editor::shortcuts::{self, ShortcutAction};
use df_editor::tools::{delete_selection_changes, HitInfo};
use df_editor::{ConnectTool, EditorAction, InputEvent, Modifiers, ResizeTool, SelectTool, Tool, ToolKind};
use df_render::{hit, CanvasTheme, GridMode};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::CanvasRenderingContext2d;

/// Edge hit tolerance in canvas pixels.
const EDGE_TOLERANCE: f64 = 6.0;

/// The main WASM-facing canvas controller.
///
/// Holds the store and the gesture tools. Pointer-down picks the tool for
/// the gesture: a resize grip routes to resize, a connection handle to
/// connect, everything else to select.
#[wasm_bindgen]
pub struct FlowCanvas {
    store: FlowStore,
    select_tool: SelectTool,
    connect_tool: ConnectTool,
    resize_tool: ResizeTool,
    gesture: ToolKind,
    grid: GridMode,
    dark_mode: bool,
    width: f64,
    height: f64,
}

#[wasm_bindgen]
impl FlowCanvas {
    /// Create a new canvas controller with the given dimensions.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        console_logger_setup();
        Self {
            store: FlowStore::new(),
            select_tool: SelectTool::new(),
            connect_tool: ConnectTool::new(),
            resize_tool: ResizeTool::new(),
            gesture: ToolKind::Select,
            grid: GridMode::Lines,
            dark_mode: false,
            width,
            height,
        }
    }

    /// Render the scene to a Canvas2D context.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let snapshot = self.store.snapshot();
        let theme = CanvasTheme::pick(self.dark_mode);

        let connect = self.connect_tool.pending_source().and_then(|source| {
            let from = render2d::handle_anchor(&snapshot, source.0, source.1)?;
            let to = self.connect_tool.preview?;
            Some((from, (to.0 as f64, to.1 as f64)))
        });
        let overlay = render2d::Overlay {
            marquee: self.select_tool.marquee_rect,
            connect,
        };

        render2d::render_scene(
            ctx,
            &snapshot,
            self.width,
            self.height,
            self.grid,
            &theme,
            &overlay,
        );
    }

    /// Resize the canvas.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Set the canvas theme.
    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
    }

    pub fn is_dark(&self) -> bool {
        self.dark_mode
    }

    /// Advance the grid mode and return its name.
    pub fn cycle_grid(&mut self) -> String {
        self.grid = self.grid.cycle();
        self.grid.as_str().to_string()
    }

    pub fn grid_name(&self) -> String {
        self.grid.as_str().to_string()
    }

    /// Current store revision. Bumped once per committed mutation.
    pub fn revision(&self) -> f64 {
        self.store.revision() as f64
    }

    // ─── Pointer API ─────────────────────────────────────────────────────

    /// Handle pointer down. Returns true if a re-render is needed.
    pub fn handle_pointer_down(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let snapshot = self.store.snapshot();
        let hit = self.hit_info(x, y);

        self.gesture = if ResizeTool::grip_at(&snapshot, x, y).is_some() {
            ToolKind::Resize
        } else if hit.handle.is_some() {
            ToolKind::Connect
        } else {
            ToolKind::Select
        };

        let event = InputEvent::pointer_down(x, y, modifiers(shift, ctrl, alt, meta));
        let changed = self.dispatch(&event, &hit);
        changed || self.select_tool.marquee_start.is_some() || self.gesture != ToolKind::Select
    }

    /// Handle pointer move. Returns true if a re-render is needed.
    pub fn handle_pointer_move(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let hit = self.hit_info(x, y);
        let event = InputEvent::pointer_move(x, y, modifiers(shift, ctrl, alt, meta));
        let changed = self.dispatch(&event, &hit);
        changed
            || self.select_tool.marquee_rect.is_some()
            || self.connect_tool.pending_source().is_some()
    }

    /// Handle pointer up. Returns true if a re-render is needed.
    pub fn handle_pointer_up(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let had_overlay = self.select_tool.marquee_rect.is_some()
            || self.connect_tool.pending_source().is_some();
        let hit = self.hit_info(x, y);
        let event = InputEvent::pointer_up(x, y, modifiers(shift, ctrl, alt, meta));
        let changed = self.dispatch(&event, &hit);
        self.gesture = ToolKind::Select;
        changed || had_overlay
    }

    // ─── Keyboard API ────────────────────────────────────────────────────

    /// Handle a key event. Returns a JSON string:
    /// `{"changed":bool,"action":"<name>"}`.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let Some(action) = shortcuts::resolve(key, ctrl, shift, alt, meta) else {
            return r#"{"changed":false,"action":"none"}"#.to_string();
        };

        let changed = match action {
            ShortcutAction::DeleteSelection => self.delete_selection(),
            ShortcutAction::Deselect => self.deselect_all(),
            ShortcutAction::CycleGrid => {
                self.cycle_grid();
                true
            }
            ShortcutAction::ToggleTheme => {
                self.dark_mode = !self.dark_mode;
                true
            }
            // Export actions are dispatched by the host, which owns the
            // canvas element needed for PNG capture.
            ShortcutAction::ExportPng | ShortcutAction::ExportSvg => false,
        };

        let name = action_name(action);
        let c = if changed { "true" } else { "false" };
        format!(r#"{{"changed":{c},"action":"{name}"}}"#)
    }

    /// Delete all selected nodes and edges. Incident edges cascade.
    pub fn delete_selection(&mut self) -> bool {
        let (node_changes, edge_changes) = delete_selection_changes(&self.store.snapshot());
        if node_changes.is_empty() && edge_changes.is_empty() {
            return false;
        }
        self.store.apply_node_changes(&node_changes);
        self.store.apply_edge_changes(&edge_changes);
        true
    }

    /// Clear the selection without removing anything.
    pub fn deselect_all(&mut self) -> bool {
        let snapshot = self.store.snapshot();
        let nodes: Vec<_> = snapshot
            .nodes
            .iter()
            .filter(|n| n.selected)
            .map(|n| df_core::NodeChange::Selected {
                id: n.id,
                selected: false,
            })
            .collect();
        let edges: Vec<_> = snapshot
            .edges
            .iter()
            .filter(|e| e.selected)
            .map(|e| df_core::EdgeChange::Selected {
                id: e.id,
                selected: false,
            })
            .collect();
        if nodes.is_empty() && edges.is_empty() {
            return false;
        }
        self.store.apply_node_changes(&nodes);
        self.store.apply_edge_changes(&edges);
        true
    }

    // ─── Palette API ─────────────────────────────────────────────────────

    /// Place a new shape (drag-and-drop from the palette). Returns the new
    /// node's id, or an empty string for an unknown kind name.
    pub fn add_shape(&mut self, kind: &str, x: f32, y: f32) -> String {
        let Some(kind) = ShapeKind::from_str(kind) else {
            log::warn!("unknown shape kind {kind:?}");
            return String::new();
        };
        let id = self.store.add_node(kind, Position::new(x, y));
        id.as_str().to_string()
    }

    /// Rename a node (inline label editing).
    pub fn set_node_label(&mut self, id: &str, label: &str) {
        self.store.update_node_label(NodeId::intern(id), label);
    }

    // ─── Context menu API ────────────────────────────────────────────────

    /// What the pointer is over, for the host to pick a context menu:
    /// `{"kind":"node"|"edge"|"canvas","id":"..."}`.
    pub fn context_target(&self, x: f32, y: f32) -> String {
        let snapshot = self.store.snapshot();
        if let Some(id) = hit::hit_test_node(&snapshot, x as f64, y as f64) {
            return format!(r#"{{"kind":"node","id":"{}"}}"#, id.as_str());
        }
        if let Some(id) = hit::hit_test_edge(&snapshot, x as f64, y as f64, EDGE_TOLERANCE) {
            return format!(r#"{{"kind":"edge","id":"{}"}}"#, id.as_str());
        }
        r#"{"kind":"canvas","id":""}"#.to_string()
    }

    pub fn node_set_fill(&mut self, id: &str, hex: &str) {
        let Some(color) = Color::from_hex(hex) else {
            log::warn!("invalid fill color {hex:?}");
            return;
        };
        apply_node_action(&mut self.store, NodeId::intern(id), NodeMenuAction::Fill(color));
    }

    pub fn node_set_text_color(&mut self, id: &str, hex: &str) {
        let Some(color) = Color::from_hex(hex) else {
            log::warn!("invalid text color {hex:?}");
            return;
        };
        apply_node_action(
            &mut self.store,
            NodeId::intern(id),
            NodeMenuAction::TextColor(color),
        );
    }

    pub fn node_delete(&mut self, id: &str) {
        apply_node_action(&mut self.store, NodeId::intern(id), NodeMenuAction::Delete);
    }

    pub fn edge_arrow_right(&mut self, id: &str) {
        apply_edge_action(&mut self.store, NodeId::intern(id), EdgeMenuAction::ArrowRight);
    }

    pub fn edge_arrow_left(&mut self, id: &str) {
        apply_edge_action(&mut self.store, NodeId::intern(id), EdgeMenuAction::ArrowLeft);
    }

    pub fn edge_arrow_none(&mut self, id: &str) {
        apply_edge_action(&mut self.store, NodeId::intern(id), EdgeMenuAction::ArrowNone);
    }

    pub fn edge_dotted(&mut self, id: &str) {
        apply_edge_action(&mut self.store, NodeId::intern(id), EdgeMenuAction::DottedLine);
    }

    pub fn edge_solid(&mut self, id: &str) {
        apply_edge_action(&mut self.store, NodeId::intern(id), EdgeMenuAction::SolidLine);
    }

    pub fn edge_stroke_width(&mut self, id: &str, width: f32) {
        apply_edge_action(
            &mut self.store,
            NodeId::intern(id),
            EdgeMenuAction::StrokeWidth(width),
        );
    }

    pub fn edge_color(&mut self, id: &str, hex: &str) {
        let Some(color) = Color::from_hex(hex) else {
            log::warn!("invalid edge color {hex:?}");
            return;
        };
        apply_edge_action(
            &mut self.store,
            NodeId::intern(id),
            EdgeMenuAction::StrokeColor(color),
        );
    }

    pub fn edge_delete(&mut self, id: &str) {
        apply_edge_action(&mut self.store, NodeId::intern(id), EdgeMenuAction::Delete);
    }

    // ─── Export / inspection API ─────────────────────────────────────────

    /// The whole snapshot as JSON, for the host's debug panel.
    pub fn nodes_json(&self) -> String {
        serde_json::to_string(&self.store.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Render the current diagram to an SVG document string.
    pub fn export_svg(&self) -> String {
        svg::render_svg(&self.store.snapshot())
    }

    /// Download the diagram as `flowchart.svg`. Failures are logged, not
    /// surfaced — export must never take the editor down.
    pub fn download_svg(&self) -> bool {
        let svg = self.export_svg();
        match svg_data_url(&svg) {
            Ok(url) => trigger_download(&url, "flowchart.svg"),
            Err(err) => {
                log::error!("svg export failed: {err}");
                false
            }
        }
    }

    /// Download the current canvas pixels as `flowchart.png`.
    pub fn download_png(&self, canvas: &web_sys::HtmlCanvasElement) -> bool {
        match canvas.to_data_url_with_type("image/png") {
            Ok(url) => trigger_download(&url, "flowchart.png"),
            Err(_) => {
                log::error!("png export failed: canvas capture rejected");
                false
            }
        }
    }
}

// ─── Private helpers ─────────────────────────────────────────────────────

impl FlowCanvas {
    fn hit_info(&self, x: f32, y: f32) -> HitInfo {
        let snapshot = self.store.snapshot();
        let (px, py) = (x as f64, y as f64);
        HitInfo {
            node: hit::hit_test_node(&snapshot, px, py),
            handle: hit::hit_test_handle(&snapshot, px, py),
            edge: hit::hit_test_edge(&snapshot, px, py, EDGE_TOLERANCE),
        }
    }

    /// Route an event to the gesture's tool and apply its actions.
    /// Returns true if the store changed.
    fn dispatch(&mut self, event: &InputEvent, hit: &HitInfo) -> bool {
        let snapshot = self.store.snapshot();
        let actions = match self.gesture {
            ToolKind::Select => self.select_tool.handle(event, hit, &snapshot),
            ToolKind::Connect => self.connect_tool.handle(event, hit, &snapshot),
            ToolKind::Resize => self.resize_tool.handle(event, hit, &snapshot),
        };

        let before = self.store.revision();
        for action in actions {
            match action {
                EditorAction::NodeChanges(changes) => self.store.apply_node_changes(&changes),
                EditorAction::EdgeChanges(changes) => self.store.apply_edge_changes(&changes),
                EditorAction::Connect(connection) => {
                    self.store.connect(connection);
                }
            }
        }
        self.store.revision() != before
    }
}

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

fn action_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::DeleteSelection => "deleteSelection",
        ShortcutAction::Deselect => "deselect",
        ShortcutAction::CycleGrid => "cycleGrid",
        ShortcutAction::ToggleTheme => "toggleTheme",
        ShortcutAction::ExportPng => "exportPng",
        ShortcutAction::ExportSvg => "exportSvg",
    }
}

/// Base64 data URL for an SVG document.
fn svg_data_url(svg: &str) -> Result<String, String> {
    let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
    let encoded = window
        .btoa(svg)
        .map_err(|_| "btoa rejected the document".to_string())?;
    Ok(format!("data:image/svg+xml;base64,{encoded}"))
}

/// Click a temporary anchor element to start a file download.
fn trigger_download(url: &str, filename: &str) -> bool {
    let inner = || -> Result<(), String> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| "no document".to_string())?;
        let anchor = document
            .create_element("a")
            .map_err(|_| "createElement failed".to_string())?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| "anchor cast failed".to_string())?;
        anchor.set_href(url);
        anchor.set_download(filename);
        anchor.click();
        Ok(())
    };
    match inner() {
        Ok(()) => true,
        Err(err) => {
            log::error!("download of {filename} failed: {err}");
            false
        }
    }
}

// ─── Console diagnostics for WASM builds ─────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("DiagramFlow WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// `log` records from every crate in the workspace land on the browser
// console; without a registered logger they would be dropped.
fn console_logger_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        struct ConsoleLogger;

        impl log::Log for ConsoleLogger {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                metadata.level() <= log::Level::Debug
            }

            fn log(&self, record: &log::Record) {
                if !self.enabled(record.metadata()) {
                    return;
                }
                let msg = format!("[{}] {}", record.target(), record.args());
                let msg = JsValue::from(msg);
                match record.level() {
                    log::Level::Error => web_sys::console::error_1(&msg),
                    log::Level::Warn => web_sys::console::warn_1(&msg),
                    _ => web_sys::console::log_1(&msg),
                }
            }

            fn flush(&self) {}
        }

        static LOGGER: ConsoleLogger = ConsoleLogger;
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Debug);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pointer_gestures_drive_the_store() {
        let mut canvas = FlowCanvas::new(800.0, 600.0);
        let id = canvas.add_shape("rectangle", 100.0, 100.0);
        assert!(!id.is_empty());

        // Click inside the node (avoid the 8px handle radius around the
        // side midpoints) and drag it.
        canvas.handle_pointer_down(130.0, 115.0, false, false, false, false);
        canvas.handle_pointer_move(180.0, 135.0, false, false, false, false);
        canvas.handle_pointer_up(180.0, 135.0, false, false, false, false);

        let snapshot: df_core::store::Snapshot =
            serde_json::from_str(&canvas.nodes_json()).unwrap();
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(snapshot.nodes[0].position, Position::new(150.0, 120.0));
        assert!(snapshot.nodes[0].selected);
    }

    #[test]
    fn handle_drag_connects_two_nodes() {
        let mut canvas = FlowCanvas::new(800.0, 600.0);
        canvas.add_shape("start", 100.0, 0.0);
        canvas.add_shape("process", 100.0, 200.0);

        // Bottom handle of the first node sits at (175, 50); top handle of
        // the second at (175, 200).
        canvas.handle_pointer_down(175.0, 50.0, false, false, false, false);
        canvas.handle_pointer_move(175.0, 150.0, false, false, false, false);
        canvas.handle_pointer_up(175.0, 200.0, false, false, false, false);

        let snapshot: df_core::store::Snapshot =
            serde_json::from_str(&canvas.nodes_json()).unwrap();
        assert_eq!(snapshot.edges.len(), 1);
        assert_eq!(
            snapshot.edges[0].end_marker,
            Some(df_core::model::Marker::ArrowClosed)
        );
    }

    #[test]
    fn unknown_shape_kind_is_rejected() {
        let mut canvas = FlowCanvas::new(800.0, 600.0);
        assert_eq!(canvas.add_shape("blob", 0.0, 0.0), "");
        assert_eq!(canvas.revision(), 0.0);
    }

    #[test]
    fn delete_key_removes_selection_and_cascades() {
        let mut canvas = FlowCanvas::new(800.0, 600.0);
        canvas.add_shape("decision", 0.0, 0.0);
        let b = canvas.add_shape("process", 0.0, 200.0);

        // Connect a → b, then select and delete a.
        canvas.handle_pointer_down(75.0, 50.0, false, false, false, false);
        canvas.handle_pointer_up(75.0, 200.0, false, false, false, false);

        canvas.handle_pointer_down(75.0, 25.0, false, false, false, false);
        canvas.handle_pointer_up(75.0, 25.0, false, false, false, false);

        let out = canvas.handle_key("Delete", false, false, false, false);
        assert!(out.contains(r#""changed":true"#));
        assert!(out.contains("deleteSelection"));

        let snapshot: df_core::store::Snapshot =
            serde_json::from_str(&canvas.nodes_json()).unwrap();
        assert_eq!(snapshot.nodes.len(), 1);
        assert!(snapshot.edges.is_empty());
        assert_eq!(snapshot.nodes[0].id.as_str(), b);
    }

    #[test]
    fn context_target_distinguishes_node_edge_canvas() {
        let mut canvas = FlowCanvas::new(800.0, 600.0);
        canvas.add_shape("rectangle", 0.0, 0.0);
        assert!(canvas.context_target(75.0, 25.0).contains(r#""kind":"node""#));
        assert!(canvas.context_target(500.0, 500.0).contains(r#""kind":"canvas""#));
    }

    #[test]
    fn grid_and_theme_toggles() {
        let mut canvas = FlowCanvas::new(800.0, 600.0);
        assert_eq!(canvas.cycle_grid(), "dots");
        assert_eq!(canvas.cycle_grid(), "none");
        assert_eq!(canvas.cycle_grid(), "lines");

        let out = canvas.handle_key("d", false, false, false, false);
        assert!(out.contains("toggleTheme"));
        assert!(canvas.is_dark());
    }

    #[test]
    fn export_svg_contains_every_node() {
        let mut canvas = FlowCanvas::new(800.0, 600.0);
        let id = canvas.add_shape("document", 50.0, 50.0);
        canvas.set_node_label(&id, "report");
        let svg = canvas.export_svg();
        assert!(svg.contains("report"));
        assert!(svg.starts_with("<svg "));
    }
}
