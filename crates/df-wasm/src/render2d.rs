//! Canvas2D software renderer.
//!
//! Draws a store snapshot to an HTML `<canvas>` via
//! `CanvasRenderingContext2d`. Geometry comes from `df-render`; this module
//! only translates kurbo paths into context calls and adds the browser-only
//! decorations (labels, marquee, connect preview, minimap).

use df_core::model::{Color, Node, ShapeKind};
use df_core::store::Snapshot;
use df_render::shape::{arrow_head, edge_path, handle_position, node_rect, shape_path};
use df_render::{CanvasTheme, GridMode};
use kurbo::{BezPath, ParamCurve, ParamCurveDeriv, PathEl, PathSeg, Point, Rect, Vec2};
use web_sys::CanvasRenderingContext2d;

const GRID_GAP: f64 = 16.0;
const ARROW_SIZE: f64 = 10.0;
const HANDLE_RADIUS: f64 = 4.0;
const MINIMAP_SIZE: f64 = 150.0;
const MINIMAP_MARGIN: f64 = 12.0;

/// Overlay state that lives outside the store: in-progress gestures.
#[derive(Default)]
pub struct Overlay {
    pub marquee: Option<(f32, f32, f32, f32)>,
    /// Connect preview: (from handle anchor, current pointer).
    pub connect: Option<((f64, f64), (f64, f64))>,
}

/// Render the whole scene to a Canvas2D context.
pub fn render_scene(
    ctx: &CanvasRenderingContext2d,
    snapshot: &Snapshot,
    width: f64,
    height: f64,
    grid: GridMode,
    theme: &CanvasTheme,
    overlay: &Overlay,
) {
    ctx.set_fill_style_str(&css(theme.bg));
    ctx.fill_rect(0.0, 0.0, width, height);

    draw_grid(ctx, width, height, grid, theme);

    for edge in &snapshot.edges {
        draw_edge(ctx, snapshot, edge, theme);
    }
    for node in snapshot.nodes.iter() {
        draw_node(ctx, node, theme);
    }

    if let Some((from, to)) = overlay.connect {
        draw_connect_preview(ctx, from, to, theme);
    }
    if let Some((x, y, w, h)) = overlay.marquee {
        draw_marquee(ctx, x as f64, y as f64, w as f64, h as f64, theme);
    }

    draw_minimap(ctx, snapshot, width, height, theme);
}

fn draw_grid(
    ctx: &CanvasRenderingContext2d,
    width: f64,
    height: f64,
    grid: GridMode,
    theme: &CanvasTheme,
) {
    match grid {
        GridMode::None => {}
        GridMode::Lines => {
            ctx.set_stroke_style_str(&css(theme.grid));
            ctx.set_line_width(1.0);
            ctx.begin_path();
            let mut x = 0.0;
            while x <= width {
                ctx.move_to(x, 0.0);
                ctx.line_to(x, height);
                x += GRID_GAP;
            }
            let mut y = 0.0;
            while y <= height {
                ctx.move_to(0.0, y);
                ctx.line_to(width, y);
                y += GRID_GAP;
            }
            ctx.stroke();
        }
        GridMode::Dots => {
            ctx.set_fill_style_str(&css(theme.grid));
            let mut x = 0.0;
            while x <= width {
                let mut y = 0.0;
                while y <= height {
                    ctx.fill_rect(x - 1.0, y - 1.0, 2.0, 2.0);
                    y += GRID_GAP;
                }
                x += GRID_GAP;
            }
        }
    }
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &Node, theme: &CanvasTheme) {
    let r = node_rect(node);

    if node.kind != ShapeKind::Text {
        let path = shape_path(node.kind, r);
        trace_path(ctx, &path);
        ctx.set_fill_style_str(&css(node.fill));
        ctx.fill();
        ctx.set_stroke_style_str("#999999");
        ctx.set_line_width(1.0);
        ctx.stroke();
    }

    if !node.label.is_empty() {
        ctx.save();
        ctx.set_font("13px system-ui, sans-serif");
        ctx.set_fill_style_str(&css(node.text_color));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let cx = r.x0 + r.width() / 2.0;
        let cy = r.y0 + r.height() / 2.0;
        let _ = ctx.fill_text(&node.label, cx, cy);
        ctx.restore();
    }

    if node.selected {
        draw_selection(ctx, node, r, theme);
    }

    // Connection handle dots on the side midpoints.
    ctx.set_fill_style_str(&css(theme.handle));
    for side in df_core::model::HandleSide::ALL {
        let p = handle_position(r, side);
        ctx.begin_path();
        let _ = ctx.arc(p.x, p.y, HANDLE_RADIUS, 0.0, std::f64::consts::TAU);
        ctx.fill();
    }
}

fn draw_selection(ctx: &CanvasRenderingContext2d, node: &Node, r: Rect, theme: &CanvasTheme) {
    let outline = shape_path(node.kind, r.inflate(3.0, 3.0));
    trace_path(ctx, &outline);
    ctx.set_stroke_style_str(&css(theme.selection));
    ctx.set_line_width(1.5);
    ctx.stroke();

    // Corner grips (bottom-right doubles as the resize grip).
    let grip = 6.0;
    ctx.set_fill_style_str("#FFFFFF");
    ctx.set_stroke_style_str(&css(theme.selection));
    for (gx, gy) in [(r.x0, r.y0), (r.x1, r.y0), (r.x0, r.y1), (r.x1, r.y1)] {
        ctx.fill_rect(gx - grip / 2.0, gy - grip / 2.0, grip, grip);
        ctx.stroke_rect(gx - grip / 2.0, gy - grip / 2.0, grip, grip);
    }
}

fn draw_edge(
    ctx: &CanvasRenderingContext2d,
    snapshot: &Snapshot,
    edge: &df_core::model::Edge,
    theme: &CanvasTheme,
) {
    let (Some(src), Some(dst)) = (snapshot.node(edge.source), snapshot.node(edge.target)) else {
        return;
    };
    let p0 = handle_position(node_rect(src), edge.source_handle);
    let p1 = handle_position(node_rect(dst), edge.target_handle);
    let path = edge_path(p0, edge.source_handle, p1, edge.target_handle);
    let color = css(edge.stroke.color);

    ctx.save();
    if let Some(dash) = &edge.stroke.dash {
        let pattern = js_sys::Array::new();
        for d in dash {
            pattern.push(&wasm_bindgen::JsValue::from_f64(*d as f64));
        }
        let _ = ctx.set_line_dash(&pattern);
    }
    trace_path(ctx, &path);
    ctx.set_stroke_style_str(&color);
    ctx.set_line_width(edge.stroke.width as f64);
    ctx.stroke();
    ctx.restore();

    // Arrowheads, solid regardless of the dash pattern.
    let segs: Vec<PathSeg> = path.segments().collect();
    if let (Some(first), Some(last)) = (segs.first(), segs.last()) {
        if edge.start_marker.is_some() {
            fill_path(ctx, &arrow_head(first.eval(0.0), -seg_tangent(first, 0.0), ARROW_SIZE), &color);
        }
        if edge.end_marker.is_some() {
            fill_path(ctx, &arrow_head(last.eval(1.0), seg_tangent(last, 1.0), ARROW_SIZE), &color);
        }
    }

    if edge.selected {
        ctx.save();
        let pattern = js_sys::Array::of2(
            &wasm_bindgen::JsValue::from_f64(4.0),
            &wasm_bindgen::JsValue::from_f64(4.0),
        );
        let _ = ctx.set_line_dash(&pattern);
        trace_path(ctx, &path);
        ctx.set_stroke_style_str(&css(theme.selection));
        ctx.set_line_width(edge.stroke.width as f64 + 3.0);
        ctx.stroke();
        ctx.restore();
    }
}

fn draw_connect_preview(
    ctx: &CanvasRenderingContext2d,
    from: (f64, f64),
    to: (f64, f64),
    theme: &CanvasTheme,
) {
    ctx.save();
    let pattern = js_sys::Array::of2(
        &wasm_bindgen::JsValue::from_f64(6.0),
        &wasm_bindgen::JsValue::from_f64(4.0),
    );
    let _ = ctx.set_line_dash(&pattern);
    ctx.set_stroke_style_str(&css(theme.selection));
    ctx.set_line_width(1.5);
    ctx.begin_path();
    ctx.move_to(from.0, from.1);
    ctx.line_to(to.0, to.1);
    ctx.stroke();
    ctx.restore();
}

fn draw_marquee(
    ctx: &CanvasRenderingContext2d,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    theme: &CanvasTheme,
) {
    if w < 1.0 && h < 1.0 {
        return;
    }
    ctx.save();
    let mut fill = theme.selection;
    fill.a = 0.08;
    ctx.set_fill_style_str(&css(fill));
    ctx.fill_rect(x, y, w, h);
    let pattern = js_sys::Array::of2(
        &wasm_bindgen::JsValue::from_f64(4.0),
        &wasm_bindgen::JsValue::from_f64(4.0),
    );
    let _ = ctx.set_line_dash(&pattern);
    ctx.set_stroke_style_str(&css(theme.selection));
    ctx.set_line_width(1.0);
    ctx.stroke_rect(x, y, w, h);
    ctx.restore();
}

/// Scaled-down overview in the bottom-right corner.
fn draw_minimap(
    ctx: &CanvasRenderingContext2d,
    snapshot: &Snapshot,
    width: f64,
    height: f64,
    theme: &CanvasTheme,
) {
    if snapshot.nodes.is_empty() {
        return;
    }

    let mut content: Option<Rect> = None;
    for node in &snapshot.nodes {
        let r = node_rect(node);
        content = Some(match content {
            Some(c) => c.union(r),
            None => r,
        });
    }
    let Some(content) = content else { return };
    let content = content.inflate(20.0, 20.0);

    let scale = (MINIMAP_SIZE / content.width()).min(MINIMAP_SIZE / content.height());
    let map_w = content.width() * scale;
    let map_h = content.height() * scale;
    let ox = width - map_w - MINIMAP_MARGIN;
    let oy = height - map_h - MINIMAP_MARGIN;

    ctx.save();
    ctx.set_fill_style_str(&css(theme.minimap_bg));
    ctx.fill_rect(ox, oy, map_w, map_h);

    for node in &snapshot.nodes {
        let r = node_rect(node);
        let color = if node.selected {
            theme.selection
        } else {
            theme.minimap_node
        };
        ctx.set_fill_style_str(&css(color));
        ctx.fill_rect(
            ox + (r.x0 - content.x0) * scale,
            oy + (r.y0 - content.y0) * scale,
            r.width() * scale,
            r.height() * scale,
        );
    }
    ctx.restore();
}

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Replay a kurbo path as Canvas2D commands.
fn trace_path(ctx: &CanvasRenderingContext2d, path: &BezPath) {
    ctx.begin_path();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => ctx.move_to(p.x, p.y),
            PathEl::LineTo(p) => ctx.line_to(p.x, p.y),
            PathEl::QuadTo(c, p) => ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
            PathEl::CurveTo(c1, c2, p) => ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathEl::ClosePath => ctx.close_path(),
        }
    }
}

fn fill_path(ctx: &CanvasRenderingContext2d, path: &BezPath, color: &str) {
    trace_path(ctx, path);
    ctx.set_fill_style_str(color);
    ctx.fill();
}

fn seg_tangent(seg: &PathSeg, t: f64) -> Vec2 {
    match seg {
        PathSeg::Line(l) => l.p1 - l.p0,
        PathSeg::Quad(q) => q.deriv().eval(t).to_vec2(),
        PathSeg::Cubic(c) => c.deriv().eval(t).to_vec2(),
    }
}

/// CSS color string for a model color.
fn css(c: Color) -> String {
    c.to_hex()
}

/// Anchor point of a handle for the connect preview line.
pub fn handle_anchor(snapshot: &Snapshot, id: df_core::NodeId, side: df_core::model::HandleSide) -> Option<(f64, f64)> {
    snapshot.node(id).map(|n| {
        let p: Point = handle_position(node_rect(n), side);
        (p.x, p.y)
    })
}
