//! SVG export: snapshot → standalone SVG document.
//!
//! Pure string emission with no DOM dependency, so it runs (and is tested)
//! natively. The viewBox fits the diagram content with a 16px margin.

use df_core::model::{Edge, Node, ShapeKind};
use df_core::store::Snapshot;
use df_render::shape::{arrow_head, edge_path, handle_position, node_rect, shape_path};
use kurbo::{ParamCurve, ParamCurveDeriv, PathSeg, Point, Rect, Shape, Vec2};
use std::fmt::Write;

const MARGIN: f64 = 16.0;
const ARROW_SIZE: f64 = 10.0;

/// Render the whole snapshot as an SVG document string.
pub fn render_svg(snapshot: &Snapshot) -> String {
    let bounds = content_bounds(snapshot);
    let (min_x, min_y) = (bounds.x0 - MARGIN, bounds.y0 - MARGIN);
    let width = bounds.width() + MARGIN * 2.0;
    let height = bounds.height() + MARGIN * 2.0;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="{min_x} {min_y} {width} {height}">"#
    );
    svg.push_str("<style>\n  text { font-family: system-ui, sans-serif; font-size: 13px; }\n</style>\n");

    // Edges underneath nodes, same as the canvas paint order.
    for edge in &snapshot.edges {
        emit_edge(&mut svg, snapshot, edge);
    }
    for node in &snapshot.nodes {
        emit_node(&mut svg, node);
    }

    svg.push_str("</svg>");
    svg
}

/// Tight bounding box of every node and edge curve. Falls back to an
/// 800×600 page for an empty diagram.
fn content_bounds(snapshot: &Snapshot) -> Rect {
    let mut bounds: Option<Rect> = None;
    let mut grow = |r: Rect| {
        bounds = Some(match bounds {
            Some(b) => b.union(r),
            None => r,
        });
    };

    for node in &snapshot.nodes {
        grow(node_rect(node));
    }
    for edge in &snapshot.edges {
        if let Some(path) = edge_curve(snapshot, edge) {
            grow(path.bounding_box());
        }
    }

    bounds.unwrap_or_else(|| Rect::new(0.0, 0.0, 800.0, 600.0))
}

fn edge_curve(snapshot: &Snapshot, edge: &Edge) -> Option<kurbo::BezPath> {
    let src = snapshot.node(edge.source)?;
    let dst = snapshot.node(edge.target)?;
    let p0 = handle_position(node_rect(src), edge.source_handle);
    let p1 = handle_position(node_rect(dst), edge.target_handle);
    Some(edge_path(p0, edge.source_handle, p1, edge.target_handle))
}

fn emit_node(out: &mut String, node: &Node) {
    let r = node_rect(node);

    // Text nodes are label-only; every other kind gets its outline.
    if node.kind != ShapeKind::Text {
        let d = shape_path(node.kind, r).to_svg();
        let _ = writeln!(
            out,
            r##"  <path d="{d}" fill="{}" stroke="#999999" stroke-width="1"/>"##,
            node.fill.to_hex()
        );
    }

    if !node.label.is_empty() {
        let cx = r.x0 + r.width() / 2.0;
        let cy = r.y0 + r.height() / 2.0;
        let _ = writeln!(
            out,
            r#"  <text x="{cx}" y="{cy}" text-anchor="middle" dominant-baseline="middle" fill="{}">{}</text>"#,
            node.text_color.to_hex(),
            escape_text(&node.label)
        );
    }
}

fn emit_edge(out: &mut String, snapshot: &Snapshot, edge: &Edge) {
    let Some(path) = edge_curve(snapshot, edge) else {
        return;
    };
    let color = edge.stroke.color.to_hex();

    let dash_attr = match &edge.stroke.dash {
        Some(dash) => {
            let pattern: Vec<String> = dash.iter().map(|d| d.to_string()).collect();
            format!(r#" stroke-dasharray="{}""#, pattern.join(" "))
        }
        None => String::new(),
    };
    let _ = writeln!(
        out,
        r#"  <path d="{}" fill="none" stroke="{color}" stroke-width="{}"{dash_attr}/>"#,
        path.to_svg(),
        edge.stroke.width
    );

    // Arrowheads as filled triangles aligned with the curve tangents.
    let segs: Vec<PathSeg> = path.segments().collect();
    if let (Some(first), Some(last)) = (segs.first(), segs.last()) {
        if edge.start_marker.is_some() {
            let tip = first.eval(0.0);
            let tangent = seg_tangent(first, 0.0);
            emit_arrow(out, tip, -tangent, &color);
        }
        if edge.end_marker.is_some() {
            let tip = last.eval(1.0);
            let tangent = seg_tangent(last, 1.0);
            emit_arrow(out, tip, tangent, &color);
        }
    }
}

fn seg_tangent(seg: &PathSeg, t: f64) -> Vec2 {
    match seg {
        PathSeg::Line(l) => l.p1 - l.p0,
        PathSeg::Quad(q) => q.deriv().eval(t).to_vec2(),
        PathSeg::Cubic(c) => c.deriv().eval(t).to_vec2(),
    }
}

fn emit_arrow(out: &mut String, tip: Point, dir: Vec2, color: &str) {
    let d = arrow_head(tip, dir, ARROW_SIZE).to_svg();
    let _ = writeln!(out, r#"  <path d="{d}" fill="{color}"/>"#);
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
