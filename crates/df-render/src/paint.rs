//! Snapshot → Vello drawing commands.
//!
//! Walks a store snapshot and emits Vello paint operations: grid
//! background, edges with markers, shape fills and strokes, selection
//! overlays. Called once per frame with a freshly-cleared `Scene`; the
//! caller presents the scene via wgpu.

use crate::shape::{arrow_head, edge_path, handle_position, node_rect, shape_path};
use crate::theme::{CanvasTheme, GridMode};
use df_core::model::{Color, Edge, Node, ShapeKind};
use df_core::store::Snapshot;
use kurbo::{Affine, BezPath, Circle, ParamCurve, ParamCurveDeriv, Rect, Stroke};
use peniko::Fill;
use vello::Scene;

const GRID_GAP: f64 = 16.0;
const ARROW_SIZE: f64 = 10.0;
const HANDLE_RADIUS: f64 = 4.0;

/// Paint one full frame.
pub fn paint_snapshot(
    scene: &mut Scene,
    snapshot: &Snapshot,
    width: f64,
    height: f64,
    grid: GridMode,
    theme: &CanvasTheme,
) {
    let viewport = Rect::new(0.0, 0.0, width, height);
    scene.fill(
        Fill::NonZero,
        Affine::IDENTITY,
        to_peniko(theme.bg),
        None,
        &viewport,
    );

    paint_grid(scene, viewport, grid, theme);

    // Edges under nodes, as the canvas layers them.
    for edge in &snapshot.edges {
        paint_edge(scene, snapshot, edge, theme);
    }
    for node in &snapshot.nodes {
        paint_node(scene, node, theme);
    }
}

fn paint_grid(scene: &mut Scene, viewport: Rect, grid: GridMode, theme: &CanvasTheme) {
    let color = to_peniko(theme.grid);
    match grid {
        GridMode::None => {}
        GridMode::Lines => {
            let mut path = BezPath::new();
            let mut x = viewport.x0;
            while x <= viewport.x1 {
                path.move_to((x, viewport.y0));
                path.line_to((x, viewport.y1));
                x += GRID_GAP;
            }
            let mut y = viewport.y0;
            while y <= viewport.y1 {
                path.move_to((viewport.x0, y));
                path.line_to((viewport.x1, y));
                y += GRID_GAP;
            }
            scene.stroke(&Stroke::new(1.0), Affine::IDENTITY, color, None, &path);
        }
        GridMode::Dots => {
            let mut y = viewport.y0;
            while y <= viewport.y1 {
                let mut x = viewport.x0;
                while x <= viewport.x1 {
                    scene.fill(
                        Fill::NonZero,
                        Affine::IDENTITY,
                        color,
                        None,
                        &Circle::new((x, y), 1.0),
                    );
                    x += GRID_GAP;
                }
                y += GRID_GAP;
            }
        }
    }
}

fn paint_node(scene: &mut Scene, node: &Node, theme: &CanvasTheme) {
    let r = node_rect(node);
    let path = shape_path(node.kind, r);

    // Free text has no background of its own.
    if node.kind != ShapeKind::Text {
        scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            to_peniko(node.fill),
            None,
            &path,
        );
        scene.stroke(
            &Stroke::new(1.0),
            Affine::IDENTITY,
            to_peniko(Color::rgba(0.0, 0.0, 0.0, 0.15)),
            None,
            &path,
        );
    }

    // Label shaping needs a font context; deferred to the font milestone.
    log::trace!(
        "LABEL {} {:?} at ({}, {})",
        node.id,
        node.label,
        r.x0,
        r.y0
    );

    if node.selected {
        scene.stroke(
            &Stroke::new(1.5),
            Affine::IDENTITY,
            to_peniko(theme.selection),
            None,
            &r.inflate(3.0, 3.0),
        );
        for side in df_core::model::HandleSide::ALL {
            let p = handle_position(r, side);
            scene.fill(
                Fill::NonZero,
                Affine::IDENTITY,
                to_peniko(theme.handle),
                None,
                &Circle::new(p, HANDLE_RADIUS),
            );
        }
    }
}

fn paint_edge(scene: &mut Scene, snapshot: &Snapshot, edge: &Edge, theme: &CanvasTheme) {
    let (Some(src), Some(dst)) = (snapshot.node(edge.source), snapshot.node(edge.target)) else {
        log::trace!("edge {} references a missing node, skipping", edge.id);
        return;
    };

    let p0 = handle_position(node_rect(src), edge.source_handle);
    let p1 = handle_position(node_rect(dst), edge.target_handle);
    let path = edge_path(p0, edge.source_handle, p1, edge.target_handle);
    let color = to_peniko(edge.stroke.color);

    let mut stroke = Stroke::new(edge.stroke.width as f64);
    if let Some(dash) = &edge.stroke.dash {
        stroke = stroke.with_dashes(0.0, dash.iter().map(|d| *d as f64));
    }
    scene.stroke(&stroke, Affine::IDENTITY, color, None, &path);

    // Arrowheads follow the curve's end tangents.
    if let Some(seg) = path.segments().next() {
        if edge.end_marker.is_some() {
            let tangent = match seg {
                kurbo::PathSeg::Cubic(c) => c.deriv().eval(1.0).to_vec2(),
                kurbo::PathSeg::Quad(q) => q.deriv().eval(1.0).to_vec2(),
                kurbo::PathSeg::Line(l) => l.p1 - l.p0,
            };
            let head = arrow_head(p1, tangent, ARROW_SIZE);
            scene.fill(Fill::NonZero, Affine::IDENTITY, color, None, &head);
        }
        if edge.start_marker.is_some() {
            let tangent = match seg {
                kurbo::PathSeg::Cubic(c) => c.deriv().eval(0.0).to_vec2(),
                kurbo::PathSeg::Quad(q) => q.deriv().eval(0.0).to_vec2(),
                kurbo::PathSeg::Line(l) => l.p1 - l.p0,
            };
            let head = arrow_head(p0, -tangent, ARROW_SIZE);
            scene.fill(Fill::NonZero, Affine::IDENTITY, color, None, &head);
        }
    }

    if edge.selected {
        let mut outline = Stroke::new(edge.stroke.width as f64 + 3.0);
        outline = outline.with_dashes(0.0, [4.0, 4.0]);
        scene.stroke(
            &outline,
            Affine::IDENTITY,
            to_peniko(theme.selection),
            None,
            &path,
        );
    }
}

fn to_peniko(c: Color) -> peniko::Color {
    peniko::Color::from_rgba8(
        (c.r * 255.0).round() as u8,
        (c.g * 255.0).round() as u8,
        (c.b * 255.0).round() as u8,
        (c.a * 255.0).round() as u8,
    )
}
