//! Shape geometry: `ShapeKind` → kurbo paths, handle anchors, edge curves.
//!
//! Geometry mirrors the CSS the shapes were originally styled with:
//! diamond via a four-point clip polygon, input/output via a -20° skew,
//! data via a 10% clip trapezoid. The remaining flowchart symbols use their
//! conventional outlines.

use df_core::model::{HandleSide, Node, ShapeKind};
use kurbo::{BezPath, Ellipse, Point, Rect, RoundedRect, Shape, Vec2};

/// skewX(-20deg) horizontal offset per unit height.
const SKEW_20_DEG: f64 = 0.364;

/// The axis-aligned bounding rect of a node on the canvas.
pub fn node_rect(node: &Node) -> Rect {
    Rect::new(
        node.position.x as f64,
        node.position.y as f64,
        (node.position.x + node.size.width) as f64,
        (node.position.y + node.size.height) as f64,
    )
}

/// Build the outline path for a shape kind within its bounding rect.
pub fn shape_path(kind: ShapeKind, r: Rect) -> BezPath {
    let (x0, y0, x1, y1) = (r.x0, r.y0, r.x1, r.y1);
    let w = r.width();
    let h = r.height();
    let mid_x = x0 + w / 2.0;
    let mid_y = y0 + h / 2.0;

    match kind {
        ShapeKind::Rectangle | ShapeKind::Process | ShapeKind::Text => {
            RoundedRect::from_rect(r, 4.0).to_path(0.1)
        }

        ShapeKind::Ellipse | ShapeKind::StartEnd | ShapeKind::Connector => {
            Ellipse::new((mid_x, mid_y), (w / 2.0, h / 2.0), 0.0).to_path(0.1)
        }

        ShapeKind::Diamond | ShapeKind::Decision => polygon(&[
            (mid_x, y0),
            (x1, mid_y),
            (mid_x, y1),
            (x0, mid_y),
        ]),

        ShapeKind::InputOutput => {
            let o = (h * SKEW_20_DEG).min(w / 2.0);
            polygon(&[(x0 + o, y0), (x1, y0), (x1 - o, y1), (x0, y1)])
        }

        ShapeKind::Data => {
            let o = w * 0.1;
            polygon(&[(x0 + o, y0), (x1, y0), (x1 - o, y1), (x0, y1)])
        }

        ShapeKind::Document => {
            let d = (h * 0.15).max(4.0);
            let mut p = BezPath::new();
            p.move_to((x0, y0));
            p.line_to((x1, y0));
            p.line_to((x1, y1 - d));
            p.quad_to((x0 + w * 0.75, y1 - d * 2.0), (mid_x, y1 - d));
            p.quad_to((x0 + w * 0.25, y1), (x0, y1 - d));
            p.close_path();
            p
        }

        ShapeKind::Predefined => {
            let bar = (w * 0.08).clamp(4.0, 12.0);
            let mut p = RoundedRect::from_rect(r, 2.0).to_path(0.1);
            // Double side bars — zero-area subpaths, visible on stroke only.
            p.move_to((x0 + bar, y0));
            p.line_to((x0 + bar, y1));
            p.move_to((x1 - bar, y0));
            p.line_to((x1 - bar, y1));
            p
        }

        ShapeKind::ManualOperation => {
            let o = w * 0.15;
            polygon(&[(x0, y0), (x1, y0), (x1 - o, y1), (x0 + o, y1)])
        }

        ShapeKind::Preparation => {
            let o = (w * 0.2).min(h / 2.0);
            polygon(&[
                (x0 + o, y0),
                (x1 - o, y0),
                (x1, mid_y),
                (x1 - o, y1),
                (x0 + o, y1),
                (x0, mid_y),
            ])
        }

        ShapeKind::StoredData => {
            let e = (w * 0.15).min(h / 2.0);
            let mut p = BezPath::new();
            p.move_to((x1, y0));
            p.line_to((x0 + e, y0));
            p.curve_to((x0 - e * 0.5, y0 + h * 0.25), (x0 - e * 0.5, y1 - h * 0.25), (x0 + e, y1));
            p.line_to((x1, y1));
            p.curve_to((x1 - e * 1.5, y1 - h * 0.25), (x1 - e * 1.5, y0 + h * 0.25), (x1, y0));
            p.close_path();
            p
        }

        ShapeKind::Merge => polygon(&[(x0, y0), (x1, y0), (mid_x, y1)]),
    }
}

fn polygon(points: &[(f64, f64)]) -> BezPath {
    let mut p = BezPath::new();
    let mut iter = points.iter();
    if let Some(&(x, y)) = iter.next() {
        p.move_to((x, y));
        for &(x, y) in iter {
            p.line_to((x, y));
        }
        p.close_path();
    }
    p
}

/// Center of the given boundary side — where edges attach.
pub fn handle_position(r: Rect, side: HandleSide) -> Point {
    match side {
        HandleSide::Top => Point::new(r.x0 + r.width() / 2.0, r.y0),
        HandleSide::Bottom => Point::new(r.x0 + r.width() / 2.0, r.y1),
        HandleSide::Left => Point::new(r.x0, r.y0 + r.height() / 2.0),
        HandleSide::Right => Point::new(r.x1, r.y0 + r.height() / 2.0),
    }
}

/// Outward unit normal of a handle side.
pub fn handle_normal(side: HandleSide) -> Vec2 {
    match side {
        HandleSide::Top => Vec2::new(0.0, -1.0),
        HandleSide::Bottom => Vec2::new(0.0, 1.0),
        HandleSide::Left => Vec2::new(-1.0, 0.0),
        HandleSide::Right => Vec2::new(1.0, 0.0),
    }
}

/// Cubic bézier between two handles, leaving each along its side normal.
pub fn edge_path(src: Point, src_side: HandleSide, dst: Point, dst_side: HandleSide) -> BezPath {
    let dist = ((dst - src).hypot() / 2.0).clamp(30.0, 150.0);
    let c1 = src + handle_normal(src_side) * dist;
    let c2 = dst + handle_normal(dst_side) * dist;
    let mut p = BezPath::new();
    p.move_to(src);
    p.curve_to(c1, c2, dst);
    p
}

/// Closed triangular arrowhead with its tip at `tip`, pointing along `dir`.
pub fn arrow_head(tip: Point, dir: Vec2, size: f64) -> BezPath {
    let dir = if dir.hypot() < 1e-6 {
        Vec2::new(0.0, 1.0)
    } else {
        dir / dir.hypot()
    };
    let perp = Vec2::new(-dir.y, dir.x);
    let base = tip - dir * size;
    polygon(&[
        (tip.x, tip.y),
        (base.x + perp.x * size * 0.5, base.y + perp.y * size * 0.5),
        (base.x - perp.x * size * 0.5, base.y - perp.y * size * 0.5),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_core::NodeId;
    use df_core::model::Position;
    use kurbo::ParamCurve;

    fn rect_100() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 50.0)
    }

    #[test]
    fn every_kind_produces_a_path() {
        for kind in ShapeKind::ALL {
            let path = shape_path(kind, rect_100());
            assert!(
                path.elements().len() >= 2,
                "{kind:?} produced an empty path"
            );
        }
    }

    #[test]
    fn handles_sit_on_side_midpoints() {
        let node = Node::new(
            NodeId::intern("h1"),
            ShapeKind::Rectangle,
            Position::new(10.0, 20.0),
        );
        let r = node_rect(&node);
        assert_eq!(handle_position(r, HandleSide::Top), Point::new(85.0, 20.0));
        assert_eq!(
            handle_position(r, HandleSide::Bottom),
            Point::new(85.0, 70.0)
        );
        assert_eq!(handle_position(r, HandleSide::Left), Point::new(10.0, 45.0));
        assert_eq!(
            handle_position(r, HandleSide::Right),
            Point::new(160.0, 45.0)
        );
    }

    #[test]
    fn edge_path_starts_and_ends_at_handles() {
        let src = Point::new(0.0, 0.0);
        let dst = Point::new(200.0, 100.0);
        let path = edge_path(src, HandleSide::Bottom, dst, HandleSide::Top);
        let segs: Vec<_> = path.segments().collect();
        assert_eq!(segs.len(), 1);
        let start = segs[0].eval(0.0);
        let end = segs[0].eval(1.0);
        assert!((start - src).hypot() < 1e-9);
        assert!((end - dst).hypot() < 1e-9);
    }

    #[test]
    fn diamond_contains_center_not_corner() {
        let path = shape_path(ShapeKind::Diamond, rect_100());
        assert!(path.contains(Point::new(50.0, 25.0)));
        assert!(!path.contains(Point::new(2.0, 2.0)));
    }
}
