pub mod hit;
pub mod paint;
pub mod shape;
pub mod theme;

pub use shape::{edge_path, handle_position, node_rect, shape_path};
pub use theme::{CanvasTheme, GridMode};
