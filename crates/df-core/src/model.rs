//! Flowchart data model.
//!
//! Two flat, insertion-ordered collections: shape nodes and directed edges.
//! Edges attach to one of four fixed handles on each node's boundary.
//! Nothing here is observable on its own — `FlowStore` owns the collections
//! and is the only mutator.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgba(
                    (r * 17) as f32 / 255.0,
                    (g * 17) as f32 / 255.0,
                    (b * 17) as f32 / 255.0,
                    1.0,
                ))
            }
            4 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                let a = hex_val(bytes[3])?;
                Some(Self::rgba(
                    (r * 17) as f32 / 255.0,
                    (g * 17) as f32 / 255.0,
                    (b * 17) as f32 / 255.0,
                    (a * 17) as f32 / 255.0,
                ))
            }
            6 => {
                let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                Some(Self::rgba(
                    r as f32 / 255.0,
                    g as f32 / 255.0,
                    b as f32 / 255.0,
                    1.0,
                ))
            }
            8 => {
                let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
                let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
                let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
                let a = hex_val(bytes[6])? << 4 | hex_val(bytes[7])?;
                Some(Self::rgba(
                    r as f32 / 255.0,
                    g as f32 / 255.0,
                    b as f32 / 255.0,
                    a as f32 / 255.0,
                ))
            }
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let r = (self.r * 255.0).round() as u8;
        let g = (self.g * 255.0).round() as u8;
        let b = (self.b * 255.0).round() as u8;
        let a = (self.a * 255.0).round() as u8;
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Canvas coordinates. Any finite pair is valid — there is no canvas-bounds
/// validation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Node dimensions. Components are clamped non-negative at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }
}

impl Default for Size {
    /// The default placement size for every palette shape.
    fn default() -> Self {
        Self {
            width: 150.0,
            height: 50.0,
        }
    }
}

// ─── Shape kinds ─────────────────────────────────────────────────────────

/// The fixed palette of shape kinds. Immutable after node creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Diamond,
    /// Free text — rendered without a background.
    Text,
    StartEnd,
    Process,
    Decision,
    InputOutput,
    Predefined,
    Connector,
    Data,
    Document,
    ManualOperation,
    Preparation,
    StoredData,
    Merge,
}

impl ShapeKind {
    /// All sixteen palette entries, in sidebar order.
    pub const ALL: [ShapeKind; 16] = [
        ShapeKind::Rectangle,
        ShapeKind::Ellipse,
        ShapeKind::Diamond,
        ShapeKind::Text,
        ShapeKind::StartEnd,
        ShapeKind::Process,
        ShapeKind::Decision,
        ShapeKind::InputOutput,
        ShapeKind::Predefined,
        ShapeKind::Connector,
        ShapeKind::Data,
        ShapeKind::Document,
        ShapeKind::ManualOperation,
        ShapeKind::Preparation,
        ShapeKind::StoredData,
        ShapeKind::Merge,
    ];

    /// Stable palette name, used for ID prefixes and the wasm boundary.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Text => "text",
            ShapeKind::StartEnd => "start",
            ShapeKind::Process => "process",
            ShapeKind::Decision => "decision",
            ShapeKind::InputOutput => "input-output",
            ShapeKind::Predefined => "predefined",
            ShapeKind::Connector => "connector",
            ShapeKind::Data => "data",
            ShapeKind::Document => "document",
            ShapeKind::ManualOperation => "manual",
            ShapeKind::Preparation => "preparation",
            ShapeKind::StoredData => "stored",
            ShapeKind::Merge => "merge",
        }
    }

    /// Parse a palette name back to a kind.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }

    /// The label every freshly placed node starts with.
    pub fn default_label(&self) -> String {
        format!("{} node", self.as_str())
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// One placed shape on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique across all live nodes, fixed for the node's lifetime.
    pub id: NodeId,
    /// Immutable after creation.
    pub kind: ShapeKind,
    pub position: Position,
    pub size: Size,
    pub label: String,
    pub fill: Color,
    pub text_color: Color,
    pub selected: bool,
}

impl Node {
    /// A node with placement defaults: 150×50, white fill, black text,
    /// `"<kind> node"` label.
    pub fn new(id: NodeId, kind: ShapeKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            size: Size::default(),
            label: kind.default_label(),
            fill: Color::WHITE,
            text_color: Color::BLACK,
            selected: false,
        }
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// One of four fixed attachment points on a node's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HandleSide {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl HandleSide {
    pub const ALL: [HandleSide; 4] = [
        HandleSide::Top,
        HandleSide::Bottom,
        HandleSide::Left,
        HandleSide::Right,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandleSide::Top => "top",
            HandleSide::Bottom => "bottom",
            HandleSide::Left => "left",
            HandleSide::Right => "right",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|h| h.as_str() == s)
    }
}

/// Arrowhead decoration at an edge endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Marker {
    #[default]
    ArrowClosed,
}

/// Stroke style of an edge. Dash pattern `None` means a solid line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStroke {
    pub color: Color,
    pub width: f32,
    pub dash: Option<SmallVec<[f32; 4]>>,
}

impl Default for EdgeStroke {
    /// Black, 2px, solid — the connect-time default.
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 2.0,
            dash: None,
        }
    }
}

/// A directed connection between two node handles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: NodeId,
    pub source: NodeId,
    pub target: NodeId,
    pub source_handle: HandleSide,
    pub target_handle: HandleSide,
    pub stroke: EdgeStroke,
    /// Arrowhead at the source end. Both markers may be set at once —
    /// no UI path does, but the state is permitted.
    pub start_marker: Option<Marker>,
    /// Arrowhead at the target end.
    pub end_marker: Option<Marker>,
    pub selected: bool,
}

/// A connect request from a drag gesture. No self-loop or duplicate-edge
/// prohibition — parallel edges between the same pair are fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source: NodeId,
    pub source_handle: HandleSide,
    pub target: NodeId,
    pub target_handle: HandleSide,
}
