//! Presentation configuration: grid background mode and light/dark theme.
//! Pure view concerns — neither touches the graph model.

use df_core::model::Color;

/// Background grid display mode, cycled by one control. Not persisted
/// across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridMode {
    /// Ruled background.
    #[default]
    Lines,
    /// Dotted background.
    Dots,
    /// No background grid.
    None,
}

impl GridMode {
    /// lines → dots → none → lines.
    pub fn cycle(self) -> Self {
        match self {
            GridMode::Lines => GridMode::Dots,
            GridMode::Dots => GridMode::None,
            GridMode::None => GridMode::Lines,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GridMode::Lines => "lines",
            GridMode::Dots => "dots",
            GridMode::None => "none",
        }
    }
}

/// Theme-dependent canvas colors.
#[derive(Debug, Clone)]
pub struct CanvasTheme {
    pub bg: Color,
    pub grid: Color,
    pub selection: Color,
    pub handle: Color,
    pub minimap_bg: Color,
    pub minimap_node: Color,
}

impl CanvasTheme {
    pub fn light() -> Self {
        Self {
            bg: Color::rgba(0.976, 0.976, 0.98, 1.0),
            grid: Color::rgba(0.0, 0.0, 0.0, 0.08),
            selection: Color::rgba(0.231, 0.51, 0.965, 1.0), // #3B82F6
            handle: Color::rgba(0.231, 0.51, 0.965, 1.0),
            minimap_bg: Color::rgba(1.0, 1.0, 1.0, 0.85),
            minimap_node: Color::rgba(0.93, 0.93, 0.93, 1.0),
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: Color::rgba(0.12, 0.125, 0.14, 1.0),
            grid: Color::rgba(1.0, 1.0, 1.0, 0.06),
            selection: Color::rgba(0.231, 0.51, 0.965, 1.0),
            handle: Color::rgba(0.231, 0.51, 0.965, 1.0),
            minimap_bg: Color::rgba(0.2, 0.2, 0.22, 0.85),
            minimap_node: Color::rgba(0.27, 0.27, 0.27, 1.0),
        }
    }

    pub fn pick(dark: bool) -> Self {
        if dark { Self::dark() } else { Self::light() }
    }
}
