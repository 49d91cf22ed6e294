//! Resize handle vocabulary and handle set construction.

use serde::{Deserialize, Serialize};

/// A resize handle direction on the box edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandleKind {
    Top,
    Right,
    Bottom,
    Left,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// The four side handles, in presentation order.
pub const SIDE_HANDLES: [HandleKind; 4] = [
    HandleKind::Top,
    HandleKind::Right,
    HandleKind::Bottom,
    HandleKind::Left,
];

/// The four corner handles, in presentation order.
pub const CORNER_HANDLES: [HandleKind; 4] = [
    HandleKind::TopLeft,
    HandleKind::TopRight,
    HandleKind::BottomLeft,
    HandleKind::BottomRight,
];

impl HandleKind {
    /// Whether this handle drags the top edge.
    pub fn has_top(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    /// Whether this handle drags the bottom edge.
    pub fn has_bottom(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }

    /// Whether this handle drags the left edge.
    pub fn has_left(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    /// Whether this handle drags the right edge.
    pub fn has_right(self) -> bool {
        matches!(self, Self::Right | Self::TopRight | Self::BottomRight)
    }

    /// Marker attribute value for this handle.
    pub fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }

    /// Parse a marker attribute value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "top" => Some(Self::Top),
            "right" => Some(Self::Right),
            "bottom" => Some(Self::Bottom),
            "left" => Some(Self::Left),
            "top-left" => Some(Self::TopLeft),
            "top-right" => Some(Self::TopRight),
            "bottom-left" => Some(Self::BottomLeft),
            "bottom-right" => Some(Self::BottomRight),
            _ => None,
        }
    }
}

/// Which handles to attach to a resizable box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandleSelection {
    /// All eight handles.
    All,
    /// The four side handles only.
    Sides,
    /// The four corner handles only.
    Corners,
    /// No handles; the box stays drag-only.
    None,
    /// An explicit handle list.
    Custom(Vec<HandleKind>),
}

impl Default for HandleSelection {
    fn default() -> Self {
        Self::All
    }
}

impl HandleSelection {
    /// Resolve the selection into a concrete handle list.
    pub fn resolve(&self) -> Vec<HandleKind> {
        match self {
            Self::All => SIDE_HANDLES.iter().chain(CORNER_HANDLES.iter()).copied().collect(),
            Self::Sides => SIDE_HANDLES.to_vec(),
            Self::Corners => CORNER_HANDLES.to_vec(),
            Self::None => Vec::new(),
            Self::Custom(kinds) => kinds.clone(),
        }
    }

    /// Parse a selection keyword; unknown keywords resolve to no handles.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "all" => Self::All,
            "sides" => Self::Sides,
            "corners" => Self::Corners,
            _ => Self::None,
        }
    }
}
