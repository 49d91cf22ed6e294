//! Stagewire Core Library
//!
//! Platform-agnostic move/resize gestures for boxes on a stage, with
//! wireframe proxies that mirror geometry to their targets.

pub mod geometry;
pub mod gesture;
pub mod handles;
pub mod input;
pub mod mirror;
pub mod options;
pub mod stage;
pub mod store;

pub use geometry::{bound, resolve_rect, BoxRect, ResizeContext, SizeLimits, GEOMETRY_EPS};
pub use gesture::{AttachError, GestureSnapshot, ResizableBox};
pub use handles::{HandleKind, HandleSelection};
pub use input::{PointerEvent, PointerId};
pub use mirror::{make_wireframe_resizable, WireframeError, WireframeMirror};
pub use options::{OptionsError, ResizeCallbacks, ResizeOptions, DEFAULT_MIN_SIZE};
pub use stage::{marker, NodeId, Stage, StyleChange};
pub use store::{GeometryStore, MemoryStore, StoreError};
