//! Gesture state machine for pointer-driven move and resize.

use crate::geometry::{self, BoxRect, GEOMETRY_EPS, ResizeContext, SizeLimits};
use crate::handles::HandleKind;
use crate::input::{PointerEvent, PointerId};
use crate::options::{OptionsError, ResizeCallbacks, ResizeOptions};
use crate::stage::{marker, NodeId, Stage};
use crate::store::GeometryStore;
use kurbo::{Point, Rect, Size, Vec2};
use thiserror::Error;

/// Errors raised while attaching resize behavior to a box.
#[derive(Debug, Error)]
pub enum AttachError {
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
}

/// Everything captured at pointer-down for one gesture.
///
/// A snapshot is allocated fresh per pointer-down and discarded at
/// release; it is never shared between gestures.
#[derive(Debug, Clone, Copy)]
pub struct GestureSnapshot {
    /// Pointer owning this gesture.
    pub pointer: PointerId,
    /// Active handle; `None` drags the whole box.
    pub handle: Option<HandleKind>,
    /// Container bounding rect in document coordinates.
    pub container_rect: Rect,
    /// Parent bounding rect in document coordinates.
    pub parent_rect: Rect,
    /// Box styling at gesture start.
    pub initial: BoxRect,
    /// Parent origin relative to the container origin.
    pub diff: Vec2,
    /// Pointer position at gesture start.
    pub start: Point,
    /// Resolved size limits.
    pub limits: SizeLimits,
    /// Locked aspect ratio, if any.
    pub aspect: Option<f64>,
}

impl GestureSnapshot {
    fn context(&self, invert_on_edge: bool) -> ResizeContext {
        ResizeContext {
            container: self.container_rect.size(),
            offset: self.diff,
            limits: self.limits,
            aspect: self.aspect,
            invert_on_edge,
        }
    }
}

/// Pointer-driven move/resize behavior attached to one box.
///
/// Holds at most one live gesture. Once a gesture starts, further events
/// are funneled to it by pointer id; events from other pointers fall
/// through unconsumed.
pub struct ResizableBox {
    box_id: NodeId,
    container: NodeId,
    options: ResizeOptions,
    callbacks: ResizeCallbacks,
    store: Option<Box<dyn GeometryStore>>,
    active: Option<GestureSnapshot>,
    inert: bool,
}

impl ResizableBox {
    /// Attach move/resize behavior to `box_id`.
    ///
    /// Fails on invalid options or unknown nodes. A box whose parent
    /// lies outside the chosen container degrades to an inert controller
    /// with an error diagnostic instead of failing.
    pub fn attach(
        stage: &mut Stage,
        box_id: NodeId,
        options: ResizeOptions,
    ) -> Result<Self, AttachError> {
        options.validate()?;
        if !stage.contains_node(box_id) {
            return Err(AttachError::UnknownNode(box_id));
        }
        let container = options.container.unwrap_or(stage.root());
        if !stage.contains_node(container) {
            return Err(AttachError::UnknownNode(container));
        }

        let inert = match stage.parent(box_id) {
            Some(parent) if stage.is_ancestor(container, parent) => false,
            _ => {
                log::error!("box {box_id} has no parent inside container {container}");
                true
            }
        };

        stage.ensure_positioned(box_id);
        stage.set_marker(box_id, marker::RESIZABLE, "true");
        stage.set_marker(box_id, marker::CONTAINER, container.to_string());
        if !options.draggable {
            stage.set_marker(box_id, marker::NON_DRAGGABLE, "true");
        }
        if options.keep_aspect_ratio {
            stage.set_marker(box_id, marker::ASPECT_LOCKED, "true");
        }
        if options.invert_on_container_edge {
            stage.set_marker(box_id, marker::INVERT_ON_EDGE, "true");
        }

        Ok(Self {
            box_id,
            container,
            options,
            callbacks: ResizeCallbacks::default(),
            store: None,
            active: None,
            inert,
        })
    }

    /// Set the gesture lifecycle callbacks.
    pub fn set_callbacks(&mut self, callbacks: ResizeCallbacks) {
        self.callbacks = callbacks;
    }

    /// Bind an external geometry store.
    ///
    /// A rect previously saved for this box is restored immediately;
    /// from then on the rect is saved back on every gesture end.
    pub fn bind_store(&mut self, stage: &mut Stage, store: Box<dyn GeometryStore>) {
        match store.load(&self.box_id.to_string()) {
            Ok(Some(rect)) => {
                stage.set_rect(self.box_id, rect);
            }
            Ok(None) => {}
            Err(err) => log::warn!("geometry store load failed for {}: {err}", self.box_id),
        }
        self.store = Some(store);
    }

    /// The box this controller drives.
    pub fn box_id(&self) -> NodeId {
        self.box_id
    }

    /// The bounding container.
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// The live gesture, if one is active.
    pub fn active_gesture(&self) -> Option<&GestureSnapshot> {
        self.active.as_ref()
    }

    /// Whether the controller was degraded at attach.
    pub fn is_inert(&self) -> bool {
        self.inert
    }

    /// Feed a pointer event. Returns whether the event was consumed;
    /// consumed events should not propagate further.
    pub fn handle_event(&mut self, stage: &mut Stage, event: &PointerEvent) -> bool {
        if self.inert {
            return false;
        }
        match *event {
            PointerEvent::Down {
                pointer,
                position,
                target,
            } => self.on_pointer_down(stage, event, pointer, position, target),
            PointerEvent::Move { pointer, position } => {
                self.on_pointer_move(stage, event, pointer, position)
            }
            PointerEvent::Up { pointer, .. } => self.on_pointer_up(stage, event, pointer),
        }
    }

    fn on_pointer_down(
        &mut self,
        stage: &mut Stage,
        event: &PointerEvent,
        pointer: PointerId,
        position: Point,
        target: NodeId,
    ) -> bool {
        let Some(handle) = self.resolve_target(stage, target) else {
            return false;
        };
        if let Some(active) = &self.active {
            log::debug!(
                "ignoring pointer {:?} on {}; pointer {:?} holds the gesture",
                pointer,
                self.box_id,
                active.pointer
            );
            return false;
        }
        let Some(snapshot) = self.capture_snapshot(stage, pointer, handle, position) else {
            return false;
        };

        stage.set_marker(self.container, marker::DRAGGING_WITHIN, "true");
        stage.set_marker(self.box_id, marker::DRAGGING, "true");
        self.active = Some(snapshot);
        if let Some(on_start) = &mut self.callbacks.on_start {
            on_start(event);
        }
        true
    }

    fn on_pointer_move(
        &mut self,
        stage: &mut Stage,
        event: &PointerEvent,
        pointer: PointerId,
        position: Point,
    ) -> bool {
        let Some(snapshot) = &self.active else {
            return false;
        };
        if snapshot.pointer != pointer {
            return false;
        }
        let delta = position - snapshot.start;
        let ctx = snapshot.context(self.options.invert_on_container_edge);
        if let Some(rect) = geometry::resolve_rect(&snapshot.initial, snapshot.handle, delta, &ctx)
        {
            stage.set_rect(self.box_id, rect);
            if let Some(on_move) = &mut self.callbacks.on_move {
                on_move(event);
            }
        }
        true
    }

    fn on_pointer_up(&mut self, stage: &mut Stage, event: &PointerEvent, pointer: PointerId) -> bool {
        let Some(snapshot) = &self.active else {
            return false;
        };
        if snapshot.pointer != pointer {
            return false;
        }

        stage.remove_marker(self.box_id, marker::DRAGGING);
        stage.remove_marker(self.container, marker::DRAGGING_WITHIN);
        if let Some(store) = &self.store {
            if let Some(rect) = stage.rect(self.box_id) {
                if let Err(err) = store.save(&self.box_id.to_string(), &rect) {
                    log::warn!("geometry store save failed for {}: {err}", self.box_id);
                }
            }
        }
        self.active = None;
        if let Some(on_end) = &mut self.callbacks.on_end {
            on_end(event);
        }
        true
    }

    /// Map an event target to a gesture role: the box body (`Some(None)`),
    /// one of its handles (`Some(Some(kind))`), or not ours (`None`).
    fn resolve_target(&self, stage: &Stage, target: NodeId) -> Option<Option<HandleKind>> {
        if target == self.box_id {
            if self.options.draggable {
                return Some(None);
            }
            return None;
        }
        if stage.parent(target) == Some(self.box_id) {
            if let Some(name) = stage.marker(target, marker::HANDLE) {
                if let Some(kind) = HandleKind::from_name(name) {
                    return Some(Some(kind));
                }
            }
        }
        None
    }

    fn capture_snapshot(
        &self,
        stage: &Stage,
        pointer: PointerId,
        handle: Option<HandleKind>,
        position: Point,
    ) -> Option<GestureSnapshot> {
        let container_rect = stage.document_rect(self.container)?;
        let parent_rect = stage.document_rect(stage.parent(self.box_id)?)?;
        let initial = stage.rect(self.box_id)?;
        let diff = parent_rect.origin() - container_rect.origin();
        let limits = SizeLimits {
            min: Size::new(self.options.min_width, self.options.min_height),
            max: Size::new(
                self.options.max_width.unwrap_or(container_rect.width()),
                self.options.max_height.unwrap_or(container_rect.height()),
            ),
        };
        let aspect = if self.options.keep_aspect_ratio {
            Some(aspect_ratio(initial))
        } else {
            None
        };
        Some(GestureSnapshot {
            pointer,
            handle,
            container_rect,
            parent_rect,
            initial,
            diff,
            start: position,
            limits,
            aspect,
        })
    }
}

/// Width/height ratio of a box, falling back to square for a degenerate
/// height.
fn aspect_ratio(rect: BoxRect) -> f64 {
    if rect.height.abs() <= GEOMETRY_EPS {
        log::warn!("aspect lock on a box with zero height, falling back to 1:1");
        return 1.0;
    }
    rect.width / rect.height
}
