//! Wireframe proxies that mirror geometry to and from their targets.

use crate::gesture::{AttachError, ResizableBox};
use crate::options::ResizeOptions;
use crate::stage::{marker, NodeId, Stage};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by wireframe creation and wiring.
#[derive(Debug, Error)]
pub enum WireframeError {
    #[error("node {0} is not a wireframe")]
    NotAWireframe(NodeId),
    #[error("wireframe {wire} points at missing target {target}")]
    TargetMissing { wire: NodeId, target: NodeId },
    #[error("node {0} has no parent to host a wireframe layer")]
    MissingParent(NodeId),
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
    #[error(transparent)]
    Attach(#[from] AttachError),
}

/// Owner of wireframe proxies and their geometry synchronization.
///
/// Each target gets one wireframe in a shared per-parent layer. Both
/// sides of a pair are watched; [`WireframeMirror::sync`] drains the
/// stage change queue and copies each changed node's current geometry to
/// the counterpart. The counterpart write is elided when geometry
/// already matches, so an echoed change never loops.
#[derive(Debug, Default)]
pub struct WireframeMirror {
    /// target -> wireframe
    wires: HashMap<NodeId, NodeId>,
    /// wireframe -> target
    targets: HashMap<NodeId, NodeId>,
    /// parent -> layer hosting its wireframes
    layers: HashMap<NodeId, NodeId>,
}

impl WireframeMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create one wireframe per target, reusing existing pairs.
    ///
    /// Returned ids parallel `targets`. On error, targets wired before
    /// the failing one keep their pairs.
    pub fn create_wireframes(
        &mut self,
        stage: &mut Stage,
        targets: &[NodeId],
    ) -> Result<Vec<NodeId>, WireframeError> {
        let mut wires = Vec::with_capacity(targets.len());
        for &target in targets {
            wires.push(self.create_wireframe(stage, target)?);
        }
        Ok(wires)
    }

    fn create_wireframe(
        &mut self,
        stage: &mut Stage,
        target: NodeId,
    ) -> Result<NodeId, WireframeError> {
        if !stage.contains_node(target) {
            return Err(WireframeError::UnknownNode(target));
        }
        if let Some(&wire) = self.wires.get(&target) {
            return Ok(wire);
        }
        let parent = stage
            .parent(target)
            .ok_or(WireframeError::MissingParent(target))?;
        stage.ensure_positioned(target);
        let layer = self.layer_for(stage, parent);

        let rect = stage
            .rect(target)
            .ok_or(WireframeError::UnknownNode(target))?;
        let wire = stage
            .insert(layer, rect)
            .ok_or(WireframeError::UnknownNode(layer))?;
        stage.ensure_positioned(wire);

        stage.set_marker(target, marker::WIRE_ID, wire.to_string());
        stage.set_marker(wire, marker::TARGET_ID, target.to_string());
        self.wires.insert(target, wire);
        self.targets.insert(wire, target);
        stage.watch(target);
        stage.watch(wire);
        Ok(wire)
    }

    /// The layer under `parent` that hosts wireframes, created on first
    /// use and shared by every wireframe whose target lives there.
    fn layer_for(&mut self, stage: &mut Stage, parent: NodeId) -> NodeId {
        if let Some(&layer) = self.layers.get(&parent) {
            if stage.contains_node(layer) {
                return layer;
            }
        }
        let found = stage
            .children(parent)
            .iter()
            .copied()
            .find(|&child| stage.has_marker(child, marker::LAYER));
        let layer = match found {
            Some(layer) => layer,
            None => {
                let rect = crate::geometry::BoxRect::new(0.0, 0.0, 0.0, 0.0);
                // Insert only fails for an unknown parent.
                let layer = stage.insert(parent, rect).unwrap_or(parent);
                stage.ensure_positioned(layer);
                stage.set_marker(layer, marker::LAYER, "true");
                layer
            }
        };
        self.layers.insert(parent, layer);
        layer
    }

    /// Drain pending change notifications and mirror each changed node's
    /// current geometry onto its pair counterpart. A pair whose
    /// counterpart disappeared is torn down.
    pub fn sync(&mut self, stage: &mut Stage) {
        while let Some(change) = stage.take_change() {
            let Some(counterpart) = self.counterpart(change.node) else {
                continue;
            };
            if !stage.contains_node(counterpart) {
                log::warn!(
                    "counterpart {counterpart} of {} is gone, unwiring the pair",
                    change.node
                );
                self.tear_down(stage, change.node);
                continue;
            }
            // Records batched behind a newer write are stale; the node's
            // current geometry is authoritative.
            let Some(rect) = stage.rect(change.node) else {
                continue;
            };
            stage.set_rect(counterpart, rect);
        }
    }

    /// Unwire one pair given either of its sides.
    pub fn detach(&mut self, stage: &mut Stage, node: NodeId) {
        self.tear_down(stage, node);
    }

    /// Unwire every pair and forget cached layers. Wireframe nodes stay
    /// in the stage; they just stop mirroring.
    pub fn dispose(&mut self, stage: &mut Stage) {
        let targets: Vec<NodeId> = self.wires.keys().copied().collect();
        for target in targets {
            self.tear_down(stage, target);
        }
        self.layers.clear();
    }

    /// The wireframe mirroring `target`, if wired.
    pub fn wire_of(&self, target: NodeId) -> Option<NodeId> {
        self.wires.get(&target).copied()
    }

    /// The target mirrored by `wire`, if wired.
    pub fn target_of(&self, wire: NodeId) -> Option<NodeId> {
        self.targets.get(&wire).copied()
    }

    /// Number of live pairs.
    pub fn pair_count(&self) -> usize {
        self.wires.len()
    }

    fn counterpart(&self, node: NodeId) -> Option<NodeId> {
        self.wires
            .get(&node)
            .or_else(|| self.targets.get(&node))
            .copied()
    }

    fn tear_down(&mut self, stage: &mut Stage, node: NodeId) {
        let (target, wire) = if let Some(&wire) = self.wires.get(&node) {
            (node, wire)
        } else if let Some(&target) = self.targets.get(&node) {
            (target, node)
        } else {
            return;
        };
        self.wires.remove(&target);
        self.targets.remove(&wire);
        stage.unwatch(target);
        stage.unwatch(wire);
        stage.remove_marker(target, marker::WIRE_ID);
        stage.remove_marker(wire, marker::TARGET_ID);
    }
}

/// Attach move/resize behavior to a wireframe.
///
/// Handle nodes for the selected handle set are (re)built as children of
/// the wireframe, then a controller is attached to it. Geometry applied
/// to the wireframe reaches the target through [`WireframeMirror::sync`].
pub fn make_wireframe_resizable(
    stage: &mut Stage,
    mirror: &WireframeMirror,
    wire: NodeId,
    options: ResizeOptions,
) -> Result<ResizableBox, WireframeError> {
    // Bad options must fail before any handle children are rebuilt.
    options.validate().map_err(AttachError::InvalidOptions)?;
    if !stage.contains_node(wire) {
        return Err(WireframeError::UnknownNode(wire));
    }
    let target = mirror
        .target_of(wire)
        .ok_or(WireframeError::NotAWireframe(wire))?;
    if !stage.contains_node(target) {
        return Err(WireframeError::TargetMissing { wire, target });
    }
    stage.ensure_positioned(target);

    let stale: Vec<NodeId> = stage
        .children(wire)
        .iter()
        .copied()
        .filter(|&child| stage.has_marker(child, marker::HANDLE))
        .collect();
    for child in stale {
        stage.remove(child);
    }
    for kind in options.handles.resolve() {
        if let Some(handle) = stage.insert(wire, crate::geometry::BoxRect::new(0.0, 0.0, 0.0, 0.0))
        {
            stage.set_marker(handle, marker::HANDLE, kind.name());
        }
    }

    Ok(ResizableBox::attach(stage, wire, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoxRect, GEOMETRY_EPS};
    use crate::handles::HandleSelection;
    use crate::input::{PointerEvent, PointerId};
    use kurbo::{Point, Size};

    fn setup() -> (Stage, NodeId, NodeId, NodeId) {
        let mut stage = Stage::new(Size::new(800.0, 600.0));
        let root = stage.root();
        let parent = stage.insert(root, BoxRect::new(0.0, 0.0, 600.0, 400.0)).unwrap();
        let a = stage.insert(parent, BoxRect::new(10.0, 20.0, 100.0, 80.0)).unwrap();
        let b = stage.insert(parent, BoxRect::new(200.0, 40.0, 120.0, 90.0)).unwrap();
        (stage, parent, a, b)
    }

    #[test]
    fn test_wireframe_copies_geometry_and_cross_links() {
        let (mut stage, parent, a, _) = setup();
        let mut mirror = WireframeMirror::new();

        let wires = mirror.create_wireframes(&mut stage, &[a]).unwrap();
        let wire = wires[0];

        assert!(stage.rect(wire).unwrap().approx_eq(&stage.rect(a).unwrap(), f64::EPSILON));
        assert_eq!(stage.marker(a, marker::WIRE_ID), Some(wire.to_string().as_str()));
        assert_eq!(stage.marker(wire, marker::TARGET_ID), Some(a.to_string().as_str()));
        assert!(stage.is_positioned(a));
        assert!(stage.is_positioned(wire));

        let layer = stage.parent(wire).unwrap();
        assert_eq!(stage.parent(layer), Some(parent));
        assert!(stage.has_marker(layer, marker::LAYER));
    }

    #[test]
    fn test_siblings_share_one_layer() {
        let (mut stage, parent, a, b) = setup();
        let mut mirror = WireframeMirror::new();

        let wires = mirror.create_wireframes(&mut stage, &[a, b]).unwrap();
        assert_eq!(stage.parent(wires[0]), stage.parent(wires[1]));

        let layers: Vec<NodeId> = stage
            .children(parent)
            .iter()
            .copied()
            .filter(|&child| stage.has_marker(child, marker::LAYER))
            .collect();
        assert_eq!(layers.len(), 1);
        assert_eq!(mirror.pair_count(), 2);
    }

    #[test]
    fn test_targets_under_different_parents_get_separate_layers() {
        let (mut stage, _, a, _) = setup();
        let root = stage.root();
        let other_parent = stage.insert(root, BoxRect::new(0.0, 0.0, 200.0, 200.0)).unwrap();
        let c = stage.insert(other_parent, BoxRect::new(5.0, 5.0, 50.0, 50.0)).unwrap();

        let mut mirror = WireframeMirror::new();
        let wires = mirror.create_wireframes(&mut stage, &[a, c]).unwrap();
        assert_ne!(stage.parent(wires[0]), stage.parent(wires[1]));
    }

    #[test]
    fn test_existing_pair_is_reused() {
        let (mut stage, _, a, _) = setup();
        let mut mirror = WireframeMirror::new();

        let first = mirror.create_wireframes(&mut stage, &[a]).unwrap();
        let second = mirror.create_wireframes(&mut stage, &[a]).unwrap();
        assert_eq!(first, second);
        assert_eq!(mirror.pair_count(), 1);
    }

    #[test]
    fn test_root_target_has_no_layer_host() {
        let mut stage = Stage::new(Size::new(800.0, 600.0));
        let root = stage.root();
        let mut mirror = WireframeMirror::new();

        assert!(matches!(
            mirror.create_wireframes(&mut stage, &[root]),
            Err(WireframeError::MissingParent(_))
        ));
    }

    #[test]
    fn test_sync_mirrors_both_directions() {
        let (mut stage, _, a, _) = setup();
        let mut mirror = WireframeMirror::new();
        let wire = mirror.create_wireframes(&mut stage, &[a]).unwrap()[0];

        stage.set_rect(wire, BoxRect::new(30.0, 40.0, 140.0, 70.0));
        mirror.sync(&mut stage);
        assert!(stage.rect(a).unwrap().approx_eq(&BoxRect::new(30.0, 40.0, 140.0, 70.0), GEOMETRY_EPS));
        assert_eq!(stage.pending_changes(), 0);

        stage.set_rect(a, BoxRect::new(1.0, 2.0, 90.0, 60.0));
        mirror.sync(&mut stage);
        assert!(stage.rect(wire).unwrap().approx_eq(&BoxRect::new(1.0, 2.0, 90.0, 60.0), GEOMETRY_EPS));
        assert_eq!(stage.pending_changes(), 0);
    }

    #[test]
    fn test_sync_terminates_on_batched_changes() {
        let (mut stage, _, a, _) = setup();
        let mut mirror = WireframeMirror::new();
        let wire = mirror.create_wireframes(&mut stage, &[a]).unwrap()[0];

        // Two writes queue two records for the wire before one sync round.
        stage.set_rect(wire, BoxRect::new(30.0, 40.0, 140.0, 70.0));
        stage.set_rect(wire, BoxRect::new(35.0, 45.0, 150.0, 75.0));
        assert_eq!(stage.pending_changes(), 2);

        mirror.sync(&mut stage);

        let expected = BoxRect::new(35.0, 45.0, 150.0, 75.0);
        assert!(stage.rect(a).unwrap().approx_eq(&expected, GEOMETRY_EPS));
        assert!(stage.rect(wire).unwrap().approx_eq(&expected, GEOMETRY_EPS));
        assert_eq!(stage.pending_changes(), 0);
    }

    #[test]
    fn test_sync_converges_when_both_sides_change() {
        let (mut stage, _, a, _) = setup();
        let mut mirror = WireframeMirror::new();
        let wire = mirror.create_wireframes(&mut stage, &[a]).unwrap()[0];

        stage.set_rect(wire, BoxRect::new(30.0, 40.0, 140.0, 70.0));
        stage.set_rect(a, BoxRect::new(1.0, 2.0, 90.0, 60.0));
        mirror.sync(&mut stage);

        // The earlier-queued write wins and both sides hold it.
        let expected = BoxRect::new(30.0, 40.0, 140.0, 70.0);
        assert!(stage.rect(wire).unwrap().approx_eq(&expected, GEOMETRY_EPS));
        assert!(stage.rect(a).unwrap().approx_eq(&expected, GEOMETRY_EPS));
        assert_eq!(stage.pending_changes(), 0);
    }

    #[test]
    fn test_missing_counterpart_tears_down_only_that_pair() {
        let (mut stage, _, a, b) = setup();
        let mut mirror = WireframeMirror::new();
        let wires = mirror.create_wireframes(&mut stage, &[a, b]).unwrap();

        stage.remove(a);
        stage.set_rect(wires[0], BoxRect::new(0.0, 0.0, 30.0, 30.0));
        stage.set_rect(wires[1], BoxRect::new(7.0, 8.0, 50.0, 40.0));
        mirror.sync(&mut stage);

        assert_eq!(mirror.pair_count(), 1);
        assert_eq!(mirror.target_of(wires[0]), None);
        assert!(!stage.has_marker(wires[0], marker::TARGET_ID));
        assert!(stage.rect(b).unwrap().approx_eq(&BoxRect::new(7.0, 8.0, 50.0, 40.0), GEOMETRY_EPS));
    }

    #[test]
    fn test_dispose_unwires_everything() {
        let (mut stage, _, a, b) = setup();
        let mut mirror = WireframeMirror::new();
        let wires = mirror.create_wireframes(&mut stage, &[a, b]).unwrap();

        mirror.dispose(&mut stage);
        assert_eq!(mirror.pair_count(), 0);
        assert!(!stage.has_marker(a, marker::WIRE_ID));
        assert!(!stage.has_marker(wires[0], marker::TARGET_ID));
        assert!(!stage.is_watched(a));
        assert!(!stage.is_watched(wires[0]));

        // Wireframe nodes survive, they just stop mirroring.
        assert!(stage.contains_node(wires[0]));
        stage.set_rect(wires[1], BoxRect::new(3.0, 3.0, 33.0, 33.0));
        mirror.sync(&mut stage);
        assert!(!stage.rect(b).unwrap().approx_eq(&BoxRect::new(3.0, 3.0, 33.0, 33.0), GEOMETRY_EPS));
    }

    #[test]
    fn test_make_wireframe_resizable_rejects_plain_nodes() {
        let (mut stage, _, a, _) = setup();
        let mirror = WireframeMirror::new();

        assert!(matches!(
            make_wireframe_resizable(&mut stage, &mirror, a, ResizeOptions::default()),
            Err(WireframeError::NotAWireframe(_))
        ));
    }

    #[test]
    fn test_invalid_options_leave_wireframe_untouched() {
        let (mut stage, _, a, _) = setup();
        let mut mirror = WireframeMirror::new();
        let wire = mirror.create_wireframes(&mut stage, &[a]).unwrap()[0];

        let options = ResizeOptions {
            min_width: 500.0,
            max_width: Some(100.0),
            ..Default::default()
        };
        assert!(matches!(
            make_wireframe_resizable(&mut stage, &mirror, wire, options),
            Err(WireframeError::Attach(AttachError::InvalidOptions(_)))
        ));

        // The rejected call must not have rebuilt handles or marked the wire.
        assert!(stage.children(wire).is_empty());
        assert!(!stage.has_marker(wire, marker::RESIZABLE));
    }

    #[test]
    fn test_make_wireframe_resizable_builds_handles() {
        let (mut stage, _, a, _) = setup();
        let mut mirror = WireframeMirror::new();
        let wire = mirror.create_wireframes(&mut stage, &[a]).unwrap()[0];

        let options = ResizeOptions {
            handles: HandleSelection::Corners,
            ..Default::default()
        };
        let rb = make_wireframe_resizable(&mut stage, &mirror, wire, options).unwrap();
        assert_eq!(rb.box_id(), wire);
        assert!(stage.has_marker(wire, marker::RESIZABLE));

        let handles: Vec<NodeId> = stage
            .children(wire)
            .iter()
            .copied()
            .filter(|&child| stage.has_marker(child, marker::HANDLE))
            .collect();
        assert_eq!(handles.len(), 4);
    }

    #[test]
    fn test_reattach_replaces_handles() {
        let (mut stage, _, a, _) = setup();
        let mut mirror = WireframeMirror::new();
        let wire = mirror.create_wireframes(&mut stage, &[a]).unwrap()[0];

        make_wireframe_resizable(&mut stage, &mirror, wire, ResizeOptions::default()).unwrap();
        let options = ResizeOptions {
            handles: HandleSelection::Sides,
            ..Default::default()
        };
        make_wireframe_resizable(&mut stage, &mirror, wire, options).unwrap();

        let handles: Vec<NodeId> = stage
            .children(wire)
            .iter()
            .copied()
            .filter(|&child| stage.has_marker(child, marker::HANDLE))
            .collect();
        assert_eq!(handles.len(), 4);
        for handle in handles {
            let name = stage.marker(handle, marker::HANDLE).unwrap();
            assert!(!name.contains('-'));
        }
    }

    #[test]
    fn test_gesture_on_wireframe_reaches_target() {
        let (mut stage, _, a, _) = setup();
        let mut mirror = WireframeMirror::new();
        let wire = mirror.create_wireframes(&mut stage, &[a]).unwrap()[0];
        let mut rb =
            make_wireframe_resizable(&mut stage, &mirror, wire, ResizeOptions::default()).unwrap();

        let handle = stage
            .children(wire)
            .iter()
            .copied()
            .find(|&child| stage.marker(child, marker::HANDLE) == Some("bottom-right"))
            .unwrap();

        rb.handle_event(
            &mut stage,
            &PointerEvent::Down {
                pointer: PointerId(1),
                position: Point::new(120.0, 90.0),
                target: handle,
            },
        );
        rb.handle_event(
            &mut stage,
            &PointerEvent::Move {
                pointer: PointerId(1),
                position: Point::new(160.0, 120.0),
            },
        );
        rb.handle_event(
            &mut stage,
            &PointerEvent::Up {
                pointer: PointerId(1),
                position: Point::new(160.0, 120.0),
            },
        );
        mirror.sync(&mut stage);

        let expected = BoxRect::new(10.0, 20.0, 140.0, 110.0);
        assert!(stage.rect(wire).unwrap().approx_eq(&expected, GEOMETRY_EPS));
        assert!(stage.rect(a).unwrap().approx_eq(&expected, GEOMETRY_EPS));
        assert_eq!(stage.pending_changes(), 0);
    }
}
