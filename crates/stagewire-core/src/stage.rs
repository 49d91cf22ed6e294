//! Positioned-node document substrate.
//!
//! A [`Stage`] is a tree of positioned boxes with dataset-style marker
//! attributes and a recording surface for style mutations. It is what
//! the gesture controller writes geometry onto and what the mirror
//! observes.

use crate::geometry::{BoxRect, GEOMETRY_EPS};
use kurbo::{Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;
use uuid::Uuid;

/// Marker attribute names used by the gesture and mirroring layers.
pub mod marker {
    /// Set on a box while a gesture moves or resizes it.
    pub const DRAGGING: &str = "dragging";
    /// Set on the container while one of its boxes has an active gesture.
    pub const DRAGGING_WITHIN: &str = "dragging-within";
    /// Compass direction of a handle node.
    pub const HANDLE: &str = "handle";
    /// Set on a box once resize behavior is attached.
    pub const RESIZABLE: &str = "resizable";
    /// Id of the bounding container chosen for a resizable box.
    pub const CONTAINER: &str = "container";
    /// Present when the aspect ratio is locked.
    pub const ASPECT_LOCKED: &str = "aspect-locked";
    /// Present when the container-edge pre-clamp is disabled.
    pub const INVERT_ON_EDGE: &str = "invert-on-edge";
    /// Present when body drags are disabled.
    pub const NON_DRAGGABLE: &str = "non-draggable";
    /// On a mirrored target: id of its wireframe proxy.
    pub const WIRE_ID: &str = "wire-id";
    /// On a wireframe proxy: id of its mirrored target.
    pub const TARGET_ID: &str = "target-id";
    /// Present on wireframe layer nodes.
    pub const LAYER: &str = "layer";
}

/// Unique identifier of a stage node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id from its marker string form.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A recorded style mutation on a watched node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleChange {
    /// Node whose styling changed.
    pub node: NodeId,
    /// The styling after the change.
    pub rect: BoxRect,
}

/// A positioned node.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rect: BoxRect,
    positioned: bool,
    markers: BTreeMap<String, String>,
}

/// Tree of positioned boxes with style-change observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    root: NodeId,
    nodes: HashMap<NodeId, Node>,
    /// Nodes whose style writes are recorded.
    #[serde(skip)]
    watched: HashSet<NodeId>,
    /// Recorded style changes, oldest first.
    #[serde(skip)]
    pending: VecDeque<StyleChange>,
}

impl Stage {
    /// Create a stage whose root spans the given size.
    pub fn new(size: Size) -> Self {
        let root = NodeId::new();
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                parent: None,
                children: Vec::new(),
                rect: BoxRect::new(0.0, 0.0, size.width, size.height),
                positioned: true,
                markers: BTreeMap::new(),
            },
        );
        Self {
            root,
            nodes,
            watched: HashSet::new(),
            pending: VecDeque::new(),
        }
    }

    /// The root node, serving as the default bounding container.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether a node exists.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Insert a node under `parent`. Returns `None` if the parent is unknown.
    pub fn insert(&mut self, parent: NodeId, rect: BoxRect) -> Option<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return None;
        }
        let id = NodeId::new();
        self.nodes.insert(
            id,
            Node {
                parent: Some(parent),
                children: Vec::new(),
                rect,
                positioned: false,
                markers: BTreeMap::new(),
            },
        );
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        Some(id)
    }

    /// Remove a node and its whole subtree. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root {
            return false;
        }
        let Some(node) = self.nodes.remove(&id) else {
            return false;
        };
        if let Some(parent) = node.parent {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.retain(|&c| c != id);
            }
        }
        self.watched.remove(&id);
        let mut stack = node.children;
        while let Some(current) = stack.pop() {
            if let Some(n) = self.nodes.remove(&current) {
                stack.extend(n.children);
            }
            self.watched.remove(&current);
        }
        true
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Children of a node, in insertion order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Current box styling of a node.
    pub fn rect(&self, id: NodeId) -> Option<BoxRect> {
        self.nodes.get(&id).map(|n| n.rect)
    }

    /// Write box styling.
    ///
    /// Writes equal (within the geometry tolerance) to the current value
    /// are elided and record no change. Returns whether styling changed.
    pub fn set_rect(&mut self, id: NodeId, rect: BoxRect) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        if node.rect.approx_eq(&rect, GEOMETRY_EPS) {
            return false;
        }
        node.rect = rect;
        if self.watched.contains(&id) {
            self.pending.push_back(StyleChange { node: id, rect });
        }
        true
    }

    /// Mark a node as explicitly positioned.
    pub fn ensure_positioned(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.positioned = true;
        }
    }

    /// Whether a node is explicitly positioned.
    pub fn is_positioned(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.positioned)
    }

    /// Bounding rectangle of a node in document coordinates.
    pub fn document_rect(&self, id: NodeId) -> Option<Rect> {
        let node = self.nodes.get(&id)?;
        let mut origin = Vec2::new(node.rect.left, node.rect.top);
        let mut current = node.parent;
        while let Some(pid) = current {
            let parent = self.nodes.get(&pid)?;
            origin.x += parent.rect.left;
            origin.y += parent.rect.top;
            current = parent.parent;
        }
        Some(Rect::new(
            origin.x,
            origin.y,
            origin.x + node.rect.width,
            origin.y + node.rect.height,
        ))
    }

    /// Whether `ancestor` contains `node`. A node contains itself.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Read a marker attribute.
    pub fn marker(&self, id: NodeId, key: &str) -> Option<&str> {
        self.nodes.get(&id).and_then(|n| n.markers.get(key)).map(String::as_str)
    }

    /// Write a marker attribute.
    pub fn set_marker(&mut self, id: NodeId, key: &str, value: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.markers.insert(key.to_string(), value.into());
        }
    }

    /// Remove a marker attribute.
    pub fn remove_marker(&mut self, id: NodeId, key: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.markers.remove(key);
        }
    }

    /// Whether a marker is present.
    pub fn has_marker(&self, id: NodeId, key: &str) -> bool {
        self.marker(id, key).is_some()
    }

    /// Start recording style changes for a node.
    pub fn watch(&mut self, id: NodeId) {
        if self.nodes.contains_key(&id) {
            self.watched.insert(id);
        }
    }

    /// Stop recording style changes for a node.
    pub fn unwatch(&mut self, id: NodeId) {
        self.watched.remove(&id);
    }

    /// Whether a node is watched.
    pub fn is_watched(&self, id: NodeId) -> bool {
        self.watched.contains(&id)
    }

    /// Take the oldest recorded style change, if any.
    pub fn take_change(&mut self) -> Option<StyleChange> {
        self.pending.pop_front()
    }

    /// Number of recorded style changes not yet taken.
    pub fn pending_changes(&self) -> usize {
        self.pending.len()
    }
}
