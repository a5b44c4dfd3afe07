//! Element tree with layout and hit testing
//!
//! The element tree is the headless stand-in for a rendered document. Every
//! element owns a Taffy layout node, an optional text, string classes used for
//! presentation state, an optional lookup key, and per-element event
//! handlers. After [`ElementTree::compute_layout`] the tree can answer two
//! questions the input layer needs:
//!
//! - which element is under a point ([`ElementTree::hit_test`]), and
//! - whether one element contains another ([`ElementTree::contains`]).
//!
//! Hidden elements (display `None`) and their descendants are never hit.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use taffy::prelude::{
    AvailableSpace, Dimension, Display, FlexDirection, Layout, NodeId, Size, Style, TaffyTree,
};

use crate::error::{Result, TreeError};
use crate::events::{Event, EventCallback, EventType};

new_key_type! {
    /// Identifier for an element in an [`ElementTree`]
    pub struct ElementId;
}

/// Absolute element bounds after layout
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    /// X position (absolute, after layout)
    pub x: f32,
    /// Y position (absolute, after layout)
    pub y: f32,
    /// Computed width
    pub width: f32,
    /// Computed height
    pub height: f32,
}

impl Bounds {
    /// Create new bounds
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn from_layout(layout: &Layout, parent_offset: (f32, f32)) -> Self {
        Self {
            x: parent_offset.0 + layout.location.x,
            y: parent_offset.1 + layout.location.y,
            width: layout.size.width,
            height: layout.size.height,
        }
    }

    /// Check if a point is inside the bounds
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// Center point
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Result of a hit test
#[derive(Clone, Debug)]
pub struct HitTestResult {
    /// The element that was hit (topmost in z-order)
    pub element: ElementId,
    /// Position relative to the element's bounds
    pub local_x: f32,
    pub local_y: f32,
    /// The chain from the root to the hit element, inclusive
    pub ancestors: Vec<ElementId>,
}

struct ElementNode {
    layout: NodeId,
    parent: Option<ElementId>,
    children: SmallVec<[ElementId; 4]>,
    tag: &'static str,
    key: Option<String>,
    text: Option<String>,
    classes: SmallVec<[&'static str; 4]>,
    handlers: SmallVec<[(EventType, EventCallback); 2]>,
}

/// A tree of elements backed by a Taffy layout tree
pub struct ElementTree {
    taffy: TaffyTree<()>,
    nodes: SlotMap<ElementId, ElementNode>,
    keys: FxHashMap<String, ElementId>,
    root: ElementId,
    viewport: (f32, f32),
    layout_dirty: bool,
}

impl ElementTree {
    /// Create a tree whose root fills a viewport and stacks children vertically
    pub fn new(viewport_width: f32, viewport_height: f32) -> Result<Self> {
        let mut taffy = TaffyTree::new();
        let root_layout = taffy.new_leaf(Self::root_style(viewport_width, viewport_height))?;

        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(ElementNode {
            layout: root_layout,
            parent: None,
            children: SmallVec::new(),
            tag: "root",
            key: None,
            text: None,
            classes: SmallVec::new(),
            handlers: SmallVec::new(),
        });

        Ok(Self {
            taffy,
            nodes,
            keys: FxHashMap::default(),
            root,
            viewport: (viewport_width, viewport_height),
            layout_dirty: true,
        })
    }

    fn root_style(width: f32, height: f32) -> Style {
        Style {
            display: Display::Flex,
            flex_direction: FlexDirection::Column,
            size: Size {
                width: Dimension::Length(width),
                height: Dimension::Length(height),
            },
            ..Default::default()
        }
    }

    /// The root element
    pub fn root(&self) -> ElementId {
        self.root
    }

    fn node(&self, id: ElementId) -> Result<&ElementNode> {
        self.nodes.get(id).ok_or(TreeError::UnknownElement(id))
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut ElementNode> {
        self.nodes.get_mut(id).ok_or(TreeError::UnknownElement(id))
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a detached element
    fn create_element(&mut self, tag: &'static str, style: Style) -> Result<ElementId> {
        let layout = self.taffy.new_leaf(style)?;
        Ok(self.nodes.insert(ElementNode {
            layout,
            parent: None,
            children: SmallVec::new(),
            tag,
            key: None,
            text: None,
            classes: SmallVec::new(),
            handlers: SmallVec::new(),
        }))
    }

    /// Append a detached element to a parent
    fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        let parent_layout = self.node(parent)?.layout;
        let child_layout = self.node(child)?.layout;
        self.taffy.add_child(parent_layout, child_layout)?;

        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        self.layout_dirty = true;
        Ok(())
    }

    /// Create an element and append it to a parent
    pub fn create_child(
        &mut self,
        parent: ElementId,
        tag: &'static str,
        style: Style,
    ) -> Result<ElementId> {
        let id = self.create_element(tag, style)?;
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Remove an element and all of its descendants
    pub fn remove_subtree(&mut self, id: ElementId) -> Result<()> {
        if id == self.root {
            return Err(TreeError::RootRemoval);
        }
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|c| *c != id);
            }
        }
        self.remove_recursive(id)?;
        self.layout_dirty = true;
        Ok(())
    }

    fn remove_recursive(&mut self, id: ElementId) -> Result<()> {
        let children = self.node(id)?.children.clone();
        for child in children {
            self.remove_recursive(child)?;
        }
        if let Some(node) = self.nodes.remove(id) {
            if let Some(key) = node.key {
                self.keys.remove(&key);
            }
            self.taffy.remove(node.layout)?;
        }
        Ok(())
    }

    // =========================================================================
    // Element properties
    // =========================================================================

    /// Replace an element's layout style
    pub fn set_style(&mut self, id: ElementId, style: Style) -> Result<()> {
        let layout = self.node(id)?.layout;
        self.taffy.set_style(layout, style)?;
        self.layout_dirty = true;
        Ok(())
    }

    /// Show or hide an element (display `Flex` / `None`)
    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> Result<()> {
        let layout = self.node(id)?.layout;
        let mut style = self.taffy.style(layout)?.clone();
        let display = if visible { Display::Flex } else { Display::None };
        if style.display != display {
            style.display = display;
            self.taffy.set_style(layout, style)?;
            self.layout_dirty = true;
        }
        Ok(())
    }

    /// Whether an element and all its ancestors are displayed
    pub fn is_visible(&self, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(element) = current {
            let Some(node) = self.nodes.get(element) else {
                return false;
            };
            if !self.is_displayed(node.layout) {
                return false;
            }
            current = node.parent;
        }
        true
    }

    fn is_displayed(&self, layout: NodeId) -> bool {
        self.taffy
            .style(layout)
            .map(|s| s.display != Display::None)
            .unwrap_or(false)
    }

    /// The tag an element was created with
    pub fn tag(&self, id: ElementId) -> Option<&'static str> {
        self.nodes.get(id).map(|n| n.tag)
    }

    /// Set the text content of an element
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.text = Some(text.into());
        Ok(())
    }

    /// Text content of an element
    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.nodes.get(id).and_then(|n| n.text.as_deref())
    }

    /// Assign a lookup key to an element, replacing any element that held it
    pub fn set_key(&mut self, id: ElementId, key: impl Into<String>) -> Result<()> {
        let key = key.into();
        if let Some(previous) = self.keys.insert(key.clone(), id) {
            if previous != id {
                if let Some(node) = self.nodes.get_mut(previous) {
                    node.key = None;
                }
            }
        }
        let old = self.node_mut(id)?.key.replace(key);
        if let Some(old) = old {
            if self.keys.get(&old) == Some(&id) {
                self.keys.remove(&old);
            }
        }
        Ok(())
    }

    /// Find an element by key
    pub fn find(&self, key: &str) -> Option<ElementId> {
        self.keys.get(key).copied()
    }

    /// Add or remove a presentation class
    pub fn set_class(&mut self, id: ElementId, class: &'static str, on: bool) -> Result<()> {
        let node = self.node_mut(id)?;
        let present = node.classes.contains(&class);
        if on && !present {
            node.classes.push(class);
        } else if !on && present {
            node.classes.retain(|c| *c != class);
        }
        Ok(())
    }

    /// Whether an element carries a class
    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.nodes
            .get(id)
            .map(|n| n.classes.iter().any(|c| *c == class))
            .unwrap_or(false)
    }

    /// Presentation classes of an element, in the order they were added
    pub fn classes(&self, id: ElementId) -> &[&'static str] {
        self.nodes
            .get(id)
            .map(|n| n.classes.as_slice())
            .unwrap_or(&[])
    }

    /// Attach an event handler to an element
    pub fn on<F>(&mut self, id: ElementId, event_type: EventType, handler: F) -> Result<()>
    where
        F: Fn(&Event) + 'static,
    {
        let handler: EventCallback = std::rc::Rc::new(handler);
        self.node_mut(id)?.handlers.push((event_type, handler));
        Ok(())
    }

    /// Handlers registered on an element for an event type
    pub fn handlers(&self, id: ElementId, event_type: EventType) -> SmallVec<[EventCallback; 2]> {
        self.nodes
            .get(id)
            .map(|n| {
                n.handlers
                    .iter()
                    .filter(|(t, _)| *t == event_type)
                    .map(|(_, h)| h.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    // =========================================================================
    // Structure queries
    // =========================================================================

    /// Whether the element exists
    pub fn contains_element(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Parent of an element
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Children of an element, in paint order
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.nodes
            .get(id)
            .map(|n| n.children.to_vec())
            .unwrap_or_default()
    }

    /// Path from the topmost ancestor down to the element, inclusive
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(element) = current {
            if !self.nodes.contains_key(element) {
                break;
            }
            path.push(element);
            current = self.parent(element);
        }
        path.reverse();
        path
    }

    /// Whether `node` is `ancestor` or one of its descendants
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(element) = current {
            if element == ancestor {
                return true;
            }
            current = self.parent(element);
        }
        false
    }

    /// Number of elements, including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only its root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Compute layout for the whole tree; a no-op when nothing changed since the last pass
    pub fn compute_layout(&mut self) -> Result<()> {
        if !self.layout_dirty {
            return Ok(());
        }
        let root_layout = self.node(self.root)?.layout;
        self.taffy.compute_layout(
            root_layout,
            Size {
                width: AvailableSpace::Definite(self.viewport.0),
                height: AvailableSpace::Definite(self.viewport.1),
            },
        )?;
        self.layout_dirty = false;
        Ok(())
    }

    /// Absolute bounds of an element from the last layout pass
    pub fn bounds(&self, id: ElementId) -> Option<Bounds> {
        let mut offset = (0.0, 0.0);
        let mut bounds = None;
        for element in self.ancestors(id) {
            let layout = self.taffy.layout(self.nodes.get(element)?.layout).ok()?;
            let b = Bounds::from_layout(layout, offset);
            offset = (b.x, b.y);
            bounds = Some(b);
        }
        bounds
    }

    // =========================================================================
    // Hit testing
    // =========================================================================

    /// Find the topmost visible element at a point
    pub fn hit_test(&self, x: f32, y: f32) -> Option<HitTestResult> {
        self.hit_test_node(self.root, x, y, (0.0, 0.0), Vec::new())
    }

    fn hit_test_node(
        &self,
        id: ElementId,
        x: f32,
        y: f32,
        parent_offset: (f32, f32),
        mut ancestors: Vec<ElementId>,
    ) -> Option<HitTestResult> {
        let node = self.nodes.get(id)?;
        if !self.is_displayed(node.layout) {
            return None;
        }
        let layout = self.taffy.layout(node.layout).ok()?;
        let bounds = Bounds::from_layout(layout, parent_offset);

        if !bounds.contains(x, y) {
            return None;
        }

        ancestors.push(id);

        // Last child is on top
        for &child in node.children.iter().rev() {
            if let Some(result) =
                self.hit_test_node(child, x, y, (bounds.x, bounds.y), ancestors.clone())
            {
                return Some(result);
            }
        }

        Some(HitTestResult {
            element: id,
            local_x: x - bounds.x,
            local_y: y - bounds.y,
            ancestors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(width: f32, height: f32) -> Style {
        Style {
            size: Size {
                width: Dimension::Length(width),
                height: Dimension::Length(height),
            },
            flex_shrink: 0.0,
            ..Default::default()
        }
    }

    fn column(width: f32) -> Style {
        Style {
            flex_direction: FlexDirection::Column,
            size: Size {
                width: Dimension::Length(width),
                height: Dimension::Auto,
            },
            flex_shrink: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_hit_test_basic() {
        let mut tree = ElementTree::new(400.0, 300.0).unwrap();
        let root = tree.root();
        let first = tree.create_child(root, "div", fixed(100.0, 100.0)).unwrap();
        let second = tree.create_child(root, "div", fixed(100.0, 100.0)).unwrap();
        tree.compute_layout().unwrap();

        let hit = tree.hit_test(50.0, 50.0).unwrap();
        assert_eq!(hit.element, first);
        assert_eq!(hit.ancestors, vec![root, first]);

        let hit = tree.hit_test(50.0, 150.0).unwrap();
        assert_eq!(hit.element, second);
        assert_eq!(hit.local_y, 50.0);

        // Inside the root but outside both children
        let hit = tree.hit_test(300.0, 250.0).unwrap();
        assert_eq!(hit.element, root);

        // Outside the viewport
        assert!(tree.hit_test(500.0, 500.0).is_none());
    }

    #[test]
    fn test_hidden_elements_are_not_hit() {
        let mut tree = ElementTree::new(400.0, 300.0).unwrap();
        let root = tree.root();
        let panel = tree.create_child(root, "panel", column(100.0)).unwrap();
        let row = tree.create_child(panel, "row", fixed(100.0, 40.0)).unwrap();
        tree.compute_layout().unwrap();

        assert_eq!(tree.hit_test(10.0, 10.0).unwrap().element, row);

        tree.set_visible(panel, false).unwrap();
        tree.compute_layout().unwrap();

        assert!(!tree.is_visible(row));
        assert_eq!(tree.hit_test(10.0, 10.0).unwrap().element, root);
    }

    #[test]
    fn test_bounds_are_absolute() {
        let mut tree = ElementTree::new(400.0, 300.0).unwrap();
        let root = tree.root();
        let _spacer = tree.create_child(root, "div", fixed(100.0, 50.0)).unwrap();
        let container = tree.create_child(root, "div", column(200.0)).unwrap();
        let _a = tree.create_child(container, "div", fixed(200.0, 40.0)).unwrap();
        let b = tree.create_child(container, "div", fixed(200.0, 40.0)).unwrap();
        tree.compute_layout().unwrap();

        assert_eq!(tree.bounds(b), Some(Bounds::new(0.0, 90.0, 200.0, 40.0)));
        assert_eq!(tree.bounds(container).map(|b| b.height), Some(80.0));
    }

    #[test]
    fn test_contains_and_ancestors() {
        let mut tree = ElementTree::new(100.0, 100.0).unwrap();
        let root = tree.root();
        let a = tree.create_child(root, "a", Style::default()).unwrap();
        let b = tree.create_child(a, "b", Style::default()).unwrap();
        let c = tree.create_child(root, "c", Style::default()).unwrap();

        assert!(tree.contains(a, b));
        assert!(tree.contains(a, a));
        assert!(!tree.contains(a, c));
        assert!(!tree.contains(b, a));
        assert_eq!(tree.ancestors(b), vec![root, a, b]);
    }

    #[test]
    fn test_remove_subtree() {
        let mut tree = ElementTree::new(100.0, 100.0).unwrap();
        let root = tree.root();
        let a = tree.create_child(root, "a", Style::default()).unwrap();
        let b = tree.create_child(a, "b", Style::default()).unwrap();
        tree.set_key(b, "inner").unwrap();
        assert_eq!(tree.len(), 3);

        tree.remove_subtree(a).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree.is_empty());
        assert!(!tree.contains_element(b));
        assert_eq!(tree.find("inner"), None);
        assert!(tree.children(root).is_empty());

        assert!(matches!(tree.remove_subtree(root), Err(TreeError::RootRemoval)));
        assert!(matches!(
            tree.remove_subtree(a),
            Err(TreeError::UnknownElement(_))
        ));
    }

    #[test]
    fn test_keys_classes_and_text() {
        let mut tree = ElementTree::new(100.0, 100.0).unwrap();
        let root = tree.root();
        let a = tree.create_child(root, "a", Style::default()).unwrap();
        let b = tree.create_child(root, "b", Style::default()).unwrap();

        tree.set_key(a, "thing").unwrap();
        assert_eq!(tree.find("thing"), Some(a));
        tree.set_key(b, "thing").unwrap();
        assert_eq!(tree.find("thing"), Some(b));

        tree.set_class(a, "selected", true).unwrap();
        tree.set_class(a, "open", true).unwrap();
        assert!(tree.has_class(a, "selected"));
        assert_eq!(tree.classes(a), &["selected", "open"]);
        tree.set_class(a, "open", false).unwrap();
        tree.set_class(a, "selected", false).unwrap();
        assert!(!tree.has_class(a, "selected"));

        tree.set_text(a, "Apple").unwrap();
        assert_eq!(tree.text(a), Some("Apple"));
        assert_eq!(tree.tag(b), Some("b"));
    }
}
