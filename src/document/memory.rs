use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use super::{selector::Selector, Document, ImageStatus};

/// Handle on a node of a [`MemoryDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, Default)]
struct ElementData {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    style: Vec<(String, String)>,
    attributes: BTreeMap<String, String>,
    image: ImageStatus,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<Node>,
    revision: u64,
}

const BODY: NodeId = NodeId(0);

impl Tree {
    fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Element(ElementData {
                    tag: "body".to_owned(),
                    ..Default::default()
                }),
                parent: None,
                children: vec![],
            }],
            revision: 0,
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: vec![],
        });
        self.revision += 1;
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id)?.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        let node = self.nodes.get_mut(id.0)?;
        match &mut node.kind {
            NodeKind::Element(data) => {
                self.revision += 1;
                Some(data)
            }
            NodeKind::Text(_) => None,
        }
    }

    /// `true` when `ancestor` is `node` or one of its ancestors
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.retain(|c| *c != id);
        }
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.parent = None;
        }
        self.revision += 1;
    }

    fn insert(&mut self, parent: NodeId, child: NodeId, first: bool) {
        if self.element(parent).is_none() || self.node(child).is_none() {
            log::warn!("insert ignored: {parent:?} cannot receive {child:?}");
            return;
        }
        if self.is_inclusive_ancestor(child, parent) {
            log::warn!("insert ignored: {child:?} is an ancestor of {parent:?}");
            return;
        }
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        if first {
            children.insert(0, child);
        } else {
            children.push(child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.revision += 1;
    }

    /// Descendants of `root` in tree order, `root` excluded
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = vec![];
        let mut stack: Vec<NodeId> = self
            .node(root)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.node(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        let compound_matches = |id: NodeId, compound: &super::selector::Compound| {
            self.element(id)
                .is_some_and(|e| compound.matches(&e.tag, e.id.as_deref(), &e.classes))
        };
        if !compound_matches(id, selector.subject()) {
            return false;
        }
        let mut current = self.node(id).and_then(|n| n.parent);
        'outer: for compound in selector.ancestors() {
            while let Some(ancestor) = current {
                current = self.node(ancestor).and_then(|n| n.parent);
                if compound_matches(ancestor, compound) {
                    continue 'outer;
                }
            }
            return false;
        }
        true
    }

    fn text_content(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(_) => {
                for child in &node.children {
                    self.text_content(*child, out);
                }
            }
        }
    }
}

/// In-memory element tree implementing [`Document`].
///
/// Cloning is cheap and every clone shares the same tree. Two documents compare
/// equal when they are clones of one another.
///
/// The tree is rooted at a `body` element. Nodes removed from the tree are
/// kept around detached, so handles stay valid and can be re-inserted.
///
/// # Examples
///
/// ```
/// use panel_loader::document::{Document, ImageStatus, MemoryDocument};
///
/// let doc = MemoryDocument::new();
/// let panel = doc.element(doc.body(), "section");
/// doc.set_id(panel, "gallery");
/// doc.image(panel, "cat.png", ImageStatus::Pending);
///
/// assert_eq!(doc.query_selector("#gallery"), Some(panel));
/// assert_eq!(doc.query_selector_all_within(&panel, "img").len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    tree: Rc<RefCell<Tree>>,
}

impl PartialEq for MemoryDocument {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree)
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            tree: Rc::new(RefCell::new(Tree::new())),
        }
    }

    /// The root element
    pub fn body(&self) -> NodeId {
        BODY
    }

    /// Counter bumped by every mutation, usable to detect changes
    pub fn revision(&self) -> u64 {
        self.tree.borrow().revision
    }

    /// Creates an element and appends it to `parent`
    pub fn element(&self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.create_element(tag);
        self.append_child(&parent, &node);
        node
    }

    /// Creates a text node and appends it to `parent`
    pub fn text(&self, parent: NodeId, text: &str) -> NodeId {
        let node = self.create_text(text);
        self.append_child(&parent, &node);
        node
    }

    /// Creates an `img` element with the given source and load status and
    /// appends it to `parent`
    pub fn image(&self, parent: NodeId, src: &str, status: ImageStatus) -> NodeId {
        let node = self.element(parent, "img");
        self.set_attribute(node, "src", src);
        self.set_image_status(node, status);
        node
    }

    pub fn set_id(&self, node: NodeId, id: &str) {
        if let Some(e) = self.tree.borrow_mut().element_mut(node) {
            e.id = Some(id.to_owned());
        }
    }

    pub fn id(&self, node: NodeId) -> Option<String> {
        self.tree.borrow().element(node).and_then(|e| e.id.clone())
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(e) = self.tree.borrow_mut().element_mut(node) {
            e.attributes.insert(name.to_owned(), value.to_owned());
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree
            .borrow()
            .element(node)
            .and_then(|e| e.attributes.get(name).cloned())
    }

    /// Updates the load status of an image, as a load or error event would
    pub fn set_image_status(&self, node: NodeId, status: ImageStatus) {
        if let Some(e) = self.tree.borrow_mut().element_mut(node) {
            e.image = status;
        }
    }

    /// Tag name of an element, `None` for text nodes
    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.tree.borrow().element(node).map(|e| e.tag.clone())
    }

    /// Value of a text node, `None` for elements
    pub fn text_value(&self, node: NodeId) -> Option<String> {
        match &self.tree.borrow().node(node)?.kind {
            NodeKind::Text(text) => Some(text.clone()),
            NodeKind::Element(_) => None,
        }
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.tree
            .borrow()
            .element(node)
            .map(|e| e.classes.clone())
            .unwrap_or_default()
    }

    /// Inline style serialized the way a `style` attribute reads,
    /// e.g. `opacity: 0; transition: opacity 600ms ease-in-out`
    pub fn style_attribute(&self, node: NodeId) -> String {
        self.tree
            .borrow()
            .element(node)
            .map(|e| {
                e.style
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .unwrap_or_default()
    }

    /// Every child of `node`, text nodes included
    pub fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.tree
            .borrow()
            .node(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// `true` when `node` is reachable from [`MemoryDocument::body`]
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.tree.borrow().is_inclusive_ancestor(BODY, node)
    }

    fn query(&self, root: NodeId, selector: &str, first_only: bool) -> Vec<NodeId> {
        let selector = match Selector::parse(selector) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("{e}");
                return vec![];
            }
        };
        let tree = self.tree.borrow();
        let mut matches = tree
            .descendants(root)
            .into_iter()
            .filter(|id| tree.matches(*id, &selector));
        if first_only {
            matches.next().into_iter().collect()
        } else {
            matches.collect()
        }
    }
}

impl Document for MemoryDocument {
    type Node = NodeId;

    fn create_element(&self, tag: &str) -> NodeId {
        self.tree
            .borrow_mut()
            .push(NodeKind::Element(ElementData {
                tag: tag.to_ascii_lowercase(),
                ..Default::default()
            }))
    }

    fn create_text(&self, text: &str) -> NodeId {
        self.tree.borrow_mut().push(NodeKind::Text(text.to_owned()))
    }

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query(BODY, selector, true).pop()
    }

    fn query_selector_within(&self, root: &NodeId, selector: &str) -> Option<NodeId> {
        self.query(*root, selector, true).pop()
    }

    fn query_selector_all_within(&self, root: &NodeId, selector: &str) -> Vec<NodeId> {
        self.query(*root, selector, false)
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.tree.borrow().node(*node).and_then(|n| n.parent)
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        tree.node(*node)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|c| tree.element(*c).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        self.tree.borrow_mut().insert(*parent, *child, false)
    }

    fn prepend_child(&self, parent: &NodeId, child: &NodeId) {
        self.tree.borrow_mut().insert(*parent, *child, true)
    }

    fn remove(&self, node: &NodeId) {
        self.tree.borrow_mut().detach(*node)
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        if let Some(e) = self.tree.borrow_mut().element_mut(*node) {
            if !e.classes.iter().any(|c| c == class) {
                e.classes.push(class.to_owned());
            }
        }
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        if let Some(e) = self.tree.borrow_mut().element_mut(*node) {
            e.classes.retain(|c| c != class);
        }
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.tree
            .borrow()
            .element(*node)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        if let Some(e) = self.tree.borrow_mut().element_mut(*node) {
            match e.style.iter_mut().find(|(k, _)| k == property) {
                Some((_, v)) => *v = value.to_owned(),
                None => e.style.push((property.to_owned(), value.to_owned())),
            }
        }
    }

    fn style(&self, node: &NodeId, property: &str) -> Option<String> {
        self.tree.borrow().element(*node).and_then(|e| {
            e.style
                .iter()
                .find(|(k, _)| k == property)
                .map(|(_, v)| v.clone())
        })
    }

    fn text_content(&self, node: &NodeId) -> String {
        let mut out = String::new();
        self.tree.borrow().text_content(*node, &mut out);
        out
    }

    fn image_status(&self, node: &NodeId) -> ImageStatus {
        match self.tree.borrow().element(*node) {
            Some(e) if e.tag == "img" => e.image,
            _ => ImageStatus::Loaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (MemoryDocument, NodeId, NodeId, NodeId) {
        let doc = MemoryDocument::new();
        let panel = doc.element(doc.body(), "div");
        doc.set_id(panel, "panel");
        doc.add_class(&panel, "panel");
        let title = doc.element(panel, "h2");
        doc.text(title, "Title");
        let img = doc.image(panel, "a.png", ImageStatus::Pending);
        (doc, panel, title, img)
    }

    #[test]
    fn test_query_selector() {
        let (doc, panel, title, img) = page();
        assert_eq!(doc.query_selector("#panel"), Some(panel));
        assert_eq!(doc.query_selector(".panel"), Some(panel));
        assert_eq!(doc.query_selector("div.panel h2"), Some(title));
        assert_eq!(doc.query_selector_within(&panel, "img"), Some(img));
        assert_eq!(doc.query_selector("#missing"), None);
        assert_eq!(doc.query_selector("div > h2"), None);
    }

    #[test]
    fn test_query_within_excludes_root() {
        let (doc, panel, _, _) = page();
        assert_eq!(doc.query_selector_within(&panel, "div"), None);
    }

    #[test]
    fn test_query_all_in_tree_order() {
        let (doc, panel, title, img) = page();
        let second = doc.image(title, "b.png", ImageStatus::Loaded);
        assert_eq!(
            doc.query_selector_all_within(&panel, "img"),
            vec![second, img]
        );
    }

    #[test]
    fn test_children_skip_text_nodes() {
        let (doc, panel, title, img) = page();
        doc.text(panel, "loose text");
        assert_eq!(doc.children(&panel), vec![title, img]);
        assert_eq!(doc.child_nodes(panel).len(), 3);
    }

    #[test]
    fn test_append_moves_node() {
        let (doc, panel, title, img) = page();
        let wrapper = doc.create_element("div");
        doc.append_child(&wrapper, &title);
        assert_eq!(doc.parent(&title), Some(wrapper));
        assert_eq!(doc.children(&panel), vec![img]);
        assert!(!doc.is_attached(title));

        doc.prepend_child(&panel, &wrapper);
        assert_eq!(doc.children(&panel), vec![wrapper, img]);
        assert!(doc.is_attached(title));
    }

    #[test]
    fn test_cycles_are_refused() {
        let (doc, panel, title, _) = page();
        doc.append_child(&title, &panel);
        assert_eq!(doc.parent(&panel), Some(doc.body()));
        doc.append_child(&panel, &panel);
        assert_eq!(doc.parent(&panel), Some(doc.body()));
    }

    #[test]
    fn test_remove() {
        let (doc, panel, title, _) = page();
        doc.remove(&title);
        assert_eq!(doc.parent(&title), None);
        assert!(!doc.children(&panel).contains(&title));
        doc.remove(&title);
    }

    #[test]
    fn test_classes_and_styles() {
        let (doc, panel, _, _) = page();
        doc.add_class(&panel, "loaded");
        doc.add_class(&panel, "loaded");
        assert_eq!(doc.classes(panel), vec!["panel", "loaded"]);
        doc.remove_class(&panel, "panel");
        assert!(!doc.has_class(&panel, "panel"));

        doc.set_style(&panel, "opacity", "0");
        doc.set_style(&panel, "transition", "opacity 600ms ease-in-out");
        doc.set_style(&panel, "opacity", "1");
        assert_eq!(doc.style(&panel, "opacity").as_deref(), Some("1"));
        assert_eq!(
            doc.style_attribute(panel),
            "opacity: 1; transition: opacity 600ms ease-in-out"
        );
    }

    #[test]
    fn test_text_content() {
        let (doc, panel, _, _) = page();
        let span = doc.element(panel, "span");
        doc.text(span, " and more");
        assert_eq!(doc.text_content(&panel), "Title and more");
    }

    #[test]
    fn test_image_status() {
        let (doc, panel, _, img) = page();
        assert_eq!(doc.image_status(&img), ImageStatus::Pending);
        doc.set_image_status(img, ImageStatus::Failed);
        assert!(doc.image_status(&img).is_settled());
        assert_eq!(doc.image_status(&panel), ImageStatus::Loaded);
    }

    #[test]
    fn test_revision_and_equality() {
        let (doc, panel, _, _) = page();
        let before = doc.revision();
        doc.add_class(&panel, "x");
        assert!(doc.revision() > before);
        assert_eq!(doc.clone(), doc);
        assert_ne!(doc, MemoryDocument::new());
    }

    #[test]
    fn test_foreign_handles_are_ignored() {
        let doc = MemoryDocument::new();
        let ghost = NodeId(42);
        doc.add_class(&ghost, "x");
        doc.append_child(&doc.body(), &ghost);
        assert!(doc.children(&doc.body()).is_empty());
        assert_eq!(doc.text_content(&ghost), "");
    }
}
