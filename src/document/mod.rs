//! # Document Module
//!
//! The page a [`PanelLoader`](crate::PanelLoader) works on is only reachable
//! through the [`Document`] trait. It covers the handful of tree operations the
//! loader performs: element creation, class and style mutation, insertion and
//! removal of nodes, selector lookups and image load status.
//!
//! [`MemoryDocument`] is the in-crate implementation. It keeps the whole tree in
//! memory, which makes it suitable both for tests and for rendering through the
//! [`view`](crate::view) components.

mod memory;
mod selector;

pub use memory::{MemoryDocument, NodeId};
pub use selector::Selector;

/// Load status of an image element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageStatus {
    /// Still fetching or decoding
    #[default]
    Pending,
    /// Fully loaded
    Loaded,
    /// Failed to load (broken source, decoding error, ...)
    Failed,
}

impl ImageStatus {
    /// An image is settled once it reached either completion state
    pub fn is_settled(self) -> bool {
        !matches!(self, ImageStatus::Pending)
    }
}

/// Abstract document tree capability.
///
/// Implementations are expected to be cheap handles over shared state (the same
/// way a browser element reference is), hence the `Clone` bound and the `&self`
/// receivers on mutating operations.
pub trait Document: Clone {
    /// Reference to a node of the tree
    type Node: Clone + PartialEq + core::fmt::Debug;

    /// Creates a detached element with the given tag name
    fn create_element(&self, tag: &str) -> Self::Node;
    /// Creates a detached text node
    fn create_text(&self, text: &str) -> Self::Node;

    /// First element of the whole document matching `selector`, in tree order
    fn query_selector(&self, selector: &str) -> Option<Self::Node>;
    /// First descendant of `root` matching `selector`, in tree order
    fn query_selector_within(&self, root: &Self::Node, selector: &str) -> Option<Self::Node>;
    /// Every descendant of `root` matching `selector`, in tree order
    fn query_selector_all_within(&self, root: &Self::Node, selector: &str) -> Vec<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    /// Element children of `node`, in order. Text nodes are not included.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;
    /// Appends `child` as the last child of `parent`, detaching it from its
    /// previous parent first
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
    /// Inserts `child` before every other child of `parent`, detaching it from
    /// its previous parent first
    fn prepend_child(&self, parent: &Self::Node, child: &Self::Node);
    /// Detaches `node` from its parent. No-op on a detached node.
    fn remove(&self, node: &Self::Node);

    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    fn set_style(&self, node: &Self::Node, property: &str, value: &str);
    fn style(&self, node: &Self::Node, property: &str) -> Option<String>;

    /// Concatenated text of `node` and all its descendants
    fn text_content(&self, node: &Self::Node) -> String;

    /// Load status of an image element. Non-image nodes report
    /// [`ImageStatus::Loaded`].
    fn image_status(&self, node: &Self::Node) -> ImageStatus;
}
