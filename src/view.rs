use dioxus::prelude::*;

use crate::document::{MemoryDocument, NodeId};

/// Renders every child of the [`MemoryDocument`] root.
///
/// The document handle compares equal to itself across mutations, so the
/// `revision` prop (see [`MemoryDocument::revision`]) is what makes the view
/// re-render after the tree changed.
///
/// # Examples
///
/// ```rust,ignore
/// let tree = use_hook(MemoryDocument::new);
/// let revision = use_signal(|| tree.revision());
///
/// rsx! {
///     MemoryDocumentView { tree: tree.clone(), revision: revision() }
/// }
/// ```
#[component]
pub fn MemoryDocumentView(tree: MemoryDocument, revision: u64) -> Element {
    let children = tree.child_nodes(tree.body());
    rsx! {
        for child in children {
            MemoryNodeView {
                key: "{child:?}",
                tree: tree.clone(),
                node: child,
                revision,
            }
        }
    }
}

/// Renders one node of a [`MemoryDocument`] and its subtree
#[component]
pub fn MemoryNodeView(tree: MemoryDocument, node: NodeId, revision: u64) -> Element {
    if let Some(text) = tree.text_value(node) {
        return rsx! { "{text}" };
    }
    let Some(tag) = tree.tag(node) else {
        return rsx! {};
    };

    let id = tree.id(node);
    let class = tree.classes(node).join(" ");
    let style = tree.style_attribute(node);
    let child_nodes = tree.child_nodes(node);
    let children = rsx! {
        for child in child_nodes {
            MemoryNodeView {
                key: "{child:?}",
                tree: tree.clone(),
                node: child,
                revision,
            }
        }
    };

    match tag.as_str() {
        "img" => {
            let src = tree.attribute(node, "src").unwrap_or_default();
            let alt = tree.attribute(node, "alt").unwrap_or_default();
            rsx! {
                img { id, class, style, src, alt }
            }
        }
        "span" => rsx! {
            span { id, class, style, {children} }
        },
        "p" => rsx! {
            p { id, class, style, {children} }
        },
        "h2" => rsx! {
            h2 { id, class, style, {children} }
        },
        "section" => rsx! {
            section { id, class, style, {children} }
        },
        "aside" => rsx! {
            aside { id, class, style, {children} }
        },
        _ => rsx! {
            div { id, class, style, {children} }
        },
    }
}
