use crate::{config::LoaderType, document::Document};

/// CSS class names the host stylesheet is expected to style.
pub mod class {
    pub const LOADING_STATE: &str = "panel-loading-state";
    pub const CONTENT_WRAPPER: &str = "panel-content-wrapper";
    pub const LOADED: &str = "loaded";

    pub const LOADER_CONTAINER: &str = "panel-loader-container";
    pub const LOADER_SPINNER: &str = "panel-loader-spinner";
    pub const SPINNER_LEAF: &str = "panel-spinner-leaf";
    pub const LOADER_TEXT: &str = "panel-loader-text";
    pub const LOADER_DOTS: &str = "panel-loader-dots";
    pub const LOADER_DOT: &str = "panel-loader-dot";

    pub const SKELETON_LOADER: &str = "panel-skeleton-loader";
    pub const SKELETON_AVATAR: &str = "panel-skeleton-avatar";
    pub const SKELETON_BUBBLE: &str = "panel-skeleton-bubble";
    pub const SKELETON_LABEL: &str = "panel-skeleton-label";
}

const SPINNER_LEAVES: usize = 3;
const LOADER_DOTS: usize = 3;

fn element_with_class<D: Document>(document: &D, tag: &str, class: &str) -> D::Node {
    let node = document.create_element(tag);
    document.add_class(&node, class);
    node
}

/// Builds a detached placeholder of the requested style
pub fn build<D: Document>(document: &D, loader_type: LoaderType, loading_text: &str) -> D::Node {
    match loader_type {
        LoaderType::Spinner => spinner(document, loading_text),
        LoaderType::Skeleton => skeleton(document),
    }
}

/// Spinner placeholder: three animated leaves above the caption and three dots.
///
/// ```text
/// div.panel-loader-container
/// ├── div.panel-loader-spinner
/// │   └── div.panel-spinner-leaf (x3)
/// └── div.panel-loader-text
///     ├── "<loading_text>"
///     └── span.panel-loader-dots
///         └── span.panel-loader-dot (x3)
/// ```
pub fn spinner<D: Document>(document: &D, loading_text: &str) -> D::Node {
    let container = element_with_class(document, "div", class::LOADER_CONTAINER);

    let spinner = element_with_class(document, "div", class::LOADER_SPINNER);
    for _ in 0..SPINNER_LEAVES {
        let leaf = element_with_class(document, "div", class::SPINNER_LEAF);
        document.append_child(&spinner, &leaf);
    }

    let text = element_with_class(document, "div", class::LOADER_TEXT);
    let caption = document.create_text(loading_text);
    document.append_child(&text, &caption);
    let dots = element_with_class(document, "span", class::LOADER_DOTS);
    for _ in 0..LOADER_DOTS {
        let dot = element_with_class(document, "span", class::LOADER_DOT);
        document.append_child(&dots, &dot);
    }
    document.append_child(&text, &dots);

    document.append_child(&container, &spinner);
    document.append_child(&container, &text);
    container
}

/// Skeleton placeholder: avatar, bubble and label silhouettes
pub fn skeleton<D: Document>(document: &D) -> D::Node {
    let container = element_with_class(document, "div", class::SKELETON_LOADER);
    for part in [
        class::SKELETON_AVATAR,
        class::SKELETON_BUBBLE,
        class::SKELETON_LABEL,
    ] {
        let block = element_with_class(document, "div", part);
        document.append_child(&container, &block);
    }
    container
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;

    #[test]
    fn test_spinner_structure() {
        let doc = MemoryDocument::new();
        let node = spinner(&doc, "Loading cats");

        assert!(doc.has_class(&node, class::LOADER_CONTAINER));
        assert!(!doc.is_attached(node));
        assert_eq!(
            doc.query_selector_all_within(&node, ".panel-loader-spinner .panel-spinner-leaf")
                .len(),
            3
        );
        assert_eq!(
            doc.query_selector_all_within(&node, ".panel-loader-dots span.panel-loader-dot")
                .len(),
            3
        );
        let text = doc
            .query_selector_within(&node, ".panel-loader-text")
            .unwrap();
        assert!(doc.text_content(&text).contains("Loading cats"));
    }

    #[test]
    fn test_skeleton_structure() {
        let doc = MemoryDocument::new();
        let node = skeleton(&doc);

        assert!(doc.has_class(&node, class::SKELETON_LOADER));
        let children = doc.children(&node);
        assert_eq!(children.len(), 3);
        assert!(doc.has_class(&children[0], class::SKELETON_AVATAR));
        assert!(doc.has_class(&children[1], class::SKELETON_BUBBLE));
        assert!(doc.has_class(&children[2], class::SKELETON_LABEL));
        assert_eq!(doc.text_content(&node), "");
    }

    #[test]
    fn test_build_dispatches_on_type() {
        let doc = MemoryDocument::new();
        let s = build(&doc, LoaderType::Spinner, "x");
        let k = build(&doc, LoaderType::Skeleton, "x");
        assert!(doc.has_class(&s, class::LOADER_CONTAINER));
        assert!(doc.has_class(&k, class::SKELETON_LOADER));
    }
}
