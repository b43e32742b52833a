//! # panel-loader
//!
//! Loading overlay for page panels. A [`PanelLoader`] hides the content of one
//! panel behind a spinner or skeleton placeholder while the images of that
//! content load, keeps the placeholder up for a minimum duration, then fades it
//! out and reveals the content.
//!
//! The page is reached through the [`Document`](document::Document) trait.
//! [`MemoryDocument`](document::MemoryDocument) implements it in memory and can
//! be rendered with the Dioxus components of the [`view`] module.
//!
//! ## Example
//!
//! ```
//! use panel_loader::prelude::*;
//!
//! let doc = MemoryDocument::new();
//! let panel = doc.element(doc.body(), "section");
//! doc.set_id(panel, "gallery");
//! doc.element(panel, "p");
//!
//! let loaders = PanelLoader::attach_to_multiple_panels(
//!     &doc,
//!     ["#gallery", "#missing"],
//!     LoaderOptions::default().with_loader_type(LoaderType::Skeleton),
//! );
//! assert_eq!(loaders.len(), 1);
//! ```

pub mod config;
pub mod document;
pub mod driver;
pub mod error;
pub mod loader;
pub mod placeholder;
pub mod view;

pub use config::{LoaderOptions, LoaderType};
pub use error::{Error, Result};
pub use loader::{LoaderState, PanelLoader};

/// Re-exports of the types needed to set up and drive a loader.
///
/// ```rust
/// use panel_loader::prelude::*;
/// ```
pub mod prelude {
    pub use super::config::{LoaderOptions, LoaderType};
    pub use super::document::{Document, ImageStatus, MemoryDocument, NodeId};
    pub use super::error::Error;
    pub use super::loader::{LoaderState, PanelLoader};
    pub use super::placeholder::class;
}
