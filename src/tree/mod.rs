//! Hierarchical record trees
//!
//! The element model every dataset is made of, path helpers to address attributes inside a
//! record, and the `TreeStore` seam through which documents are loaded and written.

pub mod element;
pub mod path;
pub mod store;

pub use element::Element;
pub use store::{JsonTreeStore, TreeStore};
