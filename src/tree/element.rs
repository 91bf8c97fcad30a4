//! Owned element tree for hierarchical records.
//!
//! Every document the pipeline touches (source datasets, merged, fused and gold documents) is an
//! `Element` tree. A tree is exclusively owned by its dataset; resolution replaces subtrees in
//! place instead of sharing nodes between records.

use crate::tree::path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One element node: a tag name, attributes, direct text and element children.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Leaf element holding `text`.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Concatenated text of this element and all its descendants, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
        }
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// All elements reached by following `path` from this element, in document order.
    ///
    /// Each step matches every child with that name, so `actors/actor` returns every actor
    /// under every `actors` child.
    pub fn select(&self, path: &str) -> Vec<&Element> {
        let mut current: Vec<&Element> = vec![self];
        for step in path::steps(path) {
            current = current
                .into_iter()
                .flat_map(|e| e.children.iter().filter(move |c| c.name == step))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// Text content of every element at `path`.
    pub fn values(&self, path: &str) -> Vec<String> {
        self.select(path).into_iter().map(Element::text_content).collect()
    }

    /// True when any element at `path` has non-empty text content.
    pub fn has_non_empty_value(&self, path: &str) -> bool {
        self.select(path)
            .into_iter()
            .any(|e| !e.text_content().is_empty())
    }

    /// Walk `path`, reusing the first existing child for each step and creating missing ones.
    pub fn ensure_path(&mut self, path: &str) -> &mut Element {
        let mut node = self;
        for step in path::steps(path) {
            let idx = match node.children.iter().position(|c| c.name == step) {
                Some(idx) => idx,
                None => {
                    node.children.push(Element::new(step));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[idx];
        }
        node
    }

    /// Replace the first element at `path` with `replacement`. Returns false when nothing matched.
    pub fn replace_first(&mut self, path: &str, replacement: Element) -> bool {
        let steps: Vec<&str> = path::steps(path).collect();
        Self::replace_in(self, &steps, replacement)
    }

    fn replace_in(node: &mut Element, steps: &[&str], replacement: Element) -> bool {
        match steps {
            [] => false,
            [last] => match node.children.iter_mut().find(|c| c.name == *last) {
                Some(slot) => {
                    *slot = replacement;
                    true
                }
                None => false,
            },
            [first, rest @ ..] => {
                for child in node.children.iter_mut().filter(|c| c.name == *first) {
                    if child.select(&rest.join("/")).is_empty() {
                        continue;
                    }
                    return Self::replace_in(child, rest, replacement);
                }
                false
            }
        }
    }

    /// Recursively collect leaf element paths carrying non-empty text, relative to this element.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_leaf_paths("", &mut out);
        out
    }

    fn collect_leaf_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for child in &self.children {
            let name = path::join(prefix, &child.name);
            if child.has_children() {
                child.collect_leaf_paths(&name, out);
            } else if !child.text.is_empty() {
                out.push(name);
            }
        }
    }
}
