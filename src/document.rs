//! HTML fragment tree the filter rewrites in place.
//!
//! Nodes are `markup5ever_rcdom` handles: children are owned, parents are weak
//! back-references, so ancestor checks walk up without rescanning from the root.

use std::rc::{Rc, Weak};

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::TendrilSink;
use html5ever::{Attribute, LocalName, Namespace, ParseOpts, QualName, parse_fragment};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

use crate::error::Error;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

fn html_name(local: &str) -> QualName {
    QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(local))
}

fn parse_with_context(html: &str, context: QualName) -> Handle {
    let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new()).one(html);
    // Fragment parsing puts the parsed nodes under a synthetic <html> element.
    // Detach it first: dropping an rcdom node drains all of its descendants.
    let mut children = dom.document.children.take();
    if children.is_empty() {
        return dom.document.clone();
    }
    let container = children.remove(0);
    container.parent.set(None);
    container
}

/// A parsed HTML fragment.
pub struct Document {
    fragment: Handle,
}

impl Document {
    pub fn parse_fragment(html: &str) -> Self {
        Self {
            fragment: parse_with_context(html, html_name("body")),
        }
    }

    /// The single root container (the first `div`), if any.
    pub fn root(&self) -> Option<Handle> {
        find_element(&self.fragment, "div")
    }

    /// All text nodes, in document order.
    pub fn text_nodes(&self) -> Vec<Handle> {
        let mut nodes = Vec::new();
        collect_text_nodes(&self.fragment, &mut nodes);
        nodes
    }

    /// Replaces `node` with `html` parsed as markup in the context of its parent.
    ///
    /// Detached nodes are left alone.
    pub fn replace_with_html(&self, node: &Handle, html: &str) {
        let Some(parent) = parent_of(node) else {
            return;
        };
        let context = match element_name(&parent) {
            Some(name) if &*name.local != "html" => name.clone(),
            _ => html_name("body"),
        };
        let container = parse_with_context(html, context);
        let replacements = container.children.take();
        for child in &replacements {
            child.parent.set(Some(Rc::downgrade(&parent)));
        }

        let mut siblings = parent.children.borrow_mut();
        if let Some(index) = siblings.iter().position(|sibling| Rc::ptr_eq(sibling, node)) {
            siblings.splice(index..=index, replacements);
            node.parent.set(None);
        }
    }

    pub fn to_html(&self) -> Result<String, Error> {
        let mut buf = Vec::new();
        let handle = SerializableHandle::from(self.fragment.clone());
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };
        serialize(&mut buf, &handle, opts)?;
        Ok(String::from_utf8(buf)?)
    }
}

pub fn element_name(node: &Handle) -> Option<&QualName> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name),
        _ => None,
    }
}

pub fn parent_of(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(Weak::upgrade);
    node.parent.set(weak);
    parent
}

/// Whether any ancestor element of `node` has one of `tags` as its name.
pub fn has_ancestor(node: &Handle, tags: &[&str]) -> bool {
    let mut current = parent_of(node);
    while let Some(parent) = current {
        if let Some(name) = element_name(&parent)
            && tags.contains(&&*name.local)
        {
            return true;
        }
        current = parent_of(&parent);
    }
    false
}

/// The serialized (escaped) HTML of a text node; empty for anything else.
pub fn text_html(node: &Handle) -> String {
    match &node.data {
        NodeData::Text { contents } => html_escape::encode_text(&**contents.borrow()).into_owned(),
        _ => String::new(),
    }
}

/// Concatenated, unescaped text of every text node under `node`.
pub fn text_content(node: &Handle) -> String {
    let mut nodes = Vec::new();
    collect_text_nodes(node, &mut nodes);
    nodes
        .iter()
        .filter_map(|text| match &text.data {
            NodeData::Text { contents } => Some(contents.borrow().to_string()),
            _ => None,
        })
        .collect()
}

/// Adds `class` to the element's `class` attribute unless already present.
pub fn add_class(node: &Handle, class: &str) {
    let NodeData::Element { attrs, .. } = &node.data else {
        return;
    };
    let mut attrs = attrs.borrow_mut();
    match attrs.iter_mut().find(|attr| &*attr.name.local == "class") {
        Some(attr) => {
            if attr.value.split_whitespace().any(|existing| existing == class) {
                return;
            }
            let mut value = attr.value.to_string();
            if !value.trim().is_empty() {
                value.push(' ');
            }
            value.push_str(class);
            attr.value = value.into();
        }
        None => attrs.push(Attribute {
            name: QualName::new(None, Namespace::from(""), LocalName::from("class")),
            value: class.into(),
        }),
    }
}

fn collect_text_nodes(node: &Handle, out: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Text { .. } => out.push(child.clone()),
            NodeData::Element { .. } => collect_text_nodes(child, out),
            _ => {}
        }
    }
}

fn find_element(node: &Handle, local: &str) -> Option<Handle> {
    for child in node.children.borrow().iter() {
        if element_name(child).is_some_and(|name| &*name.local == local) {
            return Some(child.clone());
        }
        if let Some(found) = find_element(child, local) {
            return Some(found);
        }
    }
    None
}
