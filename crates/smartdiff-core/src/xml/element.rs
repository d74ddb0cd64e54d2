use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SmartDiffError};

/// A parsed XML element reduced to what the differ compares.
///
/// `path` addresses the element from the root, e.g. `catalog.book[1].title[0]`,
/// where the index is the position among the parent's element children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlElement {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    /// Direct text content, concatenated and trimmed
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// A root element with no attributes, text or children.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            attributes: IndexMap::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Append a child, rewriting its path (and its descendants') under this element.
    pub fn with_child(mut self, mut child: XmlElement) -> Self {
        let index = self.children.len();
        child.rebase(&self.path, index);
        self.children.push(child);
        self
    }

    fn rebase(&mut self, parent_path: &str, index: usize) {
        self.path = child_path(parent_path, &self.name, index);
        let path = self.path.clone();
        for (i, child) in self.children.iter_mut().enumerate() {
            child.rebase(&path, i);
        }
    }

    /// Parse a document and return its root element.
    pub fn parse(xml: &str) -> Result<XmlElement> {
        let doc = roxmltree::Document::parse_with_options(
            xml,
            roxmltree::ParsingOptions {
                allow_dtd: true,
                ..Default::default()
            },
        )
        .map_err(|e| SmartDiffError::XmlParse {
            message: e.to_string(),
            location: format!("line {}", e.pos().row),
        })?;

        let root = doc.root_element();
        Ok(build_element(root, root.tag_name().name().to_string()))
    }

    /// Number of elements plus attributes in this subtree.
    pub fn unit_count(&self) -> usize {
        1 + self.attributes.len() + self.children.iter().map(XmlElement::unit_count).sum::<usize>()
    }
}

fn build_element(node: roxmltree::Node, path: String) -> XmlElement {
    let attributes = node
        .attributes()
        .map(|attr| (attribute_key(node, &attr), attr.value().to_string()))
        .collect();

    let text: String = node
        .children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect();

    let children = node
        .children()
        .filter(|child| child.is_element())
        .enumerate()
        .map(|(index, child)| {
            let child_path = child_path(&path, child.tag_name().name(), index);
            build_element(child, child_path)
        })
        .collect();

    XmlElement {
        name: node.tag_name().name().to_string(),
        path,
        attributes,
        text: text.trim().to_string(),
        children,
    }
}

/// `prefix:local` for namespaced attributes, so `x:id` and `id` stay distinct.
fn attribute_key(node: roxmltree::Node, attr: &roxmltree::Attribute) -> String {
    match attr.namespace() {
        None => attr.name().to_string(),
        Some(uri) => match node.lookup_prefix(uri) {
            Some(prefix) => format!("{}:{}", prefix, attr.name()),
            None => format!("{{{}}}{}", uri, attr.name()),
        },
    }
}

pub(crate) fn child_path(parent: &str, name: &str, index: usize) -> String {
    format!("{}.{}[{}]", parent, name, index)
}
