//! Element trees handed over by the export reader.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One element of a parsed configuration export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Tag as written, possibly `{uri}local` or `prefix:local`.
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<Element>,
}

/// Strip `{uri}` and `prefix:` qualification from a tag.
///
/// ```
/// use archgraph_core::metadata::local_name;
/// assert_eq!(local_name("{http://v8.1c.ru/8.3/MDClasses}Catalog"), "Catalog");
/// assert_eq!(local_name("xr:Item"), "Item");
/// ```
pub fn local_name(tag: &str) -> &str {
    let tag = match tag.rfind('}') {
        Some(end) => &tag[end + 1..],
        None => tag,
    };
    match tag.rfind(':') {
        Some(colon) => &tag[colon + 1..],
        None => tag,
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Leaf element `<tag>text</tag>`.
    pub fn leaf(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(tag).with_text(text)
    }

    pub fn local_name(&self) -> &str {
        local_name(&self.tag)
    }

    pub fn is(&self, name: &str) -> bool {
        self.local_name() == name
    }

    /// First child with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(name))
    }

    /// Children with the given local name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.is(name))
    }

    /// Own text, trimmed, if not blank.
    pub fn text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Text of the first child with the given local name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(Element::text)
    }

    /// Attribute by local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local_name(key) == name)
            .map(|(_, value)| value.as_str())
    }
}

/// One export document: a source label and its root element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub source: String,
    pub root: Element,
}

impl MetadataDocument {
    pub fn new(source: impl Into<String>, root: Element) -> Self {
        Self {
            source: source.into(),
            root,
        }
    }
}
