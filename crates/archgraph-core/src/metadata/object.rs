//! Extraction of one metadata object from its element tree.

use serde_json::{Map, Value};

use super::element::Element;
use super::mapping::node_kind_for_tag;
use crate::graph::{Node, NodeKind};

const CONTAINER_TAG: &str = "MetaDataObject";

/// The standard property set of one exported object.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataObject {
    /// Local root tag, e.g. `Catalog`.
    pub tag: String,
    pub kind: NodeKind,
    pub name: String,
    pub uuid: Option<String>,
    /// `(lang, text)` pairs in document order.
    pub synonyms: Vec<(String, String)>,
    pub comment: Option<String>,
    pub attributes: Vec<Value>,
    pub tabular_sections: Vec<Value>,
    pub forms: Vec<Value>,
    pub templates: Vec<Value>,
    pub commands: Vec<Value>,
    /// Names of objects this one contains, as written.
    pub content: Vec<String>,
}

impl MetadataObject {
    /// Extract the object from a document root.
    ///
    /// A `MetaDataObject` container is unwrapped when it holds exactly one
    /// object. The object must have a name.
    pub fn from_root(root: &Element) -> Result<Self, String> {
        let object = if root.is(CONTAINER_TAG) {
            match root.children.as_slice() {
                [only] => only,
                [] => return Err("metadata container holds no object".to_string()),
                many => {
                    return Err(format!(
                        "metadata container wraps {} objects, expected one",
                        many.len()
                    ))
                }
            }
        } else {
            root
        };

        let tag = object.local_name().to_string();
        let props = object.child("Properties").unwrap_or(object);
        let name = props
            .child_text("Name")
            .or_else(|| object.attribute("name"))
            .ok_or_else(|| format!("{tag} object has no Name"))?
            .to_string();

        Ok(Self {
            kind: node_kind_for_tag(&tag),
            name,
            uuid: object.attribute("uuid").map(str::to_string),
            synonyms: synonyms(props),
            comment: props.child_text("Comment").map(str::to_string),
            attributes: describe_all(&collection(object, "Attribute", "Attributes")),
            tabular_sections: collection(object, "TabularSection", "TabularSections")
                .into_iter()
                .map(describe_tabular_section)
                .collect(),
            forms: describe_all(&collection(object, "Form", "Forms")),
            templates: describe_all(&collection(object, "Template", "Templates")),
            commands: describe_all(&collection(object, "Command", "Commands")),
            content: content_refs(object, props, &tag),
            tag,
        })
    }

    /// `<Tag>.<Name>`, the form containment lists use.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.tag, self.name)
    }

    /// Natural key of the node. Generic objects keep their tag so that
    /// different unmapped tags with one name stay apart.
    pub fn natural_key(&self) -> String {
        match self.kind {
            NodeKind::MetadataObject => self.qualified_name(),
            _ => self.name.clone(),
        }
    }

    pub fn node_id(&self) -> String {
        self.kind.node_id(&self.natural_key())
    }

    /// First synonym, else the name.
    pub fn display_name(&self) -> &str {
        self.synonyms
            .first()
            .map(|(_, text)| text.as_str())
            .unwrap_or(&self.name)
    }

    pub fn to_node(&self, source: &str) -> Node {
        let mut node = Node::new(self.kind, &self.natural_key(), self.display_name())
            .with_label("metadata")
            .with_label(self.tag.clone())
            .with_prop("name", self.name.clone())
            .with_prop("qualified_name", self.qualified_name())
            .with_prop("source", source);

        if let Some(uuid) = &self.uuid {
            node = node.with_prop("uuid", uuid.clone());
        }
        for (lang, text) in &self.synonyms {
            node = node.with_prop(format!("synonym_{lang}"), text.clone());
        }
        if let Some(comment) = &self.comment {
            node = node.with_prop("comment", comment.clone());
        }

        node.with_prop("attributes", self.attributes.clone())
            .with_prop("tabular_sections", self.tabular_sections.clone())
            .with_prop("forms", self.forms.clone())
            .with_prop("templates", self.templates.clone())
            .with_prop("commands", self.commands.clone())
            .with_prop("content", self.content.clone())
    }
}

/// Items of a nested collection: `ChildObjects/<item>` first, then the
/// plural wrapper `<plural>/<item>`, then direct `<item>` children.
fn collection<'a>(object: &'a Element, item: &'a str, plural: &str) -> Vec<&'a Element> {
    if let Some(children) = object.child("ChildObjects") {
        let items: Vec<&Element> = children.children_named(item).collect();
        if !items.is_empty() {
            return items;
        }
    }
    if let Some(wrapper) = object.child(plural) {
        return wrapper.children_named(item).collect();
    }
    object.children_named(item).collect()
}

fn synonyms(props: &Element) -> Vec<(String, String)> {
    let Some(synonym) = props.child("Synonym") else {
        return Vec::new();
    };

    let items: Vec<(String, String)> = synonym
        .children_named("item")
        .filter_map(|item| {
            Some((
                item.child_text("lang")?.to_string(),
                item.child_text("content")?.to_string(),
            ))
        })
        .collect();

    if items.is_empty() {
        if let Some(text) = synonym.text() {
            let lang = synonym.attribute("lang").unwrap_or("default");
            return vec![(lang.to_string(), text.to_string())];
        }
    }
    items
}

/// Name of a nested item: `Properties/Name`, `Name`, a `name` attribute, or
/// the item's own text (`<Form>ItemForm</Form>`).
fn item_name(item: &Element) -> Option<&str> {
    item.child("Properties")
        .and_then(|p| p.child_text("Name"))
        .or_else(|| item.child_text("Name"))
        .or_else(|| item.attribute("name"))
        .or_else(|| item.text())
}

fn describe(item: &Element) -> Map<String, Value> {
    let props = item.child("Properties").unwrap_or(item);
    let mut bag = Map::new();

    if let Some(name) = item_name(item) {
        bag.insert("name".to_string(), name.into());
    }
    if let Some(uuid) = item.attribute("uuid") {
        bag.insert("uuid".to_string(), uuid.into());
    }
    for (lang, text) in synonyms(props) {
        bag.insert(format!("synonym_{lang}"), text.into());
    }
    if let Some(comment) = props.child_text("Comment") {
        bag.insert("comment".to_string(), comment.into());
    }
    if let Some(ty) = props.child("Type") {
        let types: Vec<Value> = ty
            .children_named("Type")
            .filter_map(Element::text)
            .map(Value::from)
            .collect();
        if !types.is_empty() {
            bag.insert("type".to_string(), Value::Array(types));
        } else if let Some(text) = ty.text() {
            bag.insert("type".to_string(), text.into());
        }
    }
    bag
}

fn describe_all(items: &[&Element]) -> Vec<Value> {
    items.iter().map(|item| Value::Object(describe(item))).collect()
}

fn describe_tabular_section(section: &Element) -> Value {
    let mut bag = describe(section);
    let attributes = describe_all(&collection(section, "Attribute", "Attributes"));
    bag.insert("attributes".to_string(), Value::Array(attributes));
    Value::Object(bag)
}

/// Containment references: `Properties/Content` items, and for subsystems
/// their nested `ChildObjects/Subsystem` entries. Deduplicated in order.
fn content_refs(object: &Element, props: &Element, tag: &str) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();

    if let Some(content) = props.child("Content").or_else(|| object.child("Content")) {
        refs.extend(content.children.iter().filter_map(Element::text).map(str::to_string));
    }

    if tag == "Subsystem" {
        if let Some(children) = object.child("ChildObjects") {
            refs.extend(
                children
                    .children_named("Subsystem")
                    .filter_map(item_name)
                    .map(|name| format!("Subsystem.{name}")),
            );
        }
    }

    let mut seen = std::collections::HashSet::new();
    refs.retain(|r| seen.insert(r.clone()));
    refs
}
