//! XML tree used for form submissions.
//!
//! `XmlElement` is a small mutable tree; `to_xml` grows it from a JSON value
//! and `quick-xml` renders it with standard escaping.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

use kobo_core::error::{KoboError, KoboResult};

/// A mutable XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// First direct child with the given tag.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn add_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.push((name.into(), value.into()));
    }

    /// Append an empty child and return it for further population.
    pub fn add_child(&mut self, name: impl Into<String>) -> &mut XmlElement {
        self.children.push(XmlElement::new(name));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Append a child holding text content.
    pub fn add_text_child(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut XmlElement {
        let child = self.add_child(name);
        child.text = Some(text.into());
        child
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Render this element without an XML declaration.
    pub fn to_xml_string(&self) -> KoboResult<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)?;
        into_string(writer)
    }

    /// Render a full document: declaration followed by this element.
    pub fn to_document(&self) -> KoboResult<String> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;
        self.write_to(&mut writer)?;
        into_string(writer)
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> KoboResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.text.is_none() {
            return writer.write_event(Event::Empty(start)).map_err(xml_error);
        }

        writer.write_event(Event::Start(start)).map_err(xml_error)?;
        if let Some(text) = &self.text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(xml_error)?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(xml_error)
    }
}

fn into_string(writer: Writer<Vec<u8>>) -> KoboResult<String> {
    String::from_utf8(writer.into_inner()).map_err(xml_error)
}

fn xml_error<E: std::fmt::Display>(e: E) -> KoboError {
    KoboError::Serialization(format!("xml error: {e}"))
}

/// Append `data` to `root` as child elements.
///
/// Object keys become tags; array elements become `item0`, `item1`, ...
/// Scalars become text content. An empty object or array adds nothing.
pub fn to_xml(data: &Value, root: &mut XmlElement) {
    match data {
        Value::Object(map) => {
            for (key, value) in map {
                fill(value, root.add_child(key.as_str()));
            }
        }
        Value::Array(items) => {
            for (i, value) in items.iter().enumerate() {
                fill(value, root.add_child(format!("item{i}")));
            }
        }
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                root.set_text(text);
            }
        }
    }
}

fn fill(value: &Value, node: &mut XmlElement) {
    match value {
        Value::Object(_) | Value::Array(_) => to_xml(value, node),
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                node.set_text(text);
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(_) | Value::Array(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(data: Value) -> String {
        let mut root = XmlElement::new("root");
        to_xml(&data, &mut root);
        root.to_xml_string().unwrap()
    }

    #[test]
    fn test_nested_mapping() {
        assert_eq!(
            render(json!({"person": {"name": "John", "age": 30}})),
            "<root><person><name>John</name><age>30</age></person></root>"
        );
    }

    #[test]
    fn test_sequence_items() {
        assert_eq!(
            render(json!(["item1", "item2"])),
            "<root><item0>item1</item0><item1>item2</item1></root>"
        );
    }

    #[test]
    fn test_sequence_inside_mapping() {
        assert_eq!(
            render(json!({"tags": ["a", {"b": true}]})),
            "<root><tags><item0>a</item0><item1><b>true</b></item1></tags></root>"
        );
    }

    #[test]
    fn test_escapes_special_characters() {
        assert_eq!(
            render(json!({"name": "John & Jane"})),
            "<root><name>John &amp; Jane</name></root>"
        );
        assert_eq!(
            render(json!({"expr": "a < b > c"})),
            "<root><expr>a &lt; b &gt; c</expr></root>"
        );
    }

    #[test]
    fn test_empty_input_leaves_root_childless() {
        let mut root = XmlElement::new("root");
        to_xml(&json!({}), &mut root);
        assert!(root.children().is_empty());
        assert_eq!(root.to_xml_string().unwrap(), "<root/>");
    }

    #[test]
    fn test_null_and_empty_values() {
        assert_eq!(render(json!({"a": null, "b": {}})), "<root><a/><b/></root>");
    }

    #[test]
    fn test_attributes_and_document() {
        let mut root = XmlElement::new("aXyz");
        root.add_attribute("id", "aXyz");
        root.add_child("formhub").add_text_child("uuid", "abc");
        assert_eq!(root.child("formhub").unwrap().child("uuid").unwrap().text(), Some("abc"));
        let doc = root.to_document().unwrap();
        assert_eq!(
            doc,
            r#"<?xml version="1.0" encoding="UTF-8"?><aXyz id="aXyz"><formhub><uuid>abc</uuid></formhub></aXyz>"#
        );
    }
}
