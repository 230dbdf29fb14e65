//! JSON ↔ XML structural conversion
//!
//! JSON documents are wrapped in a single `<root>` element; object keys
//! become child element names, arrays become repeated siblings, scalars
//! become text content. The reverse direction maps attributes to `@name`
//! entries, mixed content to `#text`, and collapses repeated child tags
//! into ordered lists.

use crate::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

fn xml_err(e: impl std::fmt::Display) -> Error {
    Error::Xml(e.to_string())
}

/// Convert a JSON document to a root-wrapped XML document.
pub fn json_to_xml(data: &[u8]) -> Result<Vec<u8>> {
    let value: Value = serde_json::from_slice(data)?;

    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;

    match &value {
        // A top-level array cannot become repeated roots; its elements
        // become repeated <item> children instead.
        Value::Array(items) => {
            writer
                .write_event(Event::Start(BytesStart::new("root")))
                .map_err(xml_err)?;
            for item in items {
                write_element(&mut writer, "item", item)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new("root")))
                .map_err(xml_err)?;
        }
        other => write_element(&mut writer, "root", other)?,
    }

    Ok(writer.into_inner())
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<()> {
    match value {
        Value::Null => writer
            .write_event(Event::Empty(BytesStart::new(name)))
            .map_err(xml_err)?,
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(xml_err)?;
            writer
                .write_event(Event::Text(BytesText::new(&scalar_text(value))))
                .map_err(xml_err)?;
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(xml_err)?;
        }
        Value::Array(items) => {
            // Repeated siblings under the same element name
            for item in items {
                write_element(writer, name, item)?;
            }
        }
        Value::Object(map) => {
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(xml_err)?;
            for (key, child) in map {
                write_element(writer, &sanitize_element_name(key), child)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(xml_err)?;
        }
    }
    Ok(())
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

/// Replace characters that are illegal in element names.
fn sanitize_element_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect();
    if out.is_empty() {
        out.push('_');
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, 'n');
    }
    out
}

#[derive(Debug, Default)]
struct XmlNode {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<XmlNode>,
}

/// Convert an XML document to JSON.
pub fn xml_to_json(data: &[u8]) -> Result<Vec<u8>> {
    let text = std::str::from_utf8(data).map_err(xml_err)?;
    let root = parse_document(text)?;
    let value = node_to_value(&root);
    Ok(serde_json::to_vec_pretty(&value)?)
}

fn parse_document(text: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                let mut node = XmlNode {
                    name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                    ..Default::default()
                };
                for attr in e.attributes() {
                    let attr = attr.map_err(xml_err)?;
                    node.attrs.push((
                        String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                        attr.unescape_value().map_err(xml_err)?.into_owned(),
                    ));
                }
                stack.push(node);
            }
            Event::Empty(e) => {
                let mut node = XmlNode {
                    name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                    ..Default::default()
                };
                for attr in e.attributes() {
                    let attr = attr.map_err(xml_err)?;
                    node.attrs.push((
                        String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                        attr.unescape_value().map_err(xml_err)?.into_owned(),
                    ));
                }
                attach(&mut stack, &mut root, node);
            }
            Event::Text(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&e.unescape().map_err(xml_err)?);
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| xml_err("unbalanced end tag"))?;
                attach(&mut stack, &mut root, node);
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctypes
            _ => {}
        }
    }

    root.ok_or_else(|| xml_err("document has no root element"))
}

fn attach(stack: &mut Vec<XmlNode>, root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

fn node_to_value(node: &XmlNode) -> Value {
    let text = node.text.trim();

    if node.children.is_empty() {
        if !text.is_empty() {
            return Value::String(text.to_string());
        }
        if !node.attrs.is_empty() {
            let mut map = Map::new();
            for (key, value) in &node.attrs {
                map.insert(format!("@{key}"), Value::String(value.clone()));
            }
            return Value::Object(map);
        }
        return Value::Null;
    }

    let mut map = Map::new();
    for (key, value) in &node.attrs {
        map.insert(format!("@{key}"), Value::String(value.clone()));
    }

    for child in &node.children {
        let value = node_to_value(child);
        match map.get_mut(&child.name) {
            // Third and later repetitions append
            Some(Value::Array(list)) => list.push(value),
            // First repetition converts the existing scalar into a list
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(child.name.clone(), value);
            }
        }
    }

    if !text.is_empty() {
        map.insert("#text".to_string(), Value::String(text.to_string()));
    }

    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_value(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn test_sanitize_element_names() {
        assert_eq!(sanitize_element_name("order id"), "order_id");
        assert_eq!(sanitize_element_name("order-id"), "order_id");
        assert_eq!(sanitize_element_name("1st"), "n1st");
        assert_eq!(sanitize_element_name("plain"), "plain");
    }

    #[test]
    fn test_json_to_xml_scalars_and_arrays() {
        let xml = json_to_xml(br#"{"a":1,"b":[1,2]}"#).unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains("<a>1</a>"));
        assert!(xml.contains("<b>1</b><b>2</b>"));
        assert!(xml.starts_with("<?xml"));
    }

    #[test]
    fn test_xml_leaf_with_text() {
        let value = to_value(&xml_to_json(b"<root><a>hello</a></root>").unwrap());
        assert_eq!(value, json!({"a": "hello"}));
    }

    #[test]
    fn test_xml_attributes_only_leaf() {
        let value = to_value(&xml_to_json(br#"<root><a id="7"/></root>"#).unwrap());
        assert_eq!(value, json!({"a": {"@id": "7"}}));
    }

    #[test]
    fn test_xml_repeated_tags_collapse_to_list() {
        let value =
            to_value(&xml_to_json(b"<root><x>1</x><x>2</x><x>3</x></root>").unwrap());
        assert_eq!(value, json!({"x": ["1", "2", "3"]}));
    }

    #[test]
    fn test_xml_mixed_content_gets_text_entry() {
        let value = to_value(&xml_to_json(b"<root>note<a>1</a></root>").unwrap());
        assert_eq!(value, json!({"a": "1", "#text": "note"}));
    }

    #[test]
    fn test_xml_attributes_merge_with_children() {
        let value =
            to_value(&xml_to_json(br#"<root kind="r"><a>1</a></root>"#).unwrap());
        assert_eq!(value, json!({"@kind": "r", "a": "1"}));
    }

    #[test]
    fn test_json_xml_json_preserves_leaf_pairs() {
        let input = json!({"a": {"b": 1}, "c": [1, 2], "d": "x"});
        let xml = json_to_xml(&serde_json::to_vec(&input).unwrap()).unwrap();
        let back = to_value(&xml_to_json(&xml).unwrap());
        assert_eq!(
            back,
            json!({"a": {"b": "1"}, "c": ["1", "2"], "d": "x"})
        );
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(xml_to_json(b"<root><a></root>").is_err());
    }
}
