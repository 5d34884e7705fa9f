//! XML adapter for the document model
//!
//! `parse` and `serialize` are the markup boundary of the crate: everything
//! else works on [`Node`] trees and never touches markup syntax. The two are
//! inverse up to insignificant whitespace and the one-vs-many sibling
//! normalization described in [`crate::node::NodeSet`].

pub mod parser;

pub use parser::Parser;

use crate::error::Result;
use crate::node::Node;

/// A parsed document: the root element name plus its node
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub name: String,
    pub node: Node,
}

/// Parse markup text into a document
pub fn parse(input: &str) -> Result<Document> {
    let mut parser = Parser::new(input.as_bytes());
    parser.parse()
}

/// Serialize a document back into markup text
pub fn serialize(document: &Document) -> String {
    serialize_node(&document.name, &document.node)
}

/// Serialize a single node under the given element name
pub fn serialize_node(name: &str, node: &Node) -> String {
    let mut output = String::new();
    write_node(name, node, &mut output);
    output
}

fn write_node(name: &str, node: &Node, output: &mut String) {
    output.push('<');
    output.push_str(name);

    for (key, value) in node.attributes() {
        output.push(' ');
        output.push_str(key);
        output.push_str("=\"");
        output.push_str(&escape(&value.to_string()));
        output.push('"');
    }

    match node {
        Node::Leaf(leaf) => {
            output.push('>');
            write_cdata(&leaf.payload, output);
        }
        Node::Container(container) => {
            if container.children.is_empty() {
                output.push_str("/>");
                return;
            }
            output.push('>');
            for (key, set) in &container.children {
                for child in set.iter() {
                    write_node(key, child, output);
                }
            }
        }
    }

    output.push_str("</");
    output.push_str(name);
    output.push('>');
}

/// Emit a payload as a CDATA section, splitting on embedded terminators
fn write_cdata(payload: &str, output: &mut String) {
    output.push_str("<![CDATA[");
    for (index, part) in payload.split("]]>").enumerate() {
        if index > 0 {
            output.push_str("]]]]><![CDATA[>");
        }
        output.push_str(part);
    }
    output.push_str("]]>");
}

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::node::{Attributes, Children, Node};

    fn script_leaf() -> Node {
        let mut attributes = Attributes::new();
        attributes.insert("language", "Velocity");
        Node::leaf(attributes, "$foo.bar()")
    }

    #[test]
    fn test_serialize_leaf() {
        let output = serialize_node("headScript", &script_leaf());
        assert_eq!(
            output,
            "<headScript language=\"Velocity\"><![CDATA[$foo.bar()]]></headScript>"
        );
    }

    #[test]
    fn test_serialize_empty_container_self_closes() {
        let node = Node::container(Attributes::new(), Children::new());
        assert_eq!(serialize_node("files", &node), "<files/>");
    }

    #[test]
    fn test_serialize_escapes_attribute_values() {
        let mut attributes = Attributes::new();
        attributes.insert("description", "'Social' <Blog> Theme");
        let node = Node::container(attributes, Children::new());
        let output = serialize_node("theme", &node);
        assert!(output.contains("&apos;Social&apos; &lt;Blog&gt; Theme"));
    }

    #[test]
    fn test_round_trip_preserves_node_shape() {
        let mut children = Children::new();
        children.append("headScript", script_leaf());
        children.append("file", script_leaf());
        children.append("file", script_leaf());
        let mut attributes = Attributes::new();
        attributes.insert("name", "Social");
        let document = Document {
            name: "theme".to_owned(),
            node: Node::container(attributes, children),
        };

        let reparsed = parse(&serialize(&document)).unwrap();
        assert_eq!(reparsed, document);
    }

    #[test]
    fn test_round_trip_payload_with_cdata_terminator() {
        let document = Document {
            name: "headScript".to_owned(),
            node: Node::leaf(Attributes::new(), "if (a ]]> b) {}"),
        };

        let serialized = serialize(&document);
        let reparsed = parse(&serialized).unwrap();
        assert_eq!(reparsed.node.payload(), Some("if (a ]]> b) {}"));
    }
}
