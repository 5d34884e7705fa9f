//! Theme entity layout conventions
//!
//! Single source of truth for the file and directory names a theme entity
//! maps to, shared by the materializer and the assembler.

use crate::error::{Error, ErrorKind, Result};
use crate::markup::Document;
use crate::node::{Attributes, Children, Node, NodeSet};

/// Metadata file; its presence is what marks a directory as a theme
pub const THEME_OPTIONS_FILE: &str = "theme_options.json";

/// Root element name of a single-theme document
pub const THEME_ROOT: &str = "theme";

/// Root element name of a collection document
pub const THEMES_ROOT: &str = "themes";

/// Subdirectory holding script payloads
pub const SCRIPTS_DIR: &str = "scripts";

/// Script child keys, each an optional leaf under the theme node
pub const SCRIPT_KEYS: [&str; 2] = ["headScript", "bodyScript"];

/// Attribute selecting a script's on-disk extension
pub const LANGUAGE_ATTR: &str = "language";

/// Attribute naming the on-disk file of a content leaf
pub const NAME_ATTR: &str = "name";

/// Child key and subdirectory of the preview image
pub const PREVIEW_IMAGE_KEY: &str = "previewImage";

/// Element name of entries inside repeated-file containers
pub const FILE_ELEMENT: &str = "file";

/// Singleton content nodes: child key to conventional filename
pub const SINGLETON_FILES: [(&str, &str); 3] = [
    ("configuration", "configuration.xml"),
    ("paletteTypes", "palette-types.xml"),
    ("languageResources", "language-resources.xml"),
];

/// How a repeated-file container's payloads are carried in the document
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    /// Verbatim text payload
    Text,
    /// Base64-encoded binary payload
    Binary,
}

/// Repeated-file containers: child key, subdirectory, payload encoding
pub const FILE_CONTAINERS: [(&str, &str, PayloadKind); 4] = [
    ("files", "files", PayloadKind::Binary),
    ("javascriptFiles", "js", PayloadKind::Text),
    ("styleFiles", "css", PayloadKind::Text),
    ("pageLayouts", "layouts", PayloadKind::Text),
];

/// A resolved theme package: one theme entity or an ordered collection
#[derive(Clone, Debug, PartialEq)]
pub enum Package {
    Theme(Node),
    Themes(Vec<Node>),
}

impl Package {
    /// Wraps the package into the document shape it serializes from
    pub fn into_document(self) -> Document {
        match self {
            Self::Theme(node) => Document {
                name: THEME_ROOT.to_owned(),
                node,
            },
            Self::Themes(nodes) => {
                let mut children = Children::new();
                children.insert(THEME_ROOT, NodeSet::Many(nodes));
                Document {
                    name: THEMES_ROOT.to_owned(),
                    node: Node::container(Attributes::new(), children),
                }
            }
        }
    }

    /// Reads the package shape back out of a parsed document; accepts both
    /// the single-theme and the collection root
    pub fn from_document(document: Document) -> Result<Self> {
        match document.name.as_str() {
            THEME_ROOT => Ok(Self::Theme(document.node)),
            THEMES_ROOT => {
                let themes = match document.node {
                    Node::Container(mut container) => container
                        .children
                        .remove(THEME_ROOT)
                        .map(NodeSet::into_vec)
                        .unwrap_or_default(),
                    Node::Leaf(_) => Vec::new(),
                };
                if themes.is_empty() {
                    return Err(Error::codec(ErrorKind::EmptyPackage));
                }
                Ok(Self::Themes(themes))
            }
            other => Err(Error::codec(ErrorKind::UnknownRoot {
                name: other.to_owned(),
            })),
        }
    }
}
