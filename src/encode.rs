//! Theme assembler: filesystem tree -> document model

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use tracing::{debug, instrument, warn};

use crate::error::{Error, ErrorKind, Result};
use crate::fsio;
use crate::language::ScriptLanguage;
use crate::node::{Attributes, Children, Node, NodeSet};
use crate::theme::{
    Package, PayloadKind, FILE_CONTAINERS, FILE_ELEMENT, LANGUAGE_ATTR, NAME_ATTR,
    PREVIEW_IMAGE_KEY, SCRIPTS_DIR, SCRIPT_KEYS, SINGLETON_FILES, THEME_OPTIONS_FILE,
};

/// Assemble a theme directory back into its document-model node
///
/// Key presence mirrors which on-disk artifacts exist: an absent file or
/// subdirectory yields an absent key, never an empty placeholder node.
#[instrument]
pub fn assemble(theme_dir: &Path) -> Result<Node> {
    let metadata = fsio::read_text(&theme_dir.join(THEME_OPTIONS_FILE))?;
    let attributes: Attributes = serde_json::from_str(&metadata).map_err(|e| {
        Error::with_message(
            ErrorKind::InvalidMetadata,
            crate::error::Span::empty(),
            format!("invalid theme metadata: {e}"),
        )
    })?;

    let mut children = Children::new();

    for key in SCRIPT_KEYS {
        if let Some(script) = read_script(theme_dir, key)? {
            children.insert(key, NodeSet::One(script));
        }
    }

    for (key, filename) in SINGLETON_FILES {
        let path = theme_dir.join(filename);
        if fsio::exists(&path) {
            let payload = fsio::read_text(&path)?;
            children.insert(key, NodeSet::One(Node::leaf(Attributes::new(), payload)));
        }
    }

    if let Some(image) = read_preview_image(theme_dir)? {
        children.insert(PREVIEW_IMAGE_KEY, NodeSet::One(image));
    }

    for (key, dir, kind) in FILE_CONTAINERS {
        if let Some(container) = read_file_container(theme_dir, dir, kind)? {
            children.insert(key, NodeSet::One(container));
        }
    }

    Ok(Node::container(attributes, children))
}

/// Resolve a root directory into a single theme or an ordered collection
///
/// A directory is a single theme iff it directly contains the metadata
/// file; otherwise each immediate subdirectory is probed independently and
/// entries without the metadata file are silently skipped.
#[instrument]
pub fn resolve(root: &Path) -> Result<Package> {
    if fsio::exists(&root.join(THEME_OPTIONS_FILE)) {
        return Ok(Package::Theme(assemble(root)?));
    }

    let mut themes = Vec::new();
    for name in fsio::list_entries(root)? {
        let dir = root.join(&name);
        if dir.is_dir() && fsio::exists(&dir.join(THEME_OPTIONS_FILE)) {
            themes.push(assemble(&dir)?);
        } else {
            debug!(entry = %name, "skipping non-theme entry");
        }
    }

    if themes.is_empty() {
        return Err(Error::codec(ErrorKind::EmptyPackage));
    }
    Ok(Package::Themes(themes))
}

/// Probe for a script file over the closed extension enumeration
fn read_script(theme_dir: &Path, key: &str) -> Result<Option<Node>> {
    for language in ScriptLanguage::ALL {
        let path = theme_dir
            .join(SCRIPTS_DIR)
            .join(format!("{key}.{}", language.extension()));
        if fsio::exists(&path) {
            let payload = fsio::read_text(&path)?;
            let mut attributes = Attributes::new();
            attributes.insert(LANGUAGE_ATTR, language.tag());
            return Ok(Some(Node::leaf(attributes, payload)));
        }
    }
    Ok(None)
}

fn read_preview_image(theme_dir: &Path) -> Result<Option<Node>> {
    let image_dir = theme_dir.join(PREVIEW_IMAGE_KEY);
    if !fsio::exists(&image_dir) {
        return Ok(None);
    }

    let mut entries = fsio::list_entries(&image_dir)?
        .into_iter()
        .filter(|name| image_dir.join(name).is_file());

    let Some(name) = entries.next() else {
        return Ok(None);
    };
    if entries.next().is_some() {
        warn!(dir = %image_dir.display(), "multiple preview images, keeping the first");
    }

    let bytes = fsio::read_bytes(&image_dir.join(&name))?;
    let mut attributes = Attributes::new();
    attributes.insert(NAME_ATTR, name);
    Ok(Some(Node::leaf(attributes, BASE64_STANDARD.encode(bytes))))
}

fn read_file_container(theme_dir: &Path, dir: &str, kind: PayloadKind) -> Result<Option<Node>> {
    let source = theme_dir.join(dir);
    if !fsio::exists(&source) {
        return Ok(None);
    }

    let mut entries = Vec::new();
    for name in fsio::list_entries(&source)? {
        let path = source.join(&name);
        if !path.is_file() {
            debug!(entry = %name, "skipping non-file container entry");
            continue;
        }

        let payload = match kind {
            PayloadKind::Binary => BASE64_STANDARD.encode(fsio::read_bytes(&path)?),
            PayloadKind::Text => fsio::read_text(&path)?,
        };
        let mut attributes = Attributes::new();
        attributes.insert(NAME_ATTR, name);
        entries.push(Node::leaf(attributes, payload));
    }

    let mut children = Children::new();
    if !entries.is_empty() {
        children.insert(FILE_ELEMENT, NodeSet::Many(entries));
    }
    Ok(Some(Node::container(Attributes::new(), children)))
}
