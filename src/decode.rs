//! Theme materializer: document model -> filesystem tree

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::fsio;
use crate::language::ScriptLanguage;
use crate::markup;
use crate::node::{Container, Leaf, Node, NodeSet};
use crate::theme::{
    Package, PayloadKind, FILE_CONTAINERS, LANGUAGE_ATTR, NAME_ATTR, PREVIEW_IMAGE_KEY,
    SCRIPTS_DIR, SCRIPT_KEYS, SINGLETON_FILES, THEME_OPTIONS_FILE,
};

/// Materialize a theme node into a directory tree
///
/// The output directory is created recursively; subdirectories are created
/// lazily, only when the corresponding child key is present. Same-named
/// files are overwritten, unrelated files are left alone, and lower-level
/// write failures propagate unchanged.
#[instrument(skip(theme))]
pub fn materialize(theme: &Node, out_dir: &Path) -> Result<()> {
    let container = theme.as_container().ok_or_else(|| {
        Error::codec(ErrorKind::NotAContainer {
            key: "theme".to_owned(),
        })
    })?;

    fsio::ensure_dir(out_dir)?;
    write_theme_options(container, out_dir)?;

    for key in SCRIPT_KEYS {
        if let Some(set) = container.children.get(key) {
            write_script(key, expect_single(set, key)?, out_dir)?;
        }
    }

    for (key, filename) in SINGLETON_FILES {
        if let Some(set) = container.children.get(key) {
            write_singleton(key, filename, expect_single(set, key)?, out_dir)?;
        }
    }

    if let Some(set) = container.children.get(PREVIEW_IMAGE_KEY) {
        write_preview_image(expect_single(set, PREVIEW_IMAGE_KEY)?, out_dir)?;
    }

    for (key, dir, kind) in FILE_CONTAINERS {
        if let Some(set) = container.children.get(key) {
            write_file_container(key, dir, kind, expect_single(set, key)?, out_dir)?;
        }
    }

    Ok(())
}

/// Materialize a resolved package: a single theme lands in `out_dir`
/// directly, a collection fans out into one subdirectory per theme
#[instrument(skip(package))]
pub fn materialize_package(package: &Package, out_dir: &Path) -> Result<()> {
    match package {
        Package::Theme(theme) => materialize(theme, out_dir),
        Package::Themes(themes) => {
            for (index, theme) in themes.iter().enumerate() {
                let dirname = directory_name_for(theme, index);
                debug!(theme = %dirname, "materializing collection member");
                materialize(theme, &out_dir.join(dirname))?;
            }
            Ok(())
        }
    }
}

fn write_theme_options(theme: &Container, out_dir: &Path) -> Result<()> {
    let metadata = serde_json::to_string_pretty(&theme.attributes)
        .map_err(|_| Error::codec(ErrorKind::InvalidMetadata))?;
    fsio::write_text(&out_dir.join(THEME_OPTIONS_FILE), &metadata)
}

fn write_script(key: &str, node: &Node, out_dir: &Path) -> Result<()> {
    let leaf = expect_leaf(node, key)?;
    let language = leaf
        .attributes
        .get_str(LANGUAGE_ATTR)
        .map_or(ScriptLanguage::Unknown, ScriptLanguage::from_tag);

    let scripts_dir = out_dir.join(SCRIPTS_DIR);
    fsio::ensure_dir(&scripts_dir)?;
    let path = scripts_dir.join(format!("{key}.{}", language.extension()));
    debug!(path = %path.display(), "writing script");
    fsio::write_text(&path, &leaf.payload)
}

fn write_singleton(key: &str, filename: &str, node: &Node, out_dir: &Path) -> Result<()> {
    let content = match node {
        Node::Leaf(leaf) => leaf.payload.clone(),
        // a full substructure is written by the same extraction rule,
        // serialized under its conventional element name
        Node::Container(_) => markup::serialize_node(key, node),
    };
    fsio::write_text(&out_dir.join(filename), &content)
}

fn write_preview_image(node: &Node, out_dir: &Path) -> Result<()> {
    let leaf = expect_leaf(node, PREVIEW_IMAGE_KEY)?;
    let name = required_name(leaf, PREVIEW_IMAGE_KEY)?;
    let bytes = decode_base64(&leaf.payload, name)?;

    let image_dir = out_dir.join(PREVIEW_IMAGE_KEY);
    fsio::ensure_dir(&image_dir)?;
    fsio::write_bytes(&image_dir.join(name), &bytes)
}

fn write_file_container(
    key: &str,
    dir: &str,
    kind: PayloadKind,
    node: &Node,
    out_dir: &Path,
) -> Result<()> {
    let container = node.as_container().ok_or_else(|| {
        Error::codec(ErrorKind::NotAContainer {
            key: key.to_owned(),
        })
    })?;

    let target = out_dir.join(dir);
    fsio::ensure_dir(&target)?;

    for child in container.children.nodes() {
        let leaf = expect_leaf(child, key)?;
        let name = required_name(leaf, key)?;
        match kind {
            PayloadKind::Binary => {
                let bytes = decode_base64(&leaf.payload, name)?;
                fsio::write_bytes(&target.join(name), &bytes)?;
            }
            PayloadKind::Text => {
                fsio::write_text(&target.join(name), &leaf.payload)?;
            }
        }
    }

    Ok(())
}

fn expect_single<'a>(set: &'a NodeSet, key: &str) -> Result<&'a Node> {
    set.single().ok_or_else(|| {
        Error::codec(ErrorKind::AmbiguousChild {
            key: key.to_owned(),
        })
    })
}

fn expect_leaf<'a>(node: &'a Node, key: &str) -> Result<&'a Leaf> {
    node.as_leaf().ok_or_else(|| {
        Error::codec(ErrorKind::MissingPayload {
            key: key.to_owned(),
        })
    })
}

/// The declared file name of a content leaf; rejects names that would
/// escape the target directory
fn required_name<'a>(leaf: &'a Leaf, key: &str) -> Result<&'a str> {
    let name = leaf.attributes.get_str(NAME_ATTR).ok_or_else(|| {
        Error::codec(ErrorKind::MissingAttribute {
            key: key.to_owned(),
            attribute: NAME_ATTR.to_owned(),
        })
    })?;

    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(Error::codec(ErrorKind::InvalidFileName {
            name: name.to_owned(),
        }));
    }

    Ok(name)
}

fn decode_base64(payload: &str, name: &str) -> Result<Vec<u8>> {
    let cleaned: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    BASE64_STANDARD.decode(cleaned.as_bytes()).map_err(|_| {
        Error::codec(ErrorKind::InvalidBase64 {
            name: name.to_owned(),
        })
    })
}

fn directory_name_for(theme: &Node, index: usize) -> String {
    theme
        .attributes()
        .get_str(NAME_ATTR)
        .map(|name| {
            name.chars()
                .filter(|c| !matches!(c, '/' | '\\') && !c.is_control())
                .collect::<String>()
        })
        .filter(|name| !name.trim().is_empty() && name != "." && name != "..")
        .unwrap_or_else(|| format!("theme-{index}"))
}
