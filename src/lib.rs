//! themepack - a bidirectional codec between vendor theme XML packages and
//! on-disk theme directories
//!
//! A theme package is a single XML document describing one theme or a
//! collection of themes: metadata attributes, optional head/body scripts,
//! configuration documents, a base64-encoded preview image, and repeated
//! file collections. This crate maps that document to an equivalent
//! directory tree and back, losslessly:
//!
//! - **decode**: document model -> files on disk ([`decode::materialize`])
//! - **encode**: directory tree -> document model ([`encode::assemble`],
//!   [`encode::resolve`])
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> themepack::Result<()> {
//! use std::path::Path;
//!
//! // materialize a theme package into ./social-theme
//! themepack::decode_file(Path::new("theme.xml"), Path::new("social-theme"))?;
//!
//! // and assemble it back into markup
//! let xml = themepack::encode_dir(Path::new("social-theme"))?;
//! # let _ = xml;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use std::path::Path;

use tracing::{debug, instrument};

pub mod cursor;
pub mod decode;
pub mod encode;
pub mod error;
pub mod fsio;
pub mod language;
pub mod markup;
pub mod node;
pub mod theme;

pub use error::{Error, ErrorKind, Pos, Result, Span};
pub use language::ScriptLanguage;
pub use markup::Document;
pub use node::{Attributes, Children, Container, Leaf, Node, NodeSet, Scalar};
pub use theme::Package;

/// Decode a theme package document into a directory tree
///
/// Accepts both the single-theme and the collection root shape; a
/// collection fans out into one subdirectory per theme under `out_dir`.
#[instrument(skip(xml))]
pub fn decode_str(xml: &str, out_dir: &Path) -> Result<()> {
    let document = markup::parse(xml)?;
    debug!(root = %document.name, "parsed theme package");
    let package = Package::from_document(document)?;
    decode::materialize_package(&package, out_dir)
}

/// Decode a theme package file into a directory tree
#[instrument]
pub fn decode_file(path: &Path, out_dir: &Path) -> Result<()> {
    let xml = fsio::read_text(path)?;
    decode_str(&xml, out_dir)
}

/// Encode a theme directory (or a directory of theme directories) back
/// into theme package markup
#[instrument]
pub fn encode_dir(root: &Path) -> Result<String> {
    let package = encode::resolve(root)?;
    Ok(markup::serialize(&package.into_document()))
}
