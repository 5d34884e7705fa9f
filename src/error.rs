//! Error types for themepack

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Position in markup source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in markup source
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidToken,
    UnterminatedMarkup,
    MismatchedTag { expected: String, found: String },
    DuplicateAttribute { name: String },
    InvalidEntity,
    InvalidUtf8,
    MixedContent { element: String },
    UnknownRoot { name: String },
    MissingPayload { key: String },
    MissingAttribute { key: String, attribute: String },
    AmbiguousChild { key: String },
    NotAContainer { key: String },
    InvalidBase64 { name: String },
    InvalidFileName { name: String },
    InvalidMetadata,
    EmptyPackage,
    Io(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidToken => write!(f, "invalid token"),
            Self::UnterminatedMarkup => write!(f, "unterminated markup"),
            Self::MismatchedTag { expected, found } => {
                write!(f, "mismatched closing tag: expected {expected}, found {found}")
            }
            Self::DuplicateAttribute { name } => write!(f, "duplicate attribute: {name}"),
            Self::InvalidEntity => write!(f, "invalid entity"),
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::MixedContent { element } => {
                write!(f, "element {element} mixes text and child elements")
            }
            Self::UnknownRoot { name } => write!(f, "unknown root element: {name}"),
            Self::MissingPayload { key } => write!(f, "node {key} carries no payload"),
            Self::MissingAttribute { key, attribute } => {
                write!(f, "node {key} is missing the {attribute} attribute")
            }
            Self::AmbiguousChild { key } => {
                write!(f, "expected a single {key} node, found several")
            }
            Self::NotAContainer { key } => write!(f, "node {key} is not a container"),
            Self::InvalidBase64 { name } => write!(f, "invalid base64 payload for {name}"),
            Self::InvalidFileName { name } => write!(f, "invalid file name: {name}"),
            Self::InvalidMetadata => write!(f, "invalid theme metadata"),
            Self::EmptyPackage => write!(f, "directory contains no themes"),
            Self::Io(message) => write!(f, "i/o error: {message}"),
        }
    }
}

/// Main error type for themepack
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Create an error with no markup position attached
    pub fn codec(kind: ErrorKind) -> Self {
        Self::new(kind, Span::empty())
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, offset: usize, line: u32, col: u32) -> Self {
        let pos = Pos::new(offset, line, col);
        Self::new(kind, Span::new(pos, pos))
    }

    /// Create an I/O error carrying the offending path
    pub fn io(path: &Path, source: &std::io::Error) -> Self {
        Self::with_message(
            ErrorKind::Io(source.to_string()),
            Span::empty(),
            format!("{}: {source}", path.display()),
        )
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span == Span::empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "error at {}: {}", self.span.start, self.message)
        }
    }
}

/// Result type alias for themepack
pub type Result<T> = std::result::Result<T, Error>;
