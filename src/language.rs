//! Script language tags and their on-disk extensions
//!
//! The lookup is a closed enumeration: every tag resolves to a language and
//! every language owns exactly one extension, so extension resolution can
//! never fail.

/// Language of a theme script payload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptLanguage {
    Velocity,
    Unknown,
}

impl ScriptLanguage {
    /// Probe order used when looking for script files on disk
    pub const ALL: [Self; 2] = [Self::Velocity, Self::Unknown];

    /// Resolve a declared language tag; unrecognized tags (including the
    /// explicit "Unknown" sentinel) fall back to `Unknown`
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Velocity" => Self::Velocity,
            _ => Self::Unknown,
        }
    }

    /// Resolve a file extension back to a language; inverse of `extension`
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "vm" => Self::Velocity,
            _ => Self::Unknown,
        }
    }

    /// The file extension scripts of this language are written with
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Velocity => "vm",
            Self::Unknown => "txt",
        }
    }

    /// The canonical tag string declared in the document model
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Velocity => "Velocity",
            Self::Unknown => "Unknown",
        }
    }
}
