/// Error types for mesh ingestion and configuration
use std::fmt;

use thiserror::Error;

/// Which kind of line a field-count problem was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Vertex,
    TextureCoord,
    Face,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LineKind::Vertex => "Vertex",
            LineKind::TextureCoord => "Vertex Texture Coordinates",
            LineKind::Face => "Face",
        };
        f.write_str(name)
    }
}

/// What went wrong on a mesh source line
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("{kind} line with too few elements (expected {expected}, found {found})")]
    TooFewFields {
        kind: LineKind,
        expected: usize,
        found: usize,
    },

    #[error("{kind} line with too many elements (at most {max}, found {found})")]
    TooManyFields {
        kind: LineKind,
        max: usize,
        found: usize,
    },

    #[error("faces with {0} vertices are not supported, only triangles")]
    UnsupportedPolygon(usize),

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("unrecognized line format `{0}`")]
    UnrecognizedLine(String),

    #[error("vertex index {index} out of range (mesh has {vertex_count} vertices)")]
    IndexOutOfRange { index: i64, vertex_count: usize },
}

/// A fatal mesh parse error, located by source name and 1-based line number
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{name}, line {line}: {kind}")]
pub struct ParseError {
    pub name: String,
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(name: impl Into<String>, line: usize, kind: ParseErrorKind) -> Self {
        Self {
            name: name.into(),
            line,
            kind,
        }
    }
}

/// Failures of the one-time load phase
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read `{name}`: {source}")]
    Fetch {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("skybox geometry `{name}` must hold 6 quad faces: {reason}")]
    SkyboxShape { name: String, reason: String },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
