//! Error types raised while parsing geom output.

use std::fmt;

use thiserror::Error;

/// What kind of record an [`ParseError::IncompleteRecord`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Geom,
    Provider,
    Consumer,
}

impl RecordKind {
    /// Attribute that names a record of this kind.
    pub fn name_key(self) -> &'static str {
        match self {
            Self::Geom => geomscan_core::GEOM_NAME_KEY,
            Self::Provider | Self::Consumer => geomscan_core::ITEM_NAME_KEY,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geom => write!(f, "geom"),
            Self::Provider => write!(f, "provider"),
            Self::Consumer => write!(f, "consumer"),
        }
    }
}

/// Parse failures. Line numbers are 1-based positions in the captured text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A head or sub-entry line has no `<label>: <value>` separator.
    #[error("line {line}: expected '<label>: <value>', found {text:?}")]
    MalformedLine { line: usize, text: String },

    /// A status line does not split into exactly three fields.
    #[error("line {line}: expected '<device> <status> <components>', found {fields} field(s) in {text:?}")]
    MalformedStatusLine {
        line: usize,
        text: String,
        fields: usize,
    },

    /// A record never produced its naming attribute.
    #[error("line {line}: {kind} record has no '{}' attribute", .kind.name_key())]
    IncompleteRecord { kind: RecordKind, line: usize },
}

impl ParseError {
    /// Line the error was raised at.
    pub fn line(&self) -> usize {
        match self {
            Self::MalformedLine { line, .. }
            | Self::MalformedStatusLine { line, .. }
            | Self::IncompleteRecord { line, .. } => *line,
        }
    }
}
