//! Line-oriented parsers for geom(8) output.
//!
//! Two output shapes are supported:
//!
//! - **Listing** (`geom <class> list`): blank-line separated record blocks
//!   with a head region and optional `Providers:` / `Consumers:` enumerated
//!   sub-blocks. See [`RecordExtractor`] and [`parse_list`].
//! - **Status** (`geom <class> status -s`): one `<device> <status>
//!   <components>` row per line. See [`parse_status`].
//!
//! # Architecture
//!
//! Every parser is a single forward pass over [`SourceLine`]s. Region
//! changes are driven by recognizing header lines and `<n>. ` entry
//! markers, so no text search or backtracking is involved. Field lines go
//! through [`split_key_value`], which normalizes labels to lowercase
//! snake-case keys.
//!
//! Both parsers recover from bad input by dropping only the affected
//! record, entry or status row and recording it in [`ParseDiagnostics`].

mod diagnostics;
mod error;
mod normalize;
mod records;
mod status;
mod subsection;

pub use diagnostics::ParseDiagnostics;
pub use error::{ParseError, RecordKind};
pub use normalize::{normalize_label, split_key_value};
pub use records::{RecordExtractor, parse_list, split_blocks};
pub use status::{StatusExtractor, parse_status, parse_status_line};
pub use subsection::{SubsectionExtractor, entry_marker, parse_subsection};

/// One line of captured output with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

impl<'a> SourceLine<'a> {
    pub fn new(number: usize, text: &'a str) -> Self {
        Self { number, text }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Numbers the lines of `text`. Both `\n` and `\r\n` endings are accepted.
pub fn to_source_lines(text: &str) -> Vec<SourceLine<'_>> {
    text.lines()
        .enumerate()
        .map(|(index, text)| SourceLine::new(index + 1, text))
        .collect()
}
