//! Enumerated `Providers:` / `Consumers:` sub-block parsing.
//!
//! A sub-block is a numbered list. Each entry starts at a `<n>. ` marker
//! and runs until the next marker or the end of the block:
//!
//! ```text
//! 1. Name: vtbd0p1
//!    Mediasize: 524288 (512K)
//!    Mode: r0w0e0
//! 2. Name: vtbd0p2
//!    Mediasize: 2147483648 (2.0G)
//! ```

use geomscan_core::{AttributeMap, GeomItem, ItemMap};
use tracing::debug;

use super::normalize::split_key_value;
use super::{ParseDiagnostics, ParseError, RecordKind, SourceLine, to_source_lines};

/// Returns the remainder of `line` after a leading `<digits>.<whitespace>`
/// entry marker, or `None` when the line does not start an entry.
///
/// # Examples
///
/// ```
/// use geomscan_discovery::parser::entry_marker;
///
/// assert_eq!(entry_marker("12. Name: ada0p12"), Some("Name: ada0p12"));
/// assert_eq!(entry_marker("   Mode: r0w0e0"), None);
/// assert_eq!(entry_marker("1.5: odd"), None);
/// ```
pub fn entry_marker(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = trimmed[digits..].strip_prefix('.')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim_start())
}

/// Parses a standalone sub-block of `kind` entries into name → entry,
/// discarding diagnostics. Use [`SubsectionExtractor`] to keep them.
///
/// # Examples
///
/// ```
/// use geomscan_discovery::parser::{RecordKind, parse_subsection};
///
/// let consumers = parse_subsection(RecordKind::Consumer, "1. Name: ada1\n   Mode: r1w1e1\n");
/// assert_eq!(consumers["ada1"].get("mode"), Some("r1w1e1"));
/// ```
pub fn parse_subsection(kind: RecordKind, section: &str) -> ItemMap {
    let lines = to_source_lines(section);
    let mut diagnostics = ParseDiagnostics::default();
    SubsectionExtractor::new(kind, &lines).extract(&mut diagnostics)
}

/// Line scanner over one sub-block.
pub struct SubsectionExtractor<'a> {
    kind: RecordKind,
    lines: &'a [SourceLine<'a>],
}

/// Entry being accumulated between two markers.
struct PendingEntry {
    first_line: usize,
    attributes: AttributeMap,
    malformed: Option<ParseError>,
}

impl PendingEntry {
    fn new(first_line: usize) -> Self {
        Self {
            first_line,
            attributes: AttributeMap::new(),
            malformed: None,
        }
    }

    fn push(&mut self, line: &SourceLine<'_>) {
        if self.malformed.is_some() {
            return;
        }
        match split_key_value(line) {
            Ok((key, value)) => {
                self.attributes.insert(key, value);
            }
            Err(err) => self.malformed = Some(err),
        }
    }
}

impl<'a> SubsectionExtractor<'a> {
    pub fn new(kind: RecordKind, lines: &'a [SourceLine<'a>]) -> Self {
        Self { kind, lines }
    }

    /// Scans the sub-block once. Entries with a malformed line or without a
    /// `name` are left out and recorded in `diagnostics`.
    pub fn extract(&self, diagnostics: &mut ParseDiagnostics) -> ItemMap {
        let mut items = ItemMap::new();
        let mut pending: Option<PendingEntry> = None;

        for line in self.lines {
            if line.is_blank() {
                continue;
            }

            if let Some(rest) = entry_marker(line.text) {
                if let Some(entry) = pending.take() {
                    self.commit(entry, &mut items, diagnostics);
                }
                let mut entry = PendingEntry::new(line.number);
                entry.push(&SourceLine::new(line.number, rest));
                pending = Some(entry);
                continue;
            }

            match pending.as_mut() {
                Some(entry) => entry.push(line),
                None => {
                    debug!(line = line.number, text = line.text, "Line before first entry marker");
                    diagnostics.ignored_lines.push(line.number);
                }
            }
        }

        if let Some(entry) = pending.take() {
            self.commit(entry, &mut items, diagnostics);
        }

        items
    }

    fn commit(&self, entry: PendingEntry, items: &mut ItemMap, diagnostics: &mut ParseDiagnostics) {
        if let Some(err) = entry.malformed {
            debug!(kind = %self.kind, error = %err, "Dropping malformed entry");
            diagnostics.dropped_items.push(err);
            return;
        }

        match GeomItem::from_attributes(entry.attributes) {
            Some(item) => {
                items.insert(item.name().to_string(), item);
            }
            None => {
                let err = ParseError::IncompleteRecord {
                    kind: self.kind,
                    line: entry.first_line,
                };
                debug!(kind = %self.kind, error = %err, "Dropping unnamed entry");
                diagnostics.dropped_items.push(err);
            }
        }
    }
}
