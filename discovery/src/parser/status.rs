//! Parsing for `geom <class> status -s` output.
//!
//! Each non-blank line is `<device> <status> <components>`, whitespace
//! separated. `N/A` in the last two columns means the value is absent.

use geomscan_core::{StatusEntry, StatusMap};
use tracing::debug;

use super::{ParseDiagnostics, ParseError, SourceLine, to_source_lines};

const ABSENT: &str = "N/A";

fn field(token: &str) -> Option<String> {
    (token != ABSENT).then(|| token.to_string())
}

/// Parses one status line.
///
/// Exactly three fields are required. Component lists with embedded
/// whitespace are rejected rather than recombined.
///
/// # Examples
///
/// ```
/// use geomscan_discovery::parser::parse_status_line;
///
/// let (device, entry) = parse_status_line(1, "vtbd0 OK N/A").unwrap();
/// assert_eq!(device, "vtbd0");
/// assert_eq!(entry.status.as_deref(), Some("OK"));
/// assert_eq!(entry.components, None);
/// ```
pub fn parse_status_line(number: usize, text: &str) -> Result<(String, StatusEntry), ParseError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    let [device, status, components] = fields.as_slice() else {
        return Err(ParseError::MalformedStatusLine {
            line: number,
            text: text.to_string(),
            fields: fields.len(),
        });
    };

    Ok((
        device.to_string(),
        StatusEntry {
            status: field(status),
            components: field(components),
        },
    ))
}

/// Parses status output into device → entry, discarding diagnostics.
///
/// See [`StatusExtractor::extract`] for the recovery rules.
///
/// # Examples
///
/// ```
/// use geomscan_discovery::parser::parse_status;
///
/// let output = "vtbd0p1 N/A vtbd0\nmirror/gm0 COMPLETE ada0 (ACTIVE)\n";
/// let entries = parse_status(output).unwrap();
/// assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["vtbd0p1"]);
/// ```
pub fn parse_status(output: &str) -> Result<StatusMap, ParseError> {
    StatusExtractor::new(output).extract()
}

/// Status parser that keeps diagnostics for dropped rows.
pub struct StatusExtractor<'a> {
    lines: Vec<SourceLine<'a>>,
    diagnostics: ParseDiagnostics,
}

impl<'a> StatusExtractor<'a> {
    pub fn new(output: &'a str) -> Self {
        Self {
            lines: to_source_lines(output),
            diagnostics: ParseDiagnostics::default(),
        }
    }

    pub fn diagnostics(&self) -> &ParseDiagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> ParseDiagnostics {
        self.diagnostics
    }

    /// Parses every row. Blank lines are skipped, malformed rows are dropped
    /// and recorded, and later duplicates win.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError::MalformedStatusLine`] only when the
    /// output has rows and none of them parsed.
    pub fn extract(&mut self) -> Result<StatusMap, ParseError> {
        let mut entries = StatusMap::new();
        let mut diagnostics = ParseDiagnostics::default();

        for line in self.lines.iter().filter(|line| !line.is_blank()) {
            diagnostics.blocks += 1;
            match parse_status_line(line.number, line.text) {
                Ok((device, entry)) => {
                    entries.insert(device, entry);
                }
                Err(err) => {
                    debug!(error = %err, "Dropping status row");
                    diagnostics.dropped_records.push(err);
                }
            }
        }

        debug!(
            rows = diagnostics.blocks,
            devices = entries.len(),
            dropped = diagnostics.dropped_records.len(),
            "Parsed geom status"
        );

        if entries.is_empty() && !diagnostics.dropped_records.is_empty() {
            let first = diagnostics.dropped_records.remove(0);
            self.diagnostics = diagnostics;
            return Err(first);
        }

        self.diagnostics = diagnostics;
        Ok(entries)
    }
}
