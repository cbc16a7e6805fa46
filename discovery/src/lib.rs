//! Parsing and running FreeBSD geom(8) inspection commands.
//!
//! This crate turns the text output of `geom <class> list` and
//! `geom <class> status -s` into the structures defined in
//! [`geomscan_core`]. It can also run geom itself with a locale-neutral
//! environment and a timeout.
//!
//! # Main entry points
//!
//! - [`parse_output`]: parse pre-captured output without running anything.
//! - [`parse_output_with_report`]: same, plus warnings for every record or
//!   entry that had to be dropped.
//! - [`runner::run_geom`]: run geom for a [`GeomRequest`] and parse the
//!   result into a [`report::GeomReport`].
//!
//! # Example
//!
//! ```
//! use geomscan_core::{GeomCommand, GeomOutput};
//! use geomscan_discovery::parse_output;
//!
//! let listing = "\
//! Geom name: vtbd0
//! scheme: GPT
//! Providers:
//! 1. Name: vtbd0p1
//!    Mediasize: 524288 (512K)
//!    type: freebsd-boot
//! ";
//!
//! let GeomOutput::List(geoms) = parse_output(GeomCommand::List, listing).unwrap() else {
//!     panic!("list mode yields a listing");
//! };
//! let vtbd0p1 = geoms["vtbd0"].find_provider("vtbd0p1").unwrap();
//! assert_eq!(vtbd0p1.get("type"), Some("freebsd-boot"));
//! ```
//!
//! [`GeomRequest`]: geomscan_core::GeomRequest

pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod report;
pub mod runner;

use geomscan_core::{GeomCommand, GeomOutput};
use parser::{ParseDiagnostics, ParseError, RecordExtractor, StatusExtractor};

pub use error::{DiscoverError, Result};

/// Parsed output plus everything that was dropped along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRun {
    pub output: GeomOutput,
    pub diagnostics: ParseDiagnostics,
    pub warnings: Vec<String>,
}

/// Parses captured geom output for the given sub-command.
///
/// Incomplete records and malformed status rows are dropped. List output
/// always parses; status output fails only when it has rows and none of
/// them is usable.
///
/// # Examples
///
/// ```
/// use geomscan_core::GeomCommand;
/// use geomscan_discovery::parse_output;
///
/// let output = parse_output(GeomCommand::Status, "vtbd0 OK N/A\n").unwrap();
/// let json = serde_json::to_value(&output).unwrap();
/// assert_eq!(json, serde_json::json!({"vtbd0": {"status": "OK", "components": null}}));
///
/// assert!(parse_output(GeomCommand::List, "").unwrap().is_empty());
/// ```
pub fn parse_output(command: GeomCommand, text: &str) -> std::result::Result<GeomOutput, ParseError> {
    parse_output_with_report(command, text).map(|run| run.output)
}

/// Parses captured geom output and keeps the diagnostics.
///
/// # Examples
///
/// ```
/// use geomscan_core::GeomCommand;
/// use geomscan_discovery::parse_output_with_report;
///
/// let text = "Geom name: ada0\n\nscheme: GPT\n";
/// let run = parse_output_with_report(GeomCommand::List, text).unwrap();
/// assert_eq!(run.output.len(), 1);
/// assert_eq!(run.diagnostics.dropped_records.len(), 1);
/// assert_eq!(run.warnings.len(), 1);
/// ```
pub fn parse_output_with_report(
    command: GeomCommand,
    text: &str,
) -> std::result::Result<ParseRun, ParseError> {
    let (output, diagnostics) = match command {
        GeomCommand::List => {
            let mut extractor = RecordExtractor::new(text);
            let geoms = extractor.extract();
            (GeomOutput::List(geoms), extractor.into_diagnostics())
        }
        GeomCommand::Status => {
            let mut extractor = StatusExtractor::new(text);
            let entries = extractor.extract()?;
            (GeomOutput::Status(entries), extractor.into_diagnostics())
        }
    };

    let warnings = diagnostics.warnings();
    Ok(ParseRun {
        output,
        diagnostics,
        warnings,
    })
}
