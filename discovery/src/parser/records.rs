//! Record extraction for `geom <class> list` output.
//!
//! The listing is a sequence of blank-line separated blocks. Each block has
//! a head region of `<Label>: <value>` lines starting with `Geom name:`,
//! optionally followed by `Providers:` and/or `Consumers:` regions:
//!
//! ```text
//! Geom name: vtbd0
//! scheme: GPT
//! Providers:
//! 1. Name: vtbd0p1
//!    Mediasize: 524288 (512K)
//! Consumers:
//! 1. Name: vtbd0
//!    Mode: r1w1e2
//! ```
//!
//! The scanner walks each block once and switches region on the header
//! lines. A geom is committed after its whole block has been read.

use geomscan_core::{AttributeMap, Geom, GeomMap};
use tracing::debug;

use super::normalize::split_key_value;
use super::subsection::SubsectionExtractor;
use super::{ParseDiagnostics, ParseError, RecordKind, SourceLine, to_source_lines};

const PROVIDERS_HEADER: &str = "Providers:";
const CONSUMERS_HEADER: &str = "Consumers:";

/// Head keys that would collide with the nested maps.
const RESERVED_KEYS: &[&str] = &["providers", "consumers"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Head,
    Providers,
    Consumers,
}

fn region_header(line: &str) -> Option<Region> {
    match line.trim_end() {
        PROVIDERS_HEADER => Some(Region::Providers),
        CONSUMERS_HEADER => Some(Region::Consumers),
        _ => None,
    }
}

/// One block split into its regions.
#[derive(Debug, Default)]
struct BlockRegions<'a> {
    head: Vec<SourceLine<'a>>,
    providers: Option<Vec<SourceLine<'a>>>,
    consumers: Option<Vec<SourceLine<'a>>>,
}

impl<'a> BlockRegions<'a> {
    fn scan(block: &[SourceLine<'a>]) -> Self {
        let mut regions = Self::default();
        let mut current = Region::Head;

        for line in block {
            if let Some(region) = region_header(line.text) {
                current = region;
                match region {
                    Region::Providers => {
                        regions.providers.get_or_insert_with(Vec::new);
                    }
                    Region::Consumers => {
                        regions.consumers.get_or_insert_with(Vec::new);
                    }
                    Region::Head => {}
                }
                continue;
            }

            let target = match current {
                Region::Head => Some(&mut regions.head),
                Region::Providers => regions.providers.as_mut(),
                Region::Consumers => regions.consumers.as_mut(),
            };
            if let Some(lines) = target {
                lines.push(*line);
            }
        }

        regions
    }
}

/// Splits text into blocks of non-blank lines. Blank and whitespace-only
/// lines separate blocks.
///
/// # Examples
///
/// ```
/// use geomscan_discovery::parser::{split_blocks, to_source_lines};
///
/// let lines = to_source_lines("a: 1\nb: 2\n\n\nc: 3\n");
/// let blocks = split_blocks(&lines);
/// assert_eq!(blocks.len(), 2);
/// assert_eq!(blocks[1][0].number, 5);
/// ```
pub fn split_blocks<'a>(lines: &'a [SourceLine<'a>]) -> Vec<&'a [SourceLine<'a>]> {
    lines
        .split(|line| line.is_blank())
        .filter(|block| !block.is_empty())
        .collect()
}

/// Parses listing output into geom name → geom, discarding diagnostics.
///
/// # Examples
///
/// ```
/// use geomscan_discovery::parser::parse_list;
///
/// let output = "\
/// Geom name: ada0
/// scheme: GPT
/// Providers:
/// 1. Name: ada0p1
///    Mode: r1w1e1
/// ";
///
/// let geoms = parse_list(output);
/// let ada0 = &geoms["ada0"];
/// assert_eq!(ada0.get("scheme"), Some("GPT"));
/// assert!(ada0.find_provider("ada0p1").is_some());
/// assert!(ada0.consumers.is_none());
/// ```
pub fn parse_list(output: &str) -> GeomMap {
    RecordExtractor::new(output).extract()
}

/// Listing parser that keeps diagnostics for dropped records.
pub struct RecordExtractor<'a> {
    lines: Vec<SourceLine<'a>>,
    diagnostics: ParseDiagnostics,
}

impl<'a> RecordExtractor<'a> {
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

    /// Extracts every well-formed geom. Later records win on name clashes.
    pub fn extract(&mut self) -> GeomMap {
        let mut geoms = GeomMap::new();
        let mut diagnostics = ParseDiagnostics::default();

        for block in split_blocks(&self.lines) {
            diagnostics.blocks += 1;
            match extract_geom(block, &mut diagnostics) {
                Ok(geom) => {
                    if geoms.contains_key(geom.name()) {
                        debug!(geom = geom.name(), "Duplicate geom name, keeping later record");
                    }
                    geoms.insert(geom.name().to_string(), geom);
                }
                Err(err) => {
                    debug!(error = %err, "Dropping geom record");
                    diagnostics.dropped_records.push(err);
                }
            }
        }

        debug!(
            blocks = diagnostics.blocks,
            geoms = geoms.len(),
            dropped = diagnostics.dropped_records.len(),
            "Parsed geom listing"
        );
        self.diagnostics = diagnostics;
        geoms
    }
}

fn extract_geom(
    block: &[SourceLine<'_>],
    diagnostics: &mut ParseDiagnostics,
) -> Result<Geom, ParseError> {
    let first_line = block.first().map_or(0, |line| line.number);
    let incomplete = ParseError::IncompleteRecord {
        kind: RecordKind::Geom,
        line: first_line,
    };

    let regions = BlockRegions::scan(block);
    if regions.head.is_empty() {
        return Err(incomplete);
    }

    let mut attributes = AttributeMap::new();
    for line in &regions.head {
        let (key, value) = split_key_value(line)?;
        if RESERVED_KEYS.contains(&key.as_str()) {
            debug!(line = line.number, key = key.as_str(), "Skipping reserved head attribute");
            diagnostics.ignored_lines.push(line.number);
            continue;
        }
        attributes.insert(key, value);
    }

    let mut geom = Geom::from_attributes(attributes).ok_or(incomplete)?;

    if let Some(lines) = &regions.providers {
        let providers = SubsectionExtractor::new(RecordKind::Provider, lines).extract(diagnostics);
        geom = geom.with_providers(providers);
    }
    if let Some(lines) = &regions.consumers {
        let consumers = SubsectionExtractor::new(RecordKind::Consumer, lines).extract(diagnostics);
        geom = geom.with_consumers(consumers);
    }

    Ok(geom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> (GeomMap, ParseDiagnostics) {
        let mut extractor = RecordExtractor::new(text);
        let geoms = extractor.extract();
        (geoms, extractor.into_diagnostics())
    }

    #[test]
    fn test_head_only_block_has_no_nested_maps() {
        let (geoms, diagnostics) = extract("Geom name: md0\nMode: r0w0e0\n");
        let md0 = &geoms["md0"];
        assert_eq!(md0.get("mode"), Some("r0w0e0"));
        assert!(md0.providers.is_none());
        assert!(md0.consumers.is_none());
        assert_eq!(diagnostics.blocks, 1);
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn test_present_but_empty_section_is_an_empty_map() {
        let (geoms, _) = extract("Geom name: md0\nProviders:\nConsumers:\n");
        let md0 = &geoms["md0"];
        assert_eq!(md0.providers.as_ref().map(|p| p.len()), Some(0));
        assert_eq!(md0.consumers.as_ref().map(|c| c.len()), Some(0));
    }

    #[test]
    fn test_consumers_before_providers() {
        let text = "\
Geom name: gm0
Consumers:
1. Name: ada0
   Mode: r1w1e1
Providers:
1. Name: mirror/gm0
   Mode: r0w0e0
";
        let (geoms, _) = extract(text);
        let gm0 = &geoms["gm0"];
        assert!(gm0.find_consumer("ada0").is_some());
        assert!(gm0.find_provider("mirror/gm0").is_some());
        assert!(gm0.find_provider("ada0").is_none());
    }

    #[test]
    fn test_block_starting_with_header_is_discarded() {
        let text = "Providers:\n1. Name: ada0p1\n\nGeom name: ada1\n";
        let (geoms, diagnostics) = extract(text);
        assert_eq!(geoms.keys().collect::<Vec<_>>(), vec!["ada1"]);
        assert_eq!(
            diagnostics.dropped_records,
            vec![ParseError::IncompleteRecord {
                kind: RecordKind::Geom,
                line: 1
            }]
        );
    }

    #[test]
    fn test_malformed_head_line_discards_block_only() {
        let text = "Geom name: ada0\nbroken line\n\nGeom name: ada1\n";
        let (geoms, diagnostics) = extract(text);
        assert!(!geoms.contains_key("ada0"));
        assert!(geoms.contains_key("ada1"));
        assert!(matches!(
            diagnostics.dropped_records.as_slice(),
            [ParseError::MalformedLine { line: 2, .. }]
        ));
    }

    #[test]
    fn test_later_duplicate_record_wins() {
        let text = "Geom name: ada0\nstate: OK\n\nGeom name: ada0\nstate: CORRUPT\n";
        let (geoms, _) = extract(text);
        assert_eq!(geoms.len(), 1);
        assert_eq!(geoms["ada0"].get("state"), Some("CORRUPT"));
    }

    #[test]
    fn test_later_duplicate_key_wins_within_record() {
        let (geoms, _) = extract("Geom name: ada0\nstate: OK\nState: DEGRADED\n");
        assert_eq!(geoms["ada0"].get("state"), Some("DEGRADED"));
    }

    #[test]
    fn test_reserved_head_key_is_skipped() {
        let (geoms, diagnostics) = extract("Geom name: ada0\nProviders: 2\n");
        assert!(geoms["ada0"].providers.is_none());
        assert!(!geoms["ada0"].attributes.contains_key("providers"));
        assert_eq!(diagnostics.ignored_lines, vec![2]);
    }

    #[test]
    fn test_whitespace_only_lines_separate_blocks() {
        let (geoms, diagnostics) = extract("Geom name: a\n   \nGeom name: b\n");
        assert_eq!(geoms.len(), 2);
        assert_eq!(diagnostics.blocks, 2);
    }

    #[test]
    fn test_padded_header_and_indented_markers() {
        let text = "Geom name: a\nProviders:  \n  1. Name: a1\n     Mode: r0w0e0\nConsumers:\t\n  1. Name: da0\n";
        let (geoms, diagnostics) = extract(text);
        let a = &geoms["a"];
        assert_eq!(a.find_provider("a1").unwrap().get("mode"), Some("r0w0e0"));
        assert!(a.find_consumer("da0").is_some());
        assert!(!a.attributes.contains_key("providers"));
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn test_crlf_line_endings() {
        let (geoms, _) = extract("Geom name: ada0\r\nscheme: MBR\r\nProviders:\r\n1. Name: ada0s1\r\n");
        assert_eq!(geoms["ada0"].get("scheme"), Some("MBR"));
        assert!(geoms["ada0"].find_provider("ada0s1").is_some());
    }
}
