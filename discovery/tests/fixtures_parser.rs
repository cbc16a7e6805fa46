use std::fs;
use std::path::PathBuf;

use geomscan_core::{GeomCommand, GeomOutput};
use geomscan_discovery::parser::{ParseError, RecordExtractor, RecordKind, parse_list, parse_status};
use geomscan_discovery::{parse_output, parse_output_with_report};

#[test]
fn test_part_listing_reproduces_documented_vtbd0_shape() {
    let geoms = parse_list(&fixture("part-list.txt"));
    let vtbd0 = serde_json::to_value(&geoms["vtbd0"]).unwrap();

    assert_eq!(vtbd0["geom_name"], "vtbd0");
    assert_eq!(vtbd0["modified"], "false");
    assert_eq!(vtbd0["state"], "OK");
    assert_eq!(vtbd0["fwheads"], "16");
    assert_eq!(vtbd0["fwsectors"], "63");
    assert_eq!(vtbd0["last"], "83886040");
    assert_eq!(vtbd0["first"], "40");
    assert_eq!(vtbd0["entries"], "152");
    assert_eq!(vtbd0["scheme"], "GPT");

    let expected_provider = serde_json::json!({
        "name": "vtbd0p1",
        "mediasize": "524288 (512K)",
        "sectorsize": "512",
        "stripesize": "0",
        "stripeoffset": "20480",
        "mode": "r0w0e0",
        "efimedia": "HD(1,GPT,86e1234b-71e1-11e9-acd0-5bc9b916b6f9,0x28,0x400)",
        "rawuuid": "86e1234b-71e1-11e9-acd0-5bc9b916b6f9",
        "rawtype": "83bd6b9d-7f41-11dc-be0b-001560b84f0f",
        "label": "freebsd boot",
        "length": "524288",
        "offset": "20480",
        "type": "freebsd-boot",
        "index": "1",
        "end": "1063",
        "start": "40"
    });
    assert_eq!(vtbd0["providers"]["vtbd0p1"], expected_provider);

    let expected_consumer = serde_json::json!({
        "name": "vtbd0",
        "mediasize": "42949672960 (40G)",
        "sectorsize": "512",
        "mode": "r2w2e3"
    });
    assert_eq!(vtbd0["consumers"], serde_json::json!({ "vtbd0": expected_consumer }));
}

#[test]
fn test_part_listing_yields_one_geom_per_block() {
    let geoms = parse_list(&fixture("part-list.txt"));
    assert_eq!(geoms.keys().collect::<Vec<_>>(), vec!["ada0", "vtbd0"]);

    let vtbd0 = &geoms["vtbd0"];
    let providers: Vec<&String> = vtbd0.providers.as_ref().unwrap().keys().collect();
    assert_eq!(providers, vec!["vtbd0p1", "vtbd0p2", "vtbd0p3"]);
    assert_eq!(
        vtbd0.find_provider("vtbd0p2").unwrap().get("type"),
        Some("freebsd-swap")
    );

    let ada0 = &geoms["ada0"];
    assert_eq!(ada0.find_provider("ada0p1").unwrap().get("label"), Some("efiboot0"));
    assert_eq!(ada0.find_consumer("ada0").unwrap().get("mode"), Some("r1w1e2"));
}

#[test]
fn test_mirror_listing_normalizes_mixed_case_labels() {
    let geoms = parse_list(&fixture("mirror-list.txt"));
    let gm0 = &geoms["gm0"];

    assert_eq!(gm0.get("state"), Some("COMPLETE"));
    assert_eq!(gm0.get("genid"), Some("0"));
    assert_eq!(gm0.get("id"), Some("3050208741"));
    assert!(gm0.find_provider("mirror/gm0").is_some());

    let consumers = gm0.consumers.as_ref().unwrap();
    assert_eq!(consumers.len(), 2);
    assert_eq!(consumers["ada2"].get("priority"), Some("1"));
    assert_eq!(consumers["ada1"].get("state"), Some("ACTIVE"));
}

#[test]
fn test_corrupt_listing_keeps_well_formed_siblings() {
    let text = fixture("corrupt-list.txt");
    let mut extractor = RecordExtractor::new(&text);
    let geoms = extractor.extract();
    let diagnostics = extractor.diagnostics();

    assert_eq!(geoms.keys().collect::<Vec<_>>(), vec!["da0"]);
    let providers = geoms["da0"].providers.as_ref().unwrap();
    assert_eq!(providers.keys().collect::<Vec<_>>(), vec!["da0s1"]);

    assert_eq!(diagnostics.blocks, 4);
    assert_eq!(diagnostics.dropped_records.len(), 3);
    assert!(matches!(
        diagnostics.dropped_records.last(),
        Some(ParseError::MalformedLine { .. })
    ));
    assert_eq!(
        diagnostics.dropped_items,
        vec![ParseError::IncompleteRecord {
            kind: RecordKind::Provider,
            line: 8
        }]
    );
}

#[test]
fn test_parsing_is_deterministic() {
    let text = fixture("part-list.txt");
    let first = parse_output(GeomCommand::List, &text).unwrap();
    let second = parse_output(GeomCommand::List, &text).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_part_status_fixture() {
    let entries = parse_status(&fixture("part-status.txt")).unwrap();
    assert_eq!(entries.len(), 4);
    for entry in entries.values() {
        assert_eq!(entry.status, None);
    }
    assert_eq!(entries["ada0p1"].components.as_deref(), Some("ada0"));
}

#[test]
fn test_status_mode_on_listing_output_drops_non_three_field_lines() {
    let run = parse_output_with_report(GeomCommand::Status, &fixture("mirror-list.txt")).unwrap();
    let entries = run.output.as_status().unwrap();
    assert_eq!(entries["Geom"].components.as_deref(), Some("gm0"));
    assert!(matches!(
        run.diagnostics.dropped_records.first(),
        Some(ParseError::MalformedStatusLine { line: 2, fields: 2, .. })
    ));
    assert_eq!(run.warnings.len(), run.diagnostics.dropped_records.len());
}

#[test]
fn test_list_mode_on_status_output_drops_everything() {
    let run = parse_output_with_report(GeomCommand::List, &fixture("part-status.txt")).unwrap();
    assert!(matches!(run.output, GeomOutput::List(ref geoms) if geoms.is_empty()));
    assert_eq!(run.diagnostics.dropped_records.len(), 1);
}

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).expect("fixture should be readable")
}
