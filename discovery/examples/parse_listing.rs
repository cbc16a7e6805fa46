//! Parsing captured `geom part list` output.
//!
//! Demonstrates how to use `parse_output_with_report()` on output captured
//! elsewhere, without running geom.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p geomscan-discovery --example parse_listing
//! ```

use geomscan_core::{GeomCommand, GeomOutput};
use geomscan_discovery::parse_output_with_report;

fn main() {
    let listing = r#"Geom name: ada0
modified: false
state: OK
scheme: GPT
Providers:
1. Name: ada0p1
   Mediasize: 209715200 (200M)
   Mode: r0w0e0
   type: efi
2. Name: ada0p2
   Mediasize: 499898105856 (466G)
   Mode: r1w1e1
   type: freebsd-zfs
Consumers:
1. Name: ada0
   Mediasize: 500107862016 (466G)
   Mode: r1w1e2

scheme: MBR
"#;

    let run = match parse_output_with_report(GeomCommand::List, listing) {
        Ok(run) => run,
        Err(err) => {
            eprintln!("parse failed: {err}");
            return;
        }
    };

    if let GeomOutput::List(geoms) = &run.output {
        for (name, geom) in geoms {
            println!("{name} ({})", geom.get("scheme").unwrap_or("unknown scheme"));
            for (provider, item) in geom.providers.iter().flatten() {
                println!("  provider {provider}: {}", item.get("type").unwrap_or("-"));
            }
            for consumer in geom.consumers.iter().flat_map(|items| items.keys()) {
                println!("  consumer {consumer}");
            }
        }
    }

    for warning in &run.warnings {
        println!("warning: {warning}");
    }

    match serde_json::to_string_pretty(&run.output) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("serialization failed: {err}"),
    }
}
