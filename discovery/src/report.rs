//! Result envelope for one geom query.

use chrono::{SecondsFormat, Utc};
use geomscan_core::{DeviceClass, GeomCommand, GeomOutput, GeomRequest};
use serde::{Deserialize, Serialize};

use crate::ParseRun;

/// Parsed geoms plus the request that produced them.
///
/// `changed` is always `false`; reading geom state never modifies it. It is
/// kept so the envelope matches what automation tooling expects from a
/// read-only fact module.
///
/// Reading a report back uses `command` to decide the shape of `geoms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReport")]
pub struct GeomReport {
    pub changed: bool,
    pub command: GeomCommand,
    /// `None` for output parsed from a file or stdin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<DeviceClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// RFC 3339 UTC timestamp of when the output was parsed.
    pub captured_at: String,
    pub geoms: GeomOutput,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Report as read from JSON or YAML, before `geoms` is typed.
#[derive(Deserialize)]
struct RawReport {
    changed: bool,
    command: GeomCommand,
    #[serde(default)]
    class: Option<DeviceClass>,
    #[serde(default)]
    device: Option<String>,
    captured_at: String,
    geoms: serde_json::Value,
    #[serde(default)]
    warnings: Vec<String>,
}

impl TryFrom<RawReport> for GeomReport {
    type Error = serde_json::Error;

    fn try_from(raw: RawReport) -> Result<Self, Self::Error> {
        Ok(Self {
            changed: raw.changed,
            command: raw.command,
            class: raw.class,
            device: raw.device,
            captured_at: raw.captured_at,
            geoms: GeomOutput::deserialize_for(raw.command, raw.geoms)?,
            warnings: raw.warnings,
        })
    }
}

impl GeomReport {
    /// Report for a live geom invocation.
    pub fn from_request(request: &GeomRequest, run: ParseRun) -> Self {
        Self {
            class: Some(request.class),
            device: request.device.clone(),
            ..Self::offline(request.command, run)
        }
    }

    /// Report for output that was captured elsewhere.
    pub fn offline(command: GeomCommand, run: ParseRun) -> Self {
        Self {
            changed: false,
            command,
            class: None,
            device: None,
            captured_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            geoms: run.output,
            warnings: run.warnings,
        }
    }
}
