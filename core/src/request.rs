//! Caller-facing request types: sub-command, device class, device filter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The geom sub-command to run.
///
/// # Examples
///
/// ```
/// use geomscan_core::GeomCommand;
///
/// assert_eq!(GeomCommand::default(), GeomCommand::List);
/// assert_eq!(GeomCommand::Status.geom_args(), &["status", "-s"]);
/// assert_eq!("status".parse::<GeomCommand>().unwrap(), GeomCommand::Status);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GeomCommand {
    /// `geom <class> list`, parsed into nested records.
    #[default]
    List,
    /// `geom <class> status -s`, parsed into status rows.
    Status,
}

impl GeomCommand {
    /// Arguments passed to `geom` after the class token.
    pub fn geom_args(self) -> &'static [&'static str] {
        match self {
            Self::List => &["list"],
            Self::Status => &["status", "-s"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Status => "status",
        }
    }
}

impl fmt::Display for GeomCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeomCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(Self::List),
            "status" => Ok(Self::Status),
            other => Err(format!("unknown geom command '{other}' (expected list or status)")),
        }
    }
}

/// GEOM class queried by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Cache,
    Concat,
    Eli,
    Journal,
    Label,
    Mirror,
    Mountver,
    Multipath,
    Nop,
    #[default]
    Part,
    Raid,
    Raid3,
    Sched,
    Shsec,
    Stripe,
    Virstor,
}

impl DeviceClass {
    /// Every supported class, in the order geom(8) documents them.
    pub const ALL: [DeviceClass; 16] = [
        Self::Cache,
        Self::Concat,
        Self::Eli,
        Self::Journal,
        Self::Label,
        Self::Mirror,
        Self::Mountver,
        Self::Multipath,
        Self::Nop,
        Self::Part,
        Self::Raid,
        Self::Raid3,
        Self::Sched,
        Self::Shsec,
        Self::Stripe,
        Self::Virstor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Concat => "concat",
            Self::Eli => "eli",
            Self::Journal => "journal",
            Self::Label => "label",
            Self::Mirror => "mirror",
            Self::Mountver => "mountver",
            Self::Multipath => "multipath",
            Self::Nop => "nop",
            Self::Part => "part",
            Self::Raid => "raid",
            Self::Raid3 => "raid3",
            Self::Sched => "sched",
            Self::Shsec => "shsec",
            Self::Stripe => "stripe",
            Self::Virstor => "virstor",
        }
    }

    /// Class token as geom expects it on the command line (`PART`, `MIRROR`, ...).
    ///
    /// # Examples
    ///
    /// ```
    /// use geomscan_core::DeviceClass;
    ///
    /// assert_eq!(DeviceClass::Raid3.geom_token(), "RAID3");
    /// ```
    pub fn geom_token(self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == wanted)
            .ok_or_else(|| format!("unknown device class '{wanted}'"))
    }
}

/// A fully specified geom query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeomRequest {
    pub command: GeomCommand,
    pub class: DeviceClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl GeomRequest {
    pub fn new(command: GeomCommand, class: DeviceClass) -> Self {
        Self {
            command,
            class,
            device: None,
        }
    }

    /// Restricts the query to one device.
    pub fn with_device(mut self, device: &str) -> Self {
        self.device = Some(device.to_string());
        self
    }

    /// Full argument vector passed to the geom binary.
    ///
    /// # Examples
    ///
    /// ```
    /// use geomscan_core::{DeviceClass, GeomCommand, GeomRequest};
    ///
    /// let request = GeomRequest::new(GeomCommand::Status, DeviceClass::Mirror).with_device("gm0");
    /// assert_eq!(request.argv(), vec!["MIRROR", "status", "-s", "gm0"]);
    /// ```
    pub fn argv(&self) -> Vec<String> {
        let mut argv = vec![self.class.geom_token()];
        argv.extend(self.command.geom_args().iter().map(|arg| arg.to_string()));
        if let Some(device) = &self.device {
            argv.push(device.clone());
        }
        argv
    }
}
