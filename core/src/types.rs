//! Type definitions for parsed GEOM output.
//!
//! This module defines the data model produced by the GEOM output parser.
//! All types are designed for serialization with [`serde`] so that the
//! serialized shape matches what consumers expect:
//!
//! - list mode: `{ name: { ...attributes..., providers?: {..}, consumers?: {..} } }`
//! - status mode: `{ device: { status: string|null, components: string|null } }`

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::GeomCommand;

/// Attribute key that identifies a geom in its head region.
pub const GEOM_NAME_KEY: &str = "geom_name";

/// Attribute key that identifies a provider or consumer entry.
pub const ITEM_NAME_KEY: &str = "name";

/// Normalized field name → trimmed raw value.
///
/// A [`BTreeMap`] keeps serialized output deterministic.
pub type AttributeMap = BTreeMap<String, String>;

/// Provider or consumer name → entry.
pub type ItemMap = BTreeMap<String, GeomItem>;

/// Geom name → geom.
pub type GeomMap = BTreeMap<String, Geom>;

/// Device name → status entry.
pub type StatusMap = BTreeMap<String, StatusEntry>;

/// A provider or consumer entry nested under a [`Geom`].
///
/// # Examples
///
/// ```
/// use geomscan_core::{AttributeMap, GeomItem};
///
/// let mut attributes = AttributeMap::new();
/// attributes.insert("name".into(), "vtbd0p1".into());
/// attributes.insert("mode".into(), "r0w0e0".into());
///
/// let item = GeomItem::from_attributes(attributes).unwrap();
/// assert_eq!(item.name(), "vtbd0p1");
/// assert_eq!(item.get("mode"), Some("r0w0e0"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeomItem {
    pub attributes: AttributeMap,
}

impl GeomItem {
    /// Builds an item, or `None` when the attributes carry no non-empty `name`.
    pub fn from_attributes(attributes: AttributeMap) -> Option<Self> {
        if attributes
            .get(ITEM_NAME_KEY)
            .is_none_or(|name| name.is_empty())
        {
            return None;
        }
        Some(Self { attributes })
    }

    /// Returns the entry's `name` attribute.
    pub fn name(&self) -> &str {
        self.attributes
            .get(ITEM_NAME_KEY)
            .map_or("", String::as_str)
    }

    /// Looks up a normalized attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// One entity reported by `geom <class> list`.
///
/// `providers` and `consumers` are `None` when the source block had no such
/// section. An empty map means the section header was present with no
/// usable entries.
///
/// # Examples
///
/// ```
/// use geomscan_core::{AttributeMap, Geom};
///
/// let mut attributes = AttributeMap::new();
/// attributes.insert("geom_name".into(), "vtbd0".into());
/// attributes.insert("scheme".into(), "GPT".into());
///
/// let geom = Geom::from_attributes(attributes).unwrap();
/// assert_eq!(geom.name(), "vtbd0");
/// assert!(geom.providers.is_none());
///
/// let json = serde_json::to_value(&geom).unwrap();
/// assert_eq!(json["scheme"], "GPT");
/// assert!(json.get("providers").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geom {
    #[serde(flatten)]
    pub attributes: AttributeMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<ItemMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumers: Option<ItemMap>,
}

impl Geom {
    /// Builds a geom, or `None` when the attributes carry no non-empty `geom_name`.
    pub fn from_attributes(attributes: AttributeMap) -> Option<Self> {
        if attributes
            .get(GEOM_NAME_KEY)
            .is_none_or(|name| name.is_empty())
        {
            return None;
        }
        Some(Self {
            attributes,
            providers: None,
            consumers: None,
        })
    }

    /// Returns the geom's `geom_name` attribute.
    pub fn name(&self) -> &str {
        self.attributes
            .get(GEOM_NAME_KEY)
            .map_or("", String::as_str)
    }

    /// Looks up a normalized head attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Attaches providers.
    pub fn with_providers(mut self, providers: ItemMap) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Attaches consumers.
    pub fn with_consumers(mut self, consumers: ItemMap) -> Self {
        self.consumers = Some(consumers);
        self
    }

    /// Finds a provider by name.
    pub fn find_provider(&self, name: &str) -> Option<&GeomItem> {
        self.providers.as_ref().and_then(|items| items.get(name))
    }

    /// Finds a consumer by name.
    pub fn find_consumer(&self, name: &str) -> Option<&GeomItem> {
        self.consumers.as_ref().and_then(|items| items.get(name))
    }
}

/// One row of `geom <class> status -s`.
///
/// `None` stands for the `N/A` token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusEntry {
    pub status: Option<String>,
    pub components: Option<String>,
}

/// Parsed output of either geom sub-command.
///
/// Serialized untagged so that the mapping appears directly. The two shapes
/// cannot be told apart when read back, so deserialization goes through
/// [`GeomOutput::deserialize_for`] with the command that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GeomOutput {
    List(GeomMap),
    Status(StatusMap),
}

impl GeomOutput {
    /// Deserializes the mapping produced by `command`.
    ///
    /// # Examples
    ///
    /// ```
    /// use geomscan_core::{GeomCommand, GeomOutput};
    ///
    /// let json = serde_json::json!({"gm0": {"status": "COMPLETE", "components": "ada0"}});
    /// let output = GeomOutput::deserialize_for(GeomCommand::Status, json).unwrap();
    /// assert_eq!(output.as_status().unwrap()["gm0"].status.as_deref(), Some("COMPLETE"));
    /// ```
    pub fn deserialize_for<'de, D>(command: GeomCommand, deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match command {
            GeomCommand::List => GeomMap::deserialize(deserializer).map(Self::List),
            GeomCommand::Status => StatusMap::deserialize(deserializer).map(Self::Status),
        }
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        match self {
            Self::List(geoms) => geoms.len(),
            Self::Status(entries) => entries.len(),
        }
    }

    /// Returns `true` when no entries were parsed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the list-mode mapping, if this is list output.
    pub fn as_list(&self) -> Option<&GeomMap> {
        match self {
            Self::List(geoms) => Some(geoms),
            Self::Status(_) => None,
        }
    }

    /// Returns the status-mode mapping, if this is status output.
    pub fn as_status(&self) -> Option<&StatusMap> {
        match self {
            Self::Status(entries) => Some(entries),
            Self::List(_) => None,
        }
    }
}
