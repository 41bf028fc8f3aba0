//! Core domain types for appmetrica-core
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Event record** | One analytics event: identifiers, name, timestamp and optional device/network attributes |
//! | **Identifier mode** | Whether events are keyed by the AppMetrica device id or by a profile id |
//! | **Column set** | The ordered, whitelist-filtered optional attributes rendered into every row |
//!
//! Field names on the wire (JSON input and CSV header) follow the AppMetrica
//! logs import API, e.g. `appmetrica_device_id`, `ios_ifa`, `mcc`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Identifier Mode
// ============================================

/// Which identifier keys the rows of an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierMode {
    /// Numeric AppMetrica device identifier
    #[default]
    Device,
    /// Caller-defined profile identifier
    Profile,
}

impl IdentifierMode {
    /// CSV header name of the identifier column
    pub fn column_name(&self) -> &'static str {
        match self {
            IdentifierMode::Device => "appmetrica_device_id",
            IdentifierMode::Profile => "profile_id",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierMode::Device => "device",
            IdentifierMode::Profile => "profile",
        }
    }
}

impl std::str::FromStr for IdentifierMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "device" => Ok(IdentifierMode::Device),
            "profile" => Ok(IdentifierMode::Profile),
            _ => Err(format!("unknown identifier mode: {}", s)),
        }
    }
}

// ============================================
// Event Record
// ============================================

/// A single event to be imported.
///
/// Only the fields selected by the importer's identifier mode and column set
/// end up in the CSV output; everything else is ignored. String values are
/// written verbatim, so they must not contain commas or newlines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub application_id: u64,

    /// Used in [`IdentifierMode::Device`]
    #[serde(rename = "appmetrica_device_id", default)]
    pub device_id: u64,

    /// Used in [`IdentifierMode::Profile`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,

    pub event_name: String,

    /// Seconds since the Unix epoch
    pub event_timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_ipv6: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_aid: Option<String>,
    #[serde(rename = "ios_ifa", default, skip_serializing_if = "Option::is_none")]
    pub ifa: Option<String>,
    #[serde(rename = "ios_ifv", default, skip_serializing_if = "Option::is_none")]
    pub ifv: Option<String>,

    /// Mobile country code, always rendered (0 when unknown)
    #[serde(default)]
    pub mcc: i32,
    /// Mobile network code, always rendered (0 when unknown)
    #[serde(default)]
    pub mnc: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows_aid: Option<String>,
}

impl EventRecord {
    /// Create a record with only the required fields set.
    pub fn new(
        application_id: u64,
        event_name: impl Into<String>,
        emitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            application_id,
            event_name: event_name.into(),
            event_timestamp: emitted_at.timestamp(),
            ..Default::default()
        }
    }

    /// Key the record by device identifier.
    pub fn with_device_id(mut self, device_id: u64) -> Self {
        self.device_id = device_id;
        self
    }

    /// Key the record by profile identifier.
    pub fn with_profile_id(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = Some(profile_id.into());
        self
    }

    /// Event time as a UTC datetime, if the timestamp is in range.
    pub fn emitted_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.event_timestamp, 0)
    }
}
