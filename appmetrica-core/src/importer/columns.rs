//! Optional column whitelist and the per-importer column set

use std::fmt;

/// An optional attribute column recognized by the import endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    AppPackageName,
    AppVersionName,
    ConnectionType,
    DeviceIpv6,
    DeviceLocale,
    DeviceManufacturer,
    DeviceModel,
    DeviceType,
    /// Accepted in the header but never populated
    EventJson,
    GoogleAid,
    IosIfa,
    IosIfv,
    Mcc,
    Mnc,
    OperatorName,
    OsName,
    OsVersion,
    SessionType,
    WindowsAid,
}

impl Column {
    /// Every recognized optional column, in wire-name order.
    pub const ALL: [Column; 19] = [
        Column::AppPackageName,
        Column::AppVersionName,
        Column::ConnectionType,
        Column::DeviceIpv6,
        Column::DeviceLocale,
        Column::DeviceManufacturer,
        Column::DeviceModel,
        Column::DeviceType,
        Column::EventJson,
        Column::GoogleAid,
        Column::IosIfa,
        Column::IosIfv,
        Column::Mcc,
        Column::Mnc,
        Column::OperatorName,
        Column::OsName,
        Column::OsVersion,
        Column::SessionType,
        Column::WindowsAid,
    ];

    /// Header name of the column (case-sensitive).
    pub fn name(&self) -> &'static str {
        match self {
            Column::AppPackageName => "app_package_name",
            Column::AppVersionName => "app_version_name",
            Column::ConnectionType => "connection_type",
            Column::DeviceIpv6 => "device_ipv6",
            Column::DeviceLocale => "device_locale",
            Column::DeviceManufacturer => "device_manufacturer",
            Column::DeviceModel => "device_model",
            Column::DeviceType => "device_type",
            Column::EventJson => "event_json",
            Column::GoogleAid => "google_aid",
            Column::IosIfa => "ios_ifa",
            Column::IosIfv => "ios_ifv",
            Column::Mcc => "mcc",
            Column::Mnc => "mnc",
            Column::OperatorName => "operator_name",
            Column::OsName => "os_name",
            Column::OsVersion => "os_version",
            Column::SessionType => "session_type",
            Column::WindowsAid => "windows_aid",
        }
    }

    /// Look up a column by its exact header name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|column| column.name() == name)
    }

    /// Whether the importer writes values for this column.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Column::EventJson)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered optional columns written after the required ones.
///
/// Built by filtering caller-supplied names against [`Column::ALL`]. Unknown
/// names and repeats are dropped without error; the remaining names keep the
/// order they were given in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl ColumnSet {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut columns = Vec::new();

        for name in names {
            let name = name.as_ref();
            match Column::from_name(name) {
                Some(column) if !columns.contains(&column) => columns.push(column),
                Some(_) => tracing::debug!(column = name, "Dropping repeated column"),
                None => tracing::debug!(column = name, "Dropping unrecognized column"),
            }
        }

        Self { columns }
    }

    pub fn iter(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Header names in row order.
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|column| column.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelist_names_roundtrip() {
        for column in Column::ALL {
            assert_eq!(Column::from_name(column.name()), Some(column));
        }
    }

    #[test]
    fn test_whitelist_is_case_sensitive() {
        assert_eq!(Column::from_name("mcc"), Some(Column::Mcc));
        assert_eq!(Column::from_name("MCC"), None);
        assert_eq!(Column::from_name("ios_ifa "), None);
    }

    #[test]
    fn test_unrecognized_names_dropped() {
        let set = ColumnSet::from_names(["mcc", "mnc", "bogus"]);
        assert_eq!(set.names(), vec!["mcc", "mnc"]);

        let set = ColumnSet::from_names(["bogus", "MCC"]);
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_order_preserved() {
        let set = ColumnSet::from_names(["os_version", "x", "app_version_name", "google_aid"]);
        assert_eq!(
            set.names(),
            vec!["os_version", "app_version_name", "google_aid"]
        );
    }

    #[test]
    fn test_repeats_dropped() {
        let set = ColumnSet::from_names(["mnc", "mcc", "mnc"]);
        assert_eq!(set.names(), vec!["mnc", "mcc"]);
    }

    #[test]
    fn test_event_json_is_recognized_but_unsupported() {
        let set = ColumnSet::from_names(["event_json"]);
        assert!(set.contains(Column::EventJson));
        assert!(!Column::EventJson.is_supported());
        assert!(Column::ALL
            .iter()
            .filter(|c| **c != Column::EventJson)
            .all(|c| c.is_supported()));
    }
}
