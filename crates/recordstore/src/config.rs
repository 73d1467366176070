use std::env;

use recordstore_core::pagination::DEFAULT_MAX_PAGES;
use recordstore_core::TableNameMapper;

/// Client settings loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Prepended to every logical table name (default: "")
    pub table_name_prefix: String,
    /// Appended to every logical table name (default: "")
    pub table_name_suffix: String,
    /// Pages a single query or scan may drain before giving up (default: 10,000)
    pub max_pages: usize,
}

impl ClientSettings {
    /// Load settings from environment variables.
    ///
    /// Environment variables:
    /// - `RECORDSTORE_TABLE_PREFIX` - Table name prefix (default: "")
    /// - `RECORDSTORE_TABLE_SUFFIX` - Table name suffix (default: "")
    /// - `RECORDSTORE_MAX_PAGES` - Page limit per fetch (default: 10,000)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any variable source, `from_env` included.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            table_name_prefix: lookup("RECORDSTORE_TABLE_PREFIX").unwrap_or_default(),
            table_name_suffix: lookup("RECORDSTORE_TABLE_SUFFIX").unwrap_or_default(),
            max_pages: lookup("RECORDSTORE_MAX_PAGES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_PAGES),
        }
    }

    pub fn with_table_names(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            table_name_prefix: prefix.into(),
            table_name_suffix: suffix.into(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn table_names(&self) -> TableNameMapper {
        TableNameMapper::new(&self.table_name_prefix, &self.table_name_suffix)
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::with_table_names("", "")
    }
}

/// Where the store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSettings {
    /// Custom endpoint URL. When set, the client talks to a local emulator
    /// with dummy credentials.
    pub endpoint_url: Option<String>,
    /// AWS region (default: "us-east-1")
    pub region: String,
}

impl AwsSettings {
    pub const DEFAULT_REGION: &'static str = "us-east-1";

    /// Load settings from `AWS_ENDPOINT_URL` and `AWS_REGION`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            endpoint_url: lookup("AWS_ENDPOINT_URL"),
            region: lookup("AWS_REGION").unwrap_or_else(|| Self::DEFAULT_REGION.to_string()),
        }
    }

    pub fn emulator(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: Some(endpoint_url.into()),
            region: Self::DEFAULT_REGION.to_string(),
        }
    }

    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({})", url),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_table_names_from_settings() {
        let settings = ClientSettings::with_table_names("alternator-", "-test");
        assert_eq!(
            settings.table_names().long_name("stringHash"),
            "alternator-stringHash-test"
        );
        assert_eq!(settings.max_pages, DEFAULT_MAX_PAGES);
    }

    #[test]
    fn test_default_values() {
        let settings = ClientSettings::from_lookup(|_| None);
        assert_eq!(settings, ClientSettings::default());

        let aws = AwsSettings::from_lookup(|_| None);
        assert_eq!(aws.endpoint_url, None);
        assert_eq!(aws.region, AwsSettings::DEFAULT_REGION);
    }

    #[test]
    fn test_values_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("RECORDSTORE_TABLE_PREFIX", "alternator-"),
            ("RECORDSTORE_TABLE_SUFFIX", "-test"),
            ("RECORDSTORE_MAX_PAGES", "25"),
            ("AWS_ENDPOINT_URL", "http://localhost:8000"),
            ("AWS_REGION", "eu-west-1"),
        ]
        .into_iter()
        .collect();
        let lookup = |key: &str| vars.get(key).map(|v| v.to_string());

        let settings = ClientSettings::from_lookup(lookup);
        assert_eq!(settings.table_names().long_name("stringHash"), "alternator-stringHash-test");
        assert_eq!(settings.max_pages, 25);

        let aws = AwsSettings::from_lookup(lookup);
        assert_eq!(
            aws,
            AwsSettings {
                endpoint_url: Some("http://localhost:8000".to_string()),
                region: "eu-west-1".to_string(),
            }
        );
    }

    #[test]
    fn test_unparseable_max_pages_falls_back() {
        let settings = ClientSettings::from_lookup(|key| {
            (key == "RECORDSTORE_MAX_PAGES").then(|| "lots".to_string())
        });
        assert_eq!(settings.max_pages, DEFAULT_MAX_PAGES);
    }

    #[test]
    fn test_target_display() {
        let local = AwsSettings::emulator("http://localhost:8000");
        assert_eq!(local.target_display(), "Local DynamoDB (http://localhost:8000)");

        let remote = AwsSettings {
            endpoint_url: None,
            region: "eu-west-1".to_string(),
        };
        assert_eq!(remote.target_display(), "AWS DynamoDB (region: eu-west-1)");
    }
}
