//! Integration documents: every configured cloud integration, from every
//! source, merged into one entry per key.
//!
//! A document is a JSON object:
//! ```json
//! {
//!   "s3": [...], "athena": [...], "bigQuery": [...],
//!   "azureStorage": [...], "alibaba": [...],
//!   "legacy": {
//!     "awsAthenaInfo": [...], "alibabaInfo": [...],
//!     "bigQueryConfig": [...], "azureStorageConfig": [...]
//!   }
//! }
//! ```
//! Every section is optional. Entries that fail to decode are logged and
//! skipped so one bad entry does not hide the others.

use std::{
    collections::{btree_map::Entry, BTreeMap},
    fs,
    path::Path,
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    athena::AthenaConfiguration,
    azure_storage::AzureStorageConfiguration,
    bigquery::BigQueryConfiguration,
    boa::BoaConfiguration,
    error::{ConfigError, Result, ResultExt},
    extract::{as_interface_map, get_optional_interface_value, value_kind, ValueMap},
    legacy::{self, AlibabaInfo, AwsAthenaInfo, AzureStorageConfig, BigQueryConfig},
    s3::S3Configuration,
    source::ConfigSource,
    Config,
    KeyedConfig,
};


const INTEGRATION_DOCUMENT_NAME: &str = "IntegrationDocument";


/// Any top-level configuration object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "config", rename_all = "camelCase")]
pub enum CloudConfig {
    S3(S3Configuration),
    Athena(AthenaConfiguration),
    BigQuery(BigQueryConfiguration),
    AzureStorage(AzureStorageConfiguration),
    #[serde(rename = "alibaba")]
    Boa(BoaConfiguration),
}

impl CloudConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::S3(_) => "s3",
            Self::Athena(_) => "athena",
            Self::BigQuery(_) => "bigQuery",
            Self::AzureStorage(_) => "azureStorage",
            Self::Boa(_) => "alibaba",
        }
    }
}

impl Config for CloudConfig {
    fn validate(&self) -> Result<()> {
        match self {
            Self::S3(config) => config.validate(),
            Self::Athena(config) => config.validate(),
            Self::BigQuery(config) => config.validate(),
            Self::AzureStorage(config) => config.validate(),
            Self::Boa(config) => config.validate(),
        }
    }
}

impl KeyedConfig for CloudConfig {
    fn key(&self) -> String {
        match self {
            Self::S3(config) => config.key(),
            Self::Athena(config) => config.key(),
            Self::BigQuery(config) => config.key(),
            Self::AzureStorage(config) => config.key(),
            Self::Boa(config) => config.key(),
        }
    }
}

impl From<S3Configuration> for CloudConfig {
    fn from(config: S3Configuration) -> Self {
        Self::S3(config)
    }
}

impl From<AthenaConfiguration> for CloudConfig {
    fn from(config: AthenaConfiguration) -> Self {
        Self::Athena(config)
    }
}

impl From<BigQueryConfiguration> for CloudConfig {
    fn from(config: BigQueryConfiguration) -> Self {
        Self::BigQuery(config)
    }
}

impl From<AzureStorageConfiguration> for CloudConfig {
    fn from(config: AzureStorageConfiguration) -> Self {
        Self::AzureStorage(config)
    }
}

impl From<BoaConfiguration> for CloudConfig {
    fn from(config: BoaConfiguration) -> Self {
        Self::Boa(config)
    }
}


/// A configuration and the source it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcedConfig {
    pub source: ConfigSource,

    #[serde(flatten)]
    pub config: CloudConfig,
}

impl SourcedConfig {
    pub fn new<C: Into<CloudConfig>>(source: ConfigSource, config: C) -> Self {
        Self {
            source,
            config: config.into(),
        }
    }
}


/***
 * Loading
 */

fn section<'a>(map: &'a ValueMap, name: &str) -> Result<&'a [Value]> {
    let section = get_optional_interface_value::<&Value>(map, name)?;

    match section {
        None => Ok(&[]),
        Some(Value::Array(entries)) => Ok(entries.as_slice()),
        Some(other) => Err(ConfigError::TypeMismatch {
            key: name.to_string(),
            expected: "array",
            found: value_kind(other),
        }),
    }
}

fn decode_entries<T, F>(map: &ValueMap, name: &str, mut decode: F) -> Result<Vec<T>>
where
    F: FnMut(&Value) -> Result<T>,
{
    let mut decoded = Vec::new();

    for (index, entry) in section(map, name)?.iter().enumerate() {
        match decode(entry) {
            Ok(config) => decoded.push(config),
            Err(error) => warn!("Skipping {name}[{index}]: {error}"),
        }
    }

    Ok(decoded)
}

fn decode_legacy_entries<T, F>(map: &ValueMap, name: &str, convert: F) -> Result<Vec<CloudConfig>>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Option<CloudConfig>,
{
    let records = decode_entries(map, name, |entry| {
        serde_json::from_value::<T>(entry.clone()).map_err(ConfigError::from)
    })?;

    Ok(records.iter().filter_map(convert).collect())
}

/// Decodes every integration in an untyped document.
pub fn configs_from_interface(value: &Value, source: ConfigSource) -> Result<Vec<SourcedConfig>> {
    let map = as_interface_map(value).prefixed(INTEGRATION_DOCUMENT_NAME)?;
    let configs = configs_from_interface_map(map, source).prefixed(INTEGRATION_DOCUMENT_NAME)?;

    Ok(configs
        .into_iter()
        .map(|config| SourcedConfig::new(source, config))
        .collect())
}

fn configs_from_interface_map(map: &ValueMap, source: ConfigSource) -> Result<Vec<CloudConfig>> {
    let mut configs: Vec<CloudConfig> = Vec::new();

    configs.extend(
        decode_entries(map, "s3", S3Configuration::from_interface)?
            .into_iter()
            .map(CloudConfig::from),
    );
    configs.extend(
        decode_entries(map, "athena", AthenaConfiguration::from_interface)?
            .into_iter()
            .map(CloudConfig::from),
    );
    configs.extend(
        decode_entries(map, "bigQuery", BigQueryConfiguration::from_interface)?
            .into_iter()
            .map(CloudConfig::from),
    );
    configs.extend(
        decode_entries(map, "azureStorage", AzureStorageConfiguration::from_interface)?
            .into_iter()
            .map(CloudConfig::from),
    );
    configs.extend(
        decode_entries(map, "alibaba", BoaConfiguration::from_interface)?
            .into_iter()
            .map(CloudConfig::from),
    );

    if let Some(legacy) = get_optional_interface_value::<&ValueMap>(map, "legacy")? {
        configs.extend(decode_legacy_entries::<AwsAthenaInfo, _>(
            legacy,
            "awsAthenaInfo",
            legacy::convert_aws_athena_info,
        )?);
        configs.extend(decode_legacy_entries::<AlibabaInfo, _>(legacy, "alibabaInfo", |info| {
            legacy::convert_alibaba_info(info).map(CloudConfig::from)
        })?);
        configs.extend(decode_legacy_entries::<BigQueryConfig, _>(legacy, "bigQueryConfig", |config| {
            legacy::convert_bigquery_config(config).map(CloudConfig::from)
        })?);
        configs.extend(decode_legacy_entries::<AzureStorageConfig, _>(
            legacy,
            "azureStorageConfig",
            |config| legacy::convert_azure_storage_config(config).map(CloudConfig::from),
        )?);
    }

    debug!("Decoded {} integration(s) from {source} document.", configs.len());
    Ok(configs)
}

/// Reads and decodes an integration document file.
pub fn load_integration_file(path: &Path, source: ConfigSource) -> Result<Vec<SourcedConfig>> {
    let contents = fs::read_to_string(path).map_err(|error| {
        ConfigError::delegated_with_source(
            format!("failed to read integration file {}", path.display()),
            error,
        )
    })?;

    let value: Value = serde_json::from_str(&contents)?;
    configs_from_interface(&value, source)
}


/***
 * Merging
 */

/// Keeps one configuration per [`KeyedConfig::key`].
///
/// The entry from the higher-priority [`ConfigSource`] wins. Between entries
/// of equal priority the first one is kept. The result is ordered by key.
pub fn merge_by_key<I>(configs: I) -> Vec<SourcedConfig>
where
    I: IntoIterator<Item = SourcedConfig>,
{
    let mut merged: BTreeMap<String, SourcedConfig> = BTreeMap::new();

    for candidate in configs {
        match merged.entry(candidate.config.key()) {
            Entry::Vacant(entry) => {
                entry.insert(candidate);
            }
            Entry::Occupied(mut entry) => {
                let current = entry.get();

                if candidate.source > current.source {
                    debug!(
                        "Integration {} from {} overrides {}.",
                        entry.key(),
                        candidate.source,
                        current.source
                    );
                    entry.insert(candidate);
                } else if candidate.source == current.source
                    && !current.config.equals(Some(&candidate.config))
                {
                    warn!(
                        "Conflicting integrations for key {} from {}; keeping the first.",
                        entry.key(),
                        candidate.source
                    );
                }
            }
        }
    }

    merged.into_values().collect()
}


#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;
    use crate::cloud::{
        aws::{AwsAccessKey, AwsServiceAccount},
        REDACTED,
    };

    fn s3(bucket: &str, secret: &str) -> S3Configuration {
        S3Configuration {
            bucket: bucket.to_string(),
            region: "us-east-1".to_string(),
            account: "account".to_string(),
            configurer: Some(AwsAccessKey::new("id", secret).into()),
        }
    }

    fn document() -> Value {
        json!({
            "s3": [
                {
                    "bucket": "cur",
                    "region": "us-east-1",
                    "account": "account",
                    "configurer": { "id": "id", "secret": "secret" },
                },
            ],
            "athena": [
                {
                    "bucket": "results",
                    "region": "us-east-1",
                    "database": "db",
                    "table": "cur",
                    "account": "account",
                    "configurer": { "type": "AWSServiceAccount" },
                },
                { "bucket": "broken" },
            ],
            "bigQuery": [],
            "legacy": {
                "alibabaInfo": [
                    {
                        "clusterRegion": "cn-hangzhou",
                        "accountID": "ali",
                        "serviceKeyName": "LTAI",
                        "serviceKeySecret": "secret",
                    },
                    {},
                ],
            },
        })
    }

    // ── CloudConfig ──

    #[test]
    fn test_cloud_config_delegates() {
        let config = CloudConfig::from(s3("bucket", "secret"));

        assert_eq!(config.kind(), "s3");
        assert_eq!(config.key(), "account/bucket");
        assert!(config.validate().is_ok());
        assert!(!config.equals(Some(&CloudConfig::from(s3("bucket", "other")))));
    }

    #[test]
    fn test_sourced_config_serializes_sanitized() {
        let sourced = SourcedConfig::new(ConfigSource::Helm, s3("bucket", "secret"));
        let value = serde_json::to_value(&sourced).unwrap();

        assert_eq!(value["source"], json!("helm"));
        assert_eq!(value["kind"], json!("s3"));
        assert_eq!(value["config"]["bucket"], json!("bucket"));
        assert_eq!(value["config"]["configurer"]["values"]["secret"], json!(REDACTED));
    }

    // ── loading ──

    #[test]
    fn test_configs_from_interface() {
        let configs = configs_from_interface(&document(), ConfigSource::ConfigFile).unwrap();

        let kinds: Vec<_> = configs.iter().map(|sourced| sourced.config.kind()).collect();
        assert_eq!(kinds, ["s3", "athena", "alibaba"]);
        assert!(configs.iter().all(|sourced| sourced.source == ConfigSource::ConfigFile));

        let CloudConfig::Athena(athena) = &configs[1].config else {
            panic!("expected athena configuration");
        };
        assert_eq!(athena.configurer, Some(AwsServiceAccount.into()));
    }

    #[test]
    fn test_configs_from_interface_rejects_bad_documents() {
        let error = configs_from_interface(&json!([]), ConfigSource::Helm).unwrap_err();
        assert!(matches!(error.root(), ConfigError::Shape { .. }));

        let error = configs_from_interface(&json!({ "s3": {} }), ConfigSource::Helm).unwrap_err();
        assert_eq!(
            error.to_string(),
            "IntegrationDocument: property 's3' had expected type 'array' but found 'map'"
        );
    }

    #[test]
    fn test_empty_document() {
        let configs = configs_from_interface(&json!({}), ConfigSource::Helm).unwrap();
        assert!(configs.is_empty());
    }

    #[test]
    fn test_load_integration_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", document()).unwrap();

        let configs = load_integration_file(file.path(), ConfigSource::MultiCloud).unwrap();
        assert_eq!(configs.len(), 3);

        let error = load_integration_file(Path::new("/nonexistent/integrations.json"), ConfigSource::Helm)
            .unwrap_err();
        assert!(matches!(error, ConfigError::Delegated { .. }));
    }

    #[test]
    fn test_load_integration_file_with_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let error = load_integration_file(file.path(), ConfigSource::Helm).unwrap_err();
        assert!(matches!(error, ConfigError::Json(_)));
    }

    // ── merge_by_key ──

    #[test]
    fn test_merge_prefers_higher_priority_source() {
        let merged = merge_by_key([
            SourcedConfig::new(ConfigSource::ConfigController, s3("bucket", "controller")),
            SourcedConfig::new(ConfigSource::Helm, s3("bucket", "helm")),
            SourcedConfig::new(ConfigSource::ConfigFile, s3("bucket", "file")),
        ]);

        assert_eq!(merged, [SourcedConfig::new(ConfigSource::Helm, s3("bucket", "helm"))]);
    }

    #[test]
    fn test_merge_equal_priority_keeps_first() {
        let merged = merge_by_key([
            SourcedConfig::new(ConfigSource::ConfigFile, s3("bucket", "first")),
            SourcedConfig::new(ConfigSource::ConfigFile, s3("bucket", "second")),
        ]);

        assert_eq!(merged, [SourcedConfig::new(ConfigSource::ConfigFile, s3("bucket", "first"))]);
    }

    #[test]
    fn test_merge_keeps_distinct_keys_sorted() {
        let merged = merge_by_key([
            SourcedConfig::new(ConfigSource::Helm, s3("b", "secret")),
            SourcedConfig::new(ConfigSource::Unknown, s3("a", "secret")),
        ]);

        let keys: Vec<_> = merged.iter().map(|sourced| sourced.config.key()).collect();
        assert_eq!(keys, ["account/a", "account/b"]);
    }
}
