//! GCP credential strategies: a service-account key file, or workload
//! identity / application default credentials.

use std::{collections::BTreeMap, fmt, path::PathBuf};

use serde_json::Value;
use tracing::debug;

use super::{
    context::ClientContext,
    dto::{check_depth, redact_value, Configurer, ConfigurerDto, REDACTED},
    error::{ConfigError, Result, ResultExt},
    extract::{as_interface_map, get_interface_value, value_kind, ValueMap},
    Config,
};


pub const GCP_ACCESS_KEY_TYPE: &str = "GCPAccessKey";
pub const GCP_WORKLOAD_IDENTITY_TYPE: &str = "GCPWorkLoadIdentity";

const GCP_KEY_NAME: &str = "GCPKey";

pub type GcpConfigurerDto = ConfigurerDto<GcpConfigurer>;


/// How a GCP client should authenticate.
#[derive(Clone, PartialEq, Eq)]
pub enum GcpClientOption {
    /// Explicit service-account key JSON.
    CredentialsJson(String),

    /// Application default credentials; `credentials_file` is
    /// `GOOGLE_APPLICATION_CREDENTIALS` when set, otherwise the metadata server is used.
    ApplicationDefault { credentials_file: Option<PathBuf> },
}

impl fmt::Debug for GcpClientOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CredentialsJson(_) => f.debug_tuple("CredentialsJson").field(&REDACTED).finish(),
            Self::ApplicationDefault { credentials_file } => f
                .debug_struct("ApplicationDefault")
                .field("credentials_file", credentials_file)
                .finish(),
        }
    }
}


/// The contents of a service-account key file, flattened to strings.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct GcpKey {
    key: BTreeMap<String, String>,
}

impl fmt::Debug for GcpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Field names only; every value of a key file is potentially sensitive.
        f.debug_struct("GcpKey")
            .field("key", &self.key.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl GcpKey {
    pub fn new(key: BTreeMap<String, String>) -> Self {
        Self { key }
    }

    pub fn key(&self) -> &BTreeMap<String, String> {
        &self.key
    }

    fn from_interface_map(map: &ValueMap) -> Result<Self> {
        let key_values: &ValueMap = get_interface_value(map, "key").prefixed(GCP_KEY_NAME)?;

        let mut key = BTreeMap::new();
        for (name, value) in key_values {
            let Some(value) = value.as_str() else {
                return Err(ConfigError::TypeMismatch {
                    key: format!("key.{name}"),
                    expected: "string",
                    found: value_kind(value),
                }
                .prefixed(GCP_KEY_NAME));
            };

            key.insert(name.clone(), value.to_string());
        }

        Ok(Self { key })
    }

    pub fn to_dto(&self) -> GcpConfigurerDto {
        let key = self
            .key
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect::<ValueMap>();

        let mut values = ValueMap::with_capacity(1);
        values.insert("key".to_string(), Value::Object(key));

        GcpConfigurerDto::new(GCP_ACCESS_KEY_TYPE, values)
    }

    pub fn create_client_option(&self, context: &ClientContext) -> Result<GcpClientOption> {
        self.validate()?;
        context.check()?;

        let credentials_json = serde_json::to_string(&self.key).map_err(|error| {
            ConfigError::delegated_with_source("failed to marshal key", error).prefixed(GCP_KEY_NAME)
        })?;

        Ok(GcpClientOption::CredentialsJson(credentials_json))
    }
}

impl Config for GcpKey {
    fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(ConfigError::missing_field(GCP_KEY_NAME, "Key"));
        }

        Ok(())
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GcpWorkloadIdentity;

impl GcpWorkloadIdentity {
    pub fn to_dto(&self) -> GcpConfigurerDto {
        GcpConfigurerDto::new(GCP_WORKLOAD_IDENTITY_TYPE, ValueMap::new())
    }

    pub fn create_client_option(&self, context: &ClientContext) -> Result<GcpClientOption> {
        context.check()?;

        let credentials_file = context
            .env_var("GOOGLE_APPLICATION_CREDENTIALS")
            .map(PathBuf::from);
        if credentials_file.is_none() {
            debug!("GCPWorkLoadIdentity: no credentials file set, using metadata server.");
        }

        Ok(GcpClientOption::ApplicationDefault { credentials_file })
    }
}

impl Config for GcpWorkloadIdentity {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GcpConfigurer {
    Key(GcpKey),
    WorkloadIdentity(GcpWorkloadIdentity),
}

impl From<GcpKey> for GcpConfigurer {
    fn from(key: GcpKey) -> Self {
        Self::Key(key)
    }
}

impl From<GcpWorkloadIdentity> for GcpConfigurer {
    fn from(workload_identity: GcpWorkloadIdentity) -> Self {
        Self::WorkloadIdentity(workload_identity)
    }
}

impl GcpConfigurer {
    pub fn create_client_option(&self, context: &ClientContext) -> Result<GcpClientOption> {
        match self {
            Self::Key(key) => key.create_client_option(context),
            Self::WorkloadIdentity(workload_identity) => {
                workload_identity.create_client_option(context)
            }
        }
    }
}

impl Config for GcpConfigurer {
    fn validate(&self) -> Result<()> {
        match self {
            Self::Key(key) => key.validate(),
            Self::WorkloadIdentity(workload_identity) => workload_identity.validate(),
        }
    }
}

impl Configurer for GcpConfigurer {
    const TYPE_NAME: &'static str = "GCPConfigurer";
    const DTO_NAME: &'static str = "GCPConfigurerDTO";
    const TYPE_TAGS: &'static [&'static str] = &[GCP_ACCESS_KEY_TYPE, GCP_WORKLOAD_IDENTITY_TYPE];
    const SHAPE_KEYS: &'static [&'static str] = &["key"];

    fn from_interface_at_depth(value: &Value, depth: usize) -> Result<Option<Self>> {
        check_depth(depth).prefixed(Self::TYPE_NAME)?;

        if value.is_null() {
            return Ok(None);
        }

        let map = as_interface_map(value).prefixed(Self::TYPE_NAME)?;

        if map.is_empty() {
            return Ok(Some(GcpWorkloadIdentity.into()));
        }

        if map.contains_key("key") {
            return GcpKey::from_interface_map(map).map(|configurer| Some(configurer.into()));
        }

        if map.contains_key("type") {
            return GcpConfigurerDto::from_interface_map(map)?.resolve_configurer(depth);
        }

        Err(ConfigError::UnrecognizedShape.prefixed(Self::TYPE_NAME))
    }

    fn decode_tagged(type_tag: &str, values: &ValueMap, _depth: usize) -> Result<Self> {
        match type_tag {
            GCP_ACCESS_KEY_TYPE => GcpKey::from_interface_map(values).map(Self::from),
            GCP_WORKLOAD_IDENTITY_TYPE => Ok(GcpWorkloadIdentity.into()),
            _ => Err(ConfigError::UnrecognizedVariant(type_tag.to_string())),
        }
    }

    fn to_dto(&self) -> GcpConfigurerDto {
        match self {
            Self::Key(key) => key.to_dto(),
            Self::WorkloadIdentity(workload_identity) => workload_identity.to_dto(),
        }
    }

    fn sanitize_values(type_tag: &str, values: &mut ValueMap) {
        if type_tag == GCP_ACCESS_KEY_TYPE {
            redact_value(values, "key");
        }
    }
}
