//! Azure credential strategies. Only storage-account shared keys are supported.

use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;

use super::{
    context::ClientContext,
    dto::{check_depth, redact_value, Configurer, ConfigurerDto, REDACTED},
    error::{ConfigError, Result, ResultExt},
    extract::{as_interface_map, get_interface_value, ValueMap},
    Config,
};


pub const AZURE_ACCESS_KEY_TYPE: &str = "AzureAccessKey";

pub type AzureConfigurerDto = ConfigurerDto<AzureConfigurer>;


/// A decoded storage-account shared key, ready to sign blob requests.
#[derive(Clone, PartialEq, Eq)]
pub struct AzureSharedKeyCredential {
    pub account_name: String,
    pub account_key: Vec<u8>,
}

impl fmt::Debug for AzureSharedKeyCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureSharedKeyCredential")
            .field("account_name", &self.account_name)
            .field("account_key", &REDACTED)
            .finish()
    }
}


#[derive(Clone, PartialEq, Eq, Default)]
pub struct AzureAccessKey {
    pub access_key: String,
    pub account: String,
}

impl fmt::Debug for AzureAccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureAccessKey")
            .field("access_key", &REDACTED)
            .field("account", &self.account)
            .finish()
    }
}

impl AzureAccessKey {
    pub fn new<K, A>(access_key: K, account: A) -> Self
    where
        K: Into<String>,
        A: Into<String>,
    {
        Self {
            access_key: access_key.into(),
            account: account.into(),
        }
    }

    fn from_interface_map(map: &ValueMap) -> Result<Self> {
        // Hand-written documents in the wild use both spellings.
        let access_key_name = if map.contains_key("accessKey") {
            "accessKey"
        } else {
            "accesskey"
        };

        let access_key: String =
            get_interface_value(map, access_key_name).prefixed(AZURE_ACCESS_KEY_TYPE)?;
        let account: String = get_interface_value(map, "account").prefixed(AZURE_ACCESS_KEY_TYPE)?;

        Ok(Self { access_key, account })
    }

    pub fn to_dto(&self) -> AzureConfigurerDto {
        let mut values = ValueMap::with_capacity(2);
        values.insert("accessKey".to_string(), Value::String(self.access_key.clone()));
        values.insert("account".to_string(), Value::String(self.account.clone()));

        AzureConfigurerDto::new(AZURE_ACCESS_KEY_TYPE, values)
    }

    pub fn blob_credentials(&self, context: &ClientContext) -> Result<AzureSharedKeyCredential> {
        self.validate()?;
        context.check()?;

        let account_key = general_purpose::STANDARD
            .decode(self.access_key.trim())
            .map_err(|error| {
                ConfigError::delegated_with_source("failed to decode storage account key", error)
                    .prefixed(AZURE_ACCESS_KEY_TYPE)
            })?;

        Ok(AzureSharedKeyCredential {
            account_name: self.account.clone(),
            account_key,
        })
    }
}

impl Config for AzureAccessKey {
    fn validate(&self) -> Result<()> {
        if self.access_key.is_empty() {
            return Err(ConfigError::missing_field(AZURE_ACCESS_KEY_TYPE, "access key"));
        }

        if self.account.is_empty() {
            return Err(ConfigError::missing_field(AZURE_ACCESS_KEY_TYPE, "account"));
        }

        Ok(())
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AzureConfigurer {
    AccessKey(AzureAccessKey),
}

impl From<AzureAccessKey> for AzureConfigurer {
    fn from(access_key: AzureAccessKey) -> Self {
        Self::AccessKey(access_key)
    }
}

impl AzureConfigurer {
    pub fn blob_credentials(&self, context: &ClientContext) -> Result<AzureSharedKeyCredential> {
        match self {
            Self::AccessKey(access_key) => access_key.blob_credentials(context),
        }
    }
}

impl Config for AzureConfigurer {
    fn validate(&self) -> Result<()> {
        match self {
            Self::AccessKey(access_key) => access_key.validate(),
        }
    }
}

impl Configurer for AzureConfigurer {
    const TYPE_NAME: &'static str = "AzureConfigurer";
    const DTO_NAME: &'static str = "AzureConfigurerDTO";
    const TYPE_TAGS: &'static [&'static str] = &[AZURE_ACCESS_KEY_TYPE];
    const SHAPE_KEYS: &'static [&'static str] = &["accessKey", "accesskey"];

    fn from_interface_at_depth(value: &Value, depth: usize) -> Result<Option<Self>> {
        check_depth(depth).prefixed(Self::TYPE_NAME)?;

        if value.is_null() {
            return Ok(None);
        }

        let map = as_interface_map(value).prefixed(Self::TYPE_NAME)?;

        if map.contains_key("accessKey") || map.contains_key("accesskey") {
            return AzureAccessKey::from_interface_map(map).map(|configurer| Some(configurer.into()));
        }

        if map.contains_key("type") {
            return AzureConfigurerDto::from_interface_map(map)?.resolve_configurer(depth);
        }

        Err(ConfigError::UnrecognizedShape.prefixed(Self::TYPE_NAME))
    }

    fn decode_tagged(type_tag: &str, values: &ValueMap, _depth: usize) -> Result<Self> {
        match type_tag {
            AZURE_ACCESS_KEY_TYPE => AzureAccessKey::from_interface_map(values).map(Self::from),
            _ => Err(ConfigError::UnrecognizedVariant(type_tag.to_string())),
        }
    }

    fn to_dto(&self) -> AzureConfigurerDto {
        match self {
            Self::AccessKey(access_key) => access_key.to_dto(),
        }
    }

    fn sanitize_values(type_tag: &str, values: &mut ValueMap) {
        if type_tag == AZURE_ACCESS_KEY_TYPE {
            redact_value(values, "accessKey");
            redact_value(values, "accesskey");
        }
    }
}
