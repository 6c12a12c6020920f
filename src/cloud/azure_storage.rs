//! Azure storage container receiving cost-management exports.

use serde::Serialize;
use serde_json::Value;

use super::{
    azure::{AzureConfigurer, AzureConfigurerDto, AzureSharedKeyCredential},
    context::ClientContext,
    dto::{configurer_dto_entry, configurer_entry, Configurer},
    error::{ConfigError, Result, ResultExt},
    extract::{as_interface_map, get_interface_value, get_optional_string, ValueMap},
    require_field,
    validate_configurer,
    Config,
    ConfigDto,
    KeyedConfig,
};


const AZURE_STORAGE_CONFIGURATION_NAME: &str = "AzureStorageConfiguration";
const AZURE_STORAGE_CONFIGURATION_DTO_NAME: &str = "AzureStorageConfigurationDTO";

const PUBLIC_BLOB_HOST: &str = "blob.core.windows.net";
const GOVERNMENT_BLOB_HOST: &str = "blob.core.usgovcloudapi.net";


#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AzureStorageConfiguration {
    pub subscription_id: String,
    pub account: String,
    pub container: String,

    /// Optional prefix of the exports inside the container.
    pub path: String,

    /// Optional cloud name; anything mentioning "gov" selects the US government cloud.
    pub cloud: String,

    pub configurer: Option<AzureConfigurer>,
}

impl AzureStorageConfiguration {
    pub fn from_interface(value: &Value) -> Result<Self> {
        let map = as_interface_map(value).prefixed(AZURE_STORAGE_CONFIGURATION_NAME)?;
        Self::from_interface_map(map).prefixed(AZURE_STORAGE_CONFIGURATION_NAME)
    }

    fn from_interface_map(map: &ValueMap) -> Result<Self> {
        Ok(Self {
            subscription_id: get_interface_value(map, "subscriptionID")?,
            account: get_interface_value(map, "account")?,
            container: get_interface_value(map, "container")?,
            path: get_optional_string(map, "path")?,
            cloud: get_optional_string(map, "cloud")?,
            configurer: configurer_entry(map)?,
        })
    }

    pub fn to_dto(&self) -> AzureStorageConfigurationDto {
        AzureStorageConfigurationDto {
            subscription_id: self.subscription_id.clone(),
            account: self.account.clone(),
            container: self.container.clone(),
            path: self.path.clone(),
            cloud: self.cloud.clone(),
            configurer: self.configurer.as_ref().map(Configurer::to_dto),
        }
    }

    pub fn from_dto(dto: &AzureStorageConfigurationDto) -> Self {
        Self {
            subscription_id: dto.subscription_id.clone(),
            account: dto.account.clone(),
            container: dto.container.clone(),
            path: dto.path.clone(),
            cloud: dto.cloud.clone(),
            configurer: dto.configurer.as_ref().and_then(AzureConfigurerDto::to_configurer),
        }
    }

    pub fn is_government_cloud(&self) -> bool {
        self.cloud.to_lowercase().contains("gov")
    }

    /// URL of the container in the cloud the account lives in.
    pub fn blob_container_url(&self) -> String {
        let host = if self.is_government_cloud() {
            GOVERNMENT_BLOB_HOST
        } else {
            PUBLIC_BLOB_HOST
        };

        format!("https://{}.{}/{}", self.account, host, self.container)
    }

    pub fn blob_credentials(&self, context: &ClientContext) -> Result<AzureSharedKeyCredential> {
        let configurer = self.configurer.as_ref().ok_or_else(|| {
            ConfigError::missing_field(AZURE_STORAGE_CONFIGURATION_NAME, "configurer")
        })?;

        configurer
            .blob_credentials(context)
            .prefixed(AZURE_STORAGE_CONFIGURATION_NAME)
    }
}

impl Config for AzureStorageConfiguration {
    fn validate(&self) -> Result<()> {
        validate_configurer(self.configurer.as_ref(), AZURE_STORAGE_CONFIGURATION_NAME)?;

        require_field(&self.subscription_id, AZURE_STORAGE_CONFIGURATION_NAME, "Subscription ID")?;
        require_field(&self.account, AZURE_STORAGE_CONFIGURATION_NAME, "Account")?;
        require_field(&self.container, AZURE_STORAGE_CONFIGURATION_NAME, "Container")?;

        Ok(())
    }
}

impl KeyedConfig for AzureStorageConfiguration {
    fn key(&self) -> String {
        let key = format!("{}/{}", self.subscription_id, self.container);
        if self.path.is_empty() {
            return key;
        }

        format!("{key}/{}", self.path)
    }
}

serialize_sanitized_dto!(AzureStorageConfiguration);
deserialize_from_interface!(AzureStorageConfiguration);


#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AzureStorageConfigurationDto {
    #[serde(rename = "subscriptionID")]
    pub subscription_id: String,
    pub account: String,
    pub container: String,
    pub path: String,
    pub cloud: String,
    pub configurer: Option<AzureConfigurerDto>,
}

impl AzureStorageConfigurationDto {
    pub fn from_interface(value: &Value) -> Result<Self> {
        let map = as_interface_map(value).prefixed(AZURE_STORAGE_CONFIGURATION_DTO_NAME)?;
        Self::from_interface_map(map).prefixed(AZURE_STORAGE_CONFIGURATION_DTO_NAME)
    }

    fn from_interface_map(map: &ValueMap) -> Result<Self> {
        Ok(Self {
            subscription_id: get_interface_value(map, "subscriptionID")?,
            account: get_interface_value(map, "account")?,
            container: get_interface_value(map, "container")?,
            path: get_optional_string(map, "path")?,
            cloud: get_optional_string(map, "cloud")?,
            configurer: configurer_dto_entry(map)?,
        })
    }
}

impl ConfigDto for AzureStorageConfigurationDto {
    fn sanitize(&mut self) {
        if let Some(configurer) = self.configurer.as_mut() {
            configurer.sanitize();
        }
    }
}

deserialize_from_interface!(AzureStorageConfigurationDto);
