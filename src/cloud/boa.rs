//! Alibaba BSS open API (billing) configuration.

use serde::Serialize;
use serde_json::Value;

use super::{
    alibaba::{AlibabaAccessKeyCredential, AlibabaConfigurer, AlibabaConfigurerDto},
    context::ClientContext,
    dto::{configurer_dto_entry, configurer_entry, Configurer},
    error::{ConfigError, Result, ResultExt},
    extract::{as_interface_map, get_interface_value, ValueMap},
    require_field,
    validate_configurer,
    Config,
    ConfigDto,
    KeyedConfig,
};


const BOA_CONFIGURATION_NAME: &str = "BoaConfiguration";
const BOA_CONFIGURATION_DTO_NAME: &str = "BoaConfigurationDTO";


#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoaConfiguration {
    pub account: String,
    pub region: String,
    pub configurer: Option<AlibabaConfigurer>,
}

impl BoaConfiguration {
    pub fn from_interface(value: &Value) -> Result<Self> {
        let map = as_interface_map(value).prefixed(BOA_CONFIGURATION_NAME)?;
        Self::from_interface_map(map).prefixed(BOA_CONFIGURATION_NAME)
    }

    fn from_interface_map(map: &ValueMap) -> Result<Self> {
        Ok(Self {
            account: get_interface_value(map, "account")?,
            region: get_interface_value(map, "region")?,
            configurer: configurer_entry(map)?,
        })
    }

    pub fn to_dto(&self) -> BoaConfigurationDto {
        BoaConfigurationDto {
            account: self.account.clone(),
            region: self.region.clone(),
            configurer: self.configurer.as_ref().map(Configurer::to_dto),
        }
    }

    pub fn from_dto(dto: &BoaConfigurationDto) -> Self {
        Self {
            account: dto.account.clone(),
            region: dto.region.clone(),
            configurer: dto.configurer.as_ref().and_then(AlibabaConfigurerDto::to_configurer),
        }
    }

    pub fn create_alibaba_config(&self, context: &ClientContext) -> Result<AlibabaAccessKeyCredential> {
        let configurer = self
            .configurer
            .as_ref()
            .ok_or_else(|| ConfigError::missing_field(BOA_CONFIGURATION_NAME, "configurer"))?;

        configurer
            .create_alibaba_config(context)
            .prefixed(BOA_CONFIGURATION_NAME)
    }
}

impl Config for BoaConfiguration {
    fn validate(&self) -> Result<()> {
        validate_configurer(self.configurer.as_ref(), BOA_CONFIGURATION_NAME)?;

        require_field(&self.region, BOA_CONFIGURATION_NAME, "region")?;
        require_field(&self.account, BOA_CONFIGURATION_NAME, "account")?;

        Ok(())
    }
}

impl KeyedConfig for BoaConfiguration {
    fn key(&self) -> String {
        format!("{}/{}", self.account, self.region)
    }
}

serialize_sanitized_dto!(BoaConfiguration);
deserialize_from_interface!(BoaConfiguration);


#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BoaConfigurationDto {
    pub account: String,
    pub region: String,
    pub configurer: Option<AlibabaConfigurerDto>,
}

impl BoaConfigurationDto {
    pub fn from_interface(value: &Value) -> Result<Self> {
        let map = as_interface_map(value).prefixed(BOA_CONFIGURATION_DTO_NAME)?;
        Self::from_interface_map(map).prefixed(BOA_CONFIGURATION_DTO_NAME)
    }

    fn from_interface_map(map: &ValueMap) -> Result<Self> {
        Ok(Self {
            account: get_interface_value(map, "account")?,
            region: get_interface_value(map, "region")?,
            configurer: configurer_dto_entry(map)?,
        })
    }
}

impl ConfigDto for BoaConfigurationDto {
    fn sanitize(&mut self) {
        if let Some(configurer) = self.configurer.as_mut() {
            configurer.sanitize();
        }
    }
}

deserialize_from_interface!(BoaConfigurationDto);
