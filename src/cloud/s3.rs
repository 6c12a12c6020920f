//! S3 bucket holding cost-and-usage-report files.

use serde::Serialize;
use serde_json::Value;

use super::{
    aws::{AwsConfigurer, AwsConfigurerDto, AwsSdkConfig},
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


const S3_CONFIGURATION_NAME: &str = "S3Configuration";
const S3_CONFIGURATION_DTO_NAME: &str = "S3ConfigurationDTO";


#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct S3Configuration {
    pub bucket: String,
    pub region: String,
    pub account: String,
    pub configurer: Option<AwsConfigurer>,
}

impl S3Configuration {
    pub fn from_interface(value: &Value) -> Result<Self> {
        let map = as_interface_map(value).prefixed(S3_CONFIGURATION_NAME)?;
        Self::from_interface_map(map).prefixed(S3_CONFIGURATION_NAME)
    }

    fn from_interface_map(map: &ValueMap) -> Result<Self> {
        Ok(Self {
            bucket: get_interface_value(map, "bucket")?,
            region: get_interface_value(map, "region")?,
            account: get_interface_value(map, "account")?,
            configurer: configurer_entry(map)?,
        })
    }

    pub fn to_dto(&self) -> S3ConfigurationDto {
        S3ConfigurationDto {
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            account: self.account.clone(),
            configurer: self.configurer.as_ref().map(Configurer::to_dto),
        }
    }

    pub fn from_dto(dto: &S3ConfigurationDto) -> Self {
        Self {
            bucket: dto.bucket.clone(),
            region: dto.region.clone(),
            account: dto.account.clone(),
            configurer: dto.configurer.as_ref().and_then(AwsConfigurerDto::to_configurer),
        }
    }

    pub fn create_aws_config(&self, context: &ClientContext) -> Result<AwsSdkConfig> {
        let configurer = self
            .configurer
            .as_ref()
            .ok_or_else(|| ConfigError::missing_field(S3_CONFIGURATION_NAME, "configurer"))?;

        configurer
            .create_aws_config(&self.region, context)
            .prefixed(S3_CONFIGURATION_NAME)
    }
}

impl Config for S3Configuration {
    fn validate(&self) -> Result<()> {
        validate_configurer(self.configurer.as_ref(), S3_CONFIGURATION_NAME)?;

        require_field(&self.bucket, S3_CONFIGURATION_NAME, "bucket")?;
        require_field(&self.region, S3_CONFIGURATION_NAME, "region")?;
        require_field(&self.account, S3_CONFIGURATION_NAME, "account")?;

        Ok(())
    }
}

impl KeyedConfig for S3Configuration {
    fn key(&self) -> String {
        format!("{}/{}", self.account, self.bucket)
    }
}

serialize_sanitized_dto!(S3Configuration);
deserialize_from_interface!(S3Configuration);


#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct S3ConfigurationDto {
    pub bucket: String,
    pub region: String,
    pub account: String,
    pub configurer: Option<AwsConfigurerDto>,
}

impl S3ConfigurationDto {
    pub fn from_interface(value: &Value) -> Result<Self> {
        let map = as_interface_map(value).prefixed(S3_CONFIGURATION_DTO_NAME)?;
        Self::from_interface_map(map).prefixed(S3_CONFIGURATION_DTO_NAME)
    }

    fn from_interface_map(map: &ValueMap) -> Result<Self> {
        Ok(Self {
            bucket: get_interface_value(map, "bucket")?,
            region: get_interface_value(map, "region")?,
            account: get_interface_value(map, "account")?,
            configurer: configurer_dto_entry(map)?,
        })
    }
}

impl ConfigDto for S3ConfigurationDto {
    fn sanitize(&mut self) {
        if let Some(configurer) = self.configurer.as_mut() {
            configurer.sanitize();
        }
    }
}

deserialize_from_interface!(S3ConfigurationDto);
