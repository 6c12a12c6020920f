//! AWS Athena cost-and-usage-report query configuration.

use serde::Serialize;
use serde_json::Value;

use super::{
    aws::{AwsConfigurer, AwsConfigurerDto, AwsSdkConfig},
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


const ATHENA_CONFIGURATION_NAME: &str = "AthenaConfiguration";
const ATHENA_CONFIGURATION_DTO_NAME: &str = "AthenaConfigurationDTO";


#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AthenaConfiguration {
    pub bucket: String,
    pub region: String,
    pub database: String,
    pub table: String,

    /// Optional; Athena uses the `primary` workgroup when empty.
    pub workgroup: String,

    pub account: String,
    pub configurer: Option<AwsConfigurer>,
}

impl AthenaConfiguration {
    /// Decodes a configuration document; the `configurer` entry may be in
    /// any shape [`AwsConfigurer::from_interface`] accepts.
    pub fn from_interface(value: &Value) -> Result<Self> {
        let map = as_interface_map(value).prefixed(ATHENA_CONFIGURATION_NAME)?;
        Self::from_interface_map(map).prefixed(ATHENA_CONFIGURATION_NAME)
    }

    fn from_interface_map(map: &ValueMap) -> Result<Self> {
        Ok(Self {
            bucket: get_interface_value(map, "bucket")?,
            region: get_interface_value(map, "region")?,
            database: get_interface_value(map, "database")?,
            table: get_interface_value(map, "table")?,
            workgroup: get_optional_string(map, "workgroup")?,
            account: get_interface_value(map, "account")?,
            configurer: configurer_entry(map)?,
        })
    }

    pub fn to_dto(&self) -> AthenaConfigurationDto {
        AthenaConfigurationDto {
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            database: self.database.clone(),
            table: self.table.clone(),
            workgroup: self.workgroup.clone(),
            account: self.account.clone(),
            configurer: self.configurer.as_ref().map(Configurer::to_dto),
        }
    }

    pub fn from_dto(dto: &AthenaConfigurationDto) -> Self {
        Self {
            bucket: dto.bucket.clone(),
            region: dto.region.clone(),
            database: dto.database.clone(),
            table: dto.table.clone(),
            workgroup: dto.workgroup.clone(),
            account: dto.account.clone(),
            configurer: dto.configurer.as_ref().and_then(AwsConfigurerDto::to_configurer),
        }
    }

    pub fn create_aws_config(&self, context: &ClientContext) -> Result<AwsSdkConfig> {
        let configurer = self
            .configurer
            .as_ref()
            .ok_or_else(|| ConfigError::missing_field(ATHENA_CONFIGURATION_NAME, "configurer"))?;

        configurer
            .create_aws_config(&self.region, context)
            .prefixed(ATHENA_CONFIGURATION_NAME)
    }
}

impl Config for AthenaConfiguration {
    fn validate(&self) -> Result<()> {
        validate_configurer(self.configurer.as_ref(), ATHENA_CONFIGURATION_NAME)?;

        require_field(&self.bucket, ATHENA_CONFIGURATION_NAME, "bucket")?;
        require_field(&self.region, ATHENA_CONFIGURATION_NAME, "region")?;
        require_field(&self.database, ATHENA_CONFIGURATION_NAME, "database")?;
        require_field(&self.table, ATHENA_CONFIGURATION_NAME, "table")?;
        require_field(&self.account, ATHENA_CONFIGURATION_NAME, "account")?;

        Ok(())
    }
}

impl KeyedConfig for AthenaConfiguration {
    fn key(&self) -> String {
        format!("{}/{}", self.account, self.bucket)
    }
}

serialize_sanitized_dto!(AthenaConfiguration);
deserialize_from_interface!(AthenaConfiguration);


#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AthenaConfigurationDto {
    pub bucket: String,
    pub region: String,
    pub database: String,
    pub table: String,
    pub workgroup: String,
    pub account: String,
    pub configurer: Option<AwsConfigurerDto>,
}

impl AthenaConfigurationDto {
    pub fn from_interface(value: &Value) -> Result<Self> {
        let map = as_interface_map(value).prefixed(ATHENA_CONFIGURATION_DTO_NAME)?;
        Self::from_interface_map(map).prefixed(ATHENA_CONFIGURATION_DTO_NAME)
    }

    fn from_interface_map(map: &ValueMap) -> Result<Self> {
        Ok(Self {
            bucket: get_interface_value(map, "bucket")?,
            region: get_interface_value(map, "region")?,
            database: get_interface_value(map, "database")?,
            table: get_interface_value(map, "table")?,
            workgroup: get_optional_string(map, "workgroup")?,
            account: get_interface_value(map, "account")?,
            configurer: configurer_dto_entry(map)?,
        })
    }
}

impl ConfigDto for AthenaConfigurationDto {
    fn sanitize(&mut self) {
        if let Some(configurer) = self.configurer.as_mut() {
            configurer.sanitize();
        }
    }
}

deserialize_from_interface!(AthenaConfigurationDto);
