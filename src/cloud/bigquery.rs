//! BigQuery billing-export configuration.

use serde::Serialize;
use serde_json::Value;

use super::{
    context::ClientContext,
    dto::{configurer_dto_entry, configurer_entry, Configurer},
    error::{ConfigError, Result, ResultExt},
    extract::{as_interface_map, get_interface_value, ValueMap},
    gcp::{GcpClientOption, GcpConfigurer, GcpConfigurerDto},
    require_field,
    validate_configurer,
    Config,
    ConfigDto,
    KeyedConfig,
};


const BIGQUERY_CONFIGURATION_NAME: &str = "BigQueryConfiguration";
const BIGQUERY_CONFIGURATION_DTO_NAME: &str = "BigQueryConfigurationDTO";


#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BigQueryConfiguration {
    pub project_id: String,
    pub dataset: String,
    pub table: String,
    pub configurer: Option<GcpConfigurer>,
}

impl BigQueryConfiguration {
    pub fn from_interface(value: &Value) -> Result<Self> {
        let map = as_interface_map(value).prefixed(BIGQUERY_CONFIGURATION_NAME)?;
        Self::from_interface_map(map).prefixed(BIGQUERY_CONFIGURATION_NAME)
    }

    fn from_interface_map(map: &ValueMap) -> Result<Self> {
        Ok(Self {
            project_id: get_interface_value(map, "projectID")?,
            dataset: get_interface_value(map, "dataset")?,
            table: get_interface_value(map, "table")?,
            configurer: configurer_entry(map)?,
        })
    }

    pub fn to_dto(&self) -> BigQueryConfigurationDto {
        BigQueryConfigurationDto {
            project_id: self.project_id.clone(),
            dataset: self.dataset.clone(),
            table: self.table.clone(),
            configurer: self.configurer.as_ref().map(Configurer::to_dto),
        }
    }

    pub fn from_dto(dto: &BigQueryConfigurationDto) -> Self {
        Self {
            project_id: dto.project_id.clone(),
            dataset: dto.dataset.clone(),
            table: dto.table.clone(),
            configurer: dto.configurer.as_ref().and_then(GcpConfigurerDto::to_configurer),
        }
    }

    /// The fully qualified billing export table, `dataset.table`.
    pub fn billing_data_dataset(&self) -> String {
        format!("{}.{}", self.dataset, self.table)
    }

    pub fn create_client_option(&self, context: &ClientContext) -> Result<GcpClientOption> {
        let configurer = self
            .configurer
            .as_ref()
            .ok_or_else(|| ConfigError::missing_field(BIGQUERY_CONFIGURATION_NAME, "configurer"))?;

        configurer
            .create_client_option(context)
            .prefixed(BIGQUERY_CONFIGURATION_NAME)
    }
}

impl Config for BigQueryConfiguration {
    fn validate(&self) -> Result<()> {
        validate_configurer(self.configurer.as_ref(), BIGQUERY_CONFIGURATION_NAME)?;

        require_field(&self.project_id, BIGQUERY_CONFIGURATION_NAME, "ProjectID")?;
        require_field(&self.dataset, BIGQUERY_CONFIGURATION_NAME, "Dataset")?;
        require_field(&self.table, BIGQUERY_CONFIGURATION_NAME, "Table")?;

        Ok(())
    }
}

impl KeyedConfig for BigQueryConfiguration {
    /// The usage project and the export table it bills to.
    fn key(&self) -> String {
        format!("{}/{}", self.project_id, self.billing_data_dataset())
    }
}

serialize_sanitized_dto!(BigQueryConfiguration);
deserialize_from_interface!(BigQueryConfiguration);


#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BigQueryConfigurationDto {
    #[serde(rename = "projectID")]
    pub project_id: String,
    pub dataset: String,
    pub table: String,
    pub configurer: Option<GcpConfigurerDto>,
}

impl BigQueryConfigurationDto {
    pub fn from_interface(value: &Value) -> Result<Self> {
        let map = as_interface_map(value).prefixed(BIGQUERY_CONFIGURATION_DTO_NAME)?;
        Self::from_interface_map(map).prefixed(BIGQUERY_CONFIGURATION_DTO_NAME)
    }

    fn from_interface_map(map: &ValueMap) -> Result<Self> {
        Ok(Self {
            project_id: get_interface_value(map, "projectID")?,
            dataset: get_interface_value(map, "dataset")?,
            table: get_interface_value(map, "table")?,
            configurer: configurer_dto_entry(map)?,
        })
    }
}

impl ConfigDto for BigQueryConfigurationDto {
    fn sanitize(&mut self) {
        if let Some(configurer) = self.configurer.as_mut() {
            configurer.sanitize();
        }
    }
}

deserialize_from_interface!(BigQueryConfigurationDto);


#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;
    use crate::cloud::{
        gcp::{GcpKey, GcpWorkloadIdentity},
        REDACTED,
    };

    fn key() -> GcpConfigurer {
        GcpKey::new(BTreeMap::from([
            ("project_id".to_string(), "billing".to_string()),
            ("private_key".to_string(), "pk".to_string()),
        ]))
        .into()
    }

    fn bigquery(configurer: Option<GcpConfigurer>) -> BigQueryConfiguration {
        BigQueryConfiguration {
            project_id: "project".to_string(),
            dataset: "billing_export".to_string(),
            table: "gcp_billing_export_v1".to_string(),
            configurer,
        }
    }

    // ── validate ──

    #[test]
    fn test_validate() {
        assert!(bigquery(Some(key())).validate().is_ok());
        assert!(bigquery(Some(GcpWorkloadIdentity.into())).validate().is_ok());

        let error = bigquery(Some(GcpKey::default().into())).validate().unwrap_err();
        assert_eq!(error.to_string(), "BigQueryConfiguration: GCPKey: missing Key");

        let error = bigquery(None).validate().unwrap_err();
        assert_eq!(error.to_string(), "BigQueryConfiguration: missing configurer");

        let mut config = bigquery(Some(key()));
        config.project_id.clear();
        assert_eq!(config.validate().unwrap_err().to_string(), "BigQueryConfiguration: missing ProjectID");

        let mut config = bigquery(Some(key()));
        config.dataset.clear();
        assert_eq!(config.validate().unwrap_err().to_string(), "BigQueryConfiguration: missing Dataset");

        let mut config = bigquery(Some(key()));
        config.table.clear();
        assert_eq!(config.validate().unwrap_err().to_string(), "BigQueryConfiguration: missing Table");
    }

    // ── equals / key ──

    #[test]
    fn test_equals() {
        let config = bigquery(Some(key()));
        assert!(config.equals(Some(&config.clone())));
        assert!(!config.equals(Some(&bigquery(Some(GcpWorkloadIdentity.into())))));
        assert!(!config.equals(Some(&bigquery(None))));
        assert!(!config.equals(None));
    }

    #[test]
    fn test_key_and_billing_data_dataset() {
        let config = bigquery(Some(key()));
        assert_eq!(config.billing_data_dataset(), "billing_export.gcp_billing_export_v1");
        assert_eq!(config.key(), "project/billing_export.gcp_billing_export_v1");
    }

    // ── decode / encode ──

    #[test]
    fn test_from_interface() {
        let config = BigQueryConfiguration::from_interface(&json!({
            "projectID": "project",
            "dataset": "billing_export",
            "table": "gcp_billing_export_v1",
            "configurer": {},
        }))
        .unwrap();
        assert_eq!(config, bigquery(Some(GcpWorkloadIdentity.into())));

        let error = BigQueryConfiguration::from_interface(&json!({ "projectId": "project" })).unwrap_err();
        assert_eq!(error.to_string(), "BigQueryConfiguration: missing 'projectID' property");
    }

    #[test]
    fn test_serialize_redacts_key() {
        let value = serde_json::to_value(bigquery(Some(key()))).unwrap();
        assert_eq!(
            value,
            json!({
                "projectID": "project",
                "dataset": "billing_export",
                "table": "gcp_billing_export_v1",
                "configurer": { "type": "GCPAccessKey", "values": { "key": REDACTED } },
            })
        );
    }

    #[test]
    fn test_sanitized_key_does_not_decode_back() {
        let json = serde_json::to_string(&bigquery(Some(key()))).unwrap();
        let decoded: BigQueryConfiguration = serde_json::from_str(&json).unwrap();

        // A redacted key is logged and read back as no configurer.
        assert_eq!(decoded.configurer, None);
        assert_eq!(decoded.key(), bigquery(None).key());
    }

    #[test]
    fn test_dto_round_trip() {
        for config in [bigquery(Some(key())), bigquery(Some(GcpWorkloadIdentity.into())), bigquery(None)] {
            let dto = config.to_dto();
            assert_eq!(BigQueryConfiguration::from_dto(&dto), config);

            let reparsed: BigQueryConfigurationDto =
                serde_json::from_value(serde_json::to_value(&dto).unwrap()).unwrap();
            assert_eq!(reparsed, dto);
        }
    }

    // ── native config ──

    #[test]
    fn test_create_client_option() {
        let option = bigquery(Some(key()))
            .create_client_option(&ClientContext::new())
            .unwrap();
        assert!(matches!(option, GcpClientOption::CredentialsJson(_)));

        let error = bigquery(None)
            .create_client_option(&ClientContext::new())
            .unwrap_err();
        assert!(matches!(error.root(), ConfigError::MissingField { field: "configurer" }));
    }
}
