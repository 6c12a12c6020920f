//! Flat, per-provider records from the older configuration format and their
//! conversion into top-level configuration objects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    alibaba::AlibabaAccessKey,
    athena::AthenaConfiguration,
    aws::{AwsAccessKey, AwsAssumeRole, AwsConfigurer, AwsServiceAccount},
    azure::AzureAccessKey,
    azure_storage::AzureStorageConfiguration,
    bigquery::BigQueryConfiguration,
    boa::BoaConfiguration,
    gcp::{GcpConfigurer, GcpKey},
    integration::CloudConfig,
    s3::S3Configuration,
};


#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsAthenaInfo {
    #[serde(rename = "athenaBucketName")]
    pub athena_bucket_name: String,
    #[serde(rename = "athenaRegion")]
    pub athena_region: String,
    #[serde(rename = "athenaDatabase")]
    pub athena_database: String,
    #[serde(rename = "athenaTable")]
    pub athena_table: String,
    #[serde(rename = "athenaWorkgroup")]
    pub athena_workgroup: String,
    #[serde(rename = "serviceKeyName")]
    pub service_key_name: String,
    #[serde(rename = "serviceKeySecret")]
    pub service_key_secret: String,
    #[serde(rename = "accountID")]
    pub account_id: String,
    #[serde(rename = "masterPayerARN")]
    pub master_payer_arn: String,
}

impl AwsAthenaInfo {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlibabaInfo {
    #[serde(rename = "clusterRegion")]
    pub cluster_region: String,
    #[serde(rename = "accountID")]
    pub account_id: String,
    #[serde(rename = "serviceKeyName")]
    pub service_key_name: String,
    #[serde(rename = "serviceKeySecret")]
    pub service_key_secret: String,
}

impl AlibabaInfo {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BigQueryConfig {
    #[serde(rename = "projectID")]
    pub project_id: String,

    /// `dataset.table`
    #[serde(rename = "billingDataDataset")]
    pub billing_data_dataset: String,

    /// Service-account key file contents.
    pub key: BTreeMap<String, String>,
}

impl BigQueryConfig {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureStorageConfig {
    #[serde(rename = "azureSubscriptionID")]
    pub subscription_id: String,
    #[serde(rename = "azureStorageAccount")]
    pub account_name: String,
    #[serde(rename = "azureStorageAccessKey")]
    pub access_key: String,
    #[serde(rename = "azureStorageContainer")]
    pub container_name: String,
    #[serde(rename = "azureContainerPath")]
    pub container_path: String,
    #[serde(rename = "azureCloud")]
    pub azure_cloud: String,
}

impl AzureStorageConfig {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}


/// Builds an Athena configuration when a database or table is named and
/// an S3 configuration otherwise.
///
/// Without a service key the configurer is the pod's service account; a
/// master payer ARN wraps it in an assume-role.
pub fn convert_aws_athena_info(info: &AwsAthenaInfo) -> Option<CloudConfig> {
    if info.is_empty() {
        return None;
    }

    let mut configurer: AwsConfigurer =
        if info.service_key_name.is_empty() && info.service_key_secret.is_empty() {
            AwsServiceAccount.into()
        } else {
            AwsAccessKey::new(&info.service_key_name, &info.service_key_secret).into()
        };

    if !info.master_payer_arn.is_empty() {
        configurer = AwsAssumeRole::new(Some(configurer), &info.master_payer_arn).into();
    }

    let config = if !info.athena_table.is_empty() || !info.athena_database.is_empty() {
        AthenaConfiguration {
            bucket: info.athena_bucket_name.clone(),
            region: info.athena_region.clone(),
            database: info.athena_database.clone(),
            table: info.athena_table.clone(),
            workgroup: info.athena_workgroup.clone(),
            account: info.account_id.clone(),
            configurer: Some(configurer),
        }
        .into()
    } else {
        S3Configuration {
            bucket: info.athena_bucket_name.clone(),
            region: info.athena_region.clone(),
            account: info.account_id.clone(),
            configurer: Some(configurer),
        }
        .into()
    };

    Some(config)
}

pub fn convert_alibaba_info(info: &AlibabaInfo) -> Option<BoaConfiguration> {
    if info.is_empty() {
        return None;
    }

    Some(BoaConfiguration {
        account: info.account_id.clone(),
        region: info.cluster_region.clone(),
        configurer: Some(
            AlibabaAccessKey::new(&info.service_key_name, &info.service_key_secret).into(),
        ),
    })
}

/// `billingDataDataset` is `dataset.table`; any further segments are ignored.
/// A record without a key converts without a configurer.
pub fn convert_bigquery_config(config: &BigQueryConfig) -> Option<BigQueryConfiguration> {
    if config.is_empty() {
        return None;
    }

    let mut segments = config.billing_data_dataset.split('.');
    let dataset = segments.next().unwrap_or_default();
    let table = segments.next().unwrap_or_default();

    let configurer: Option<GcpConfigurer> =
        (!config.key.is_empty()).then(|| GcpKey::new(config.key.clone()).into());

    Some(BigQueryConfiguration {
        project_id: config.project_id.clone(),
        dataset: dataset.to_string(),
        table: table.to_string(),
        configurer,
    })
}

pub fn convert_azure_storage_config(config: &AzureStorageConfig) -> Option<AzureStorageConfiguration> {
    if config.is_empty() {
        return None;
    }

    Some(AzureStorageConfiguration {
        subscription_id: config.subscription_id.clone(),
        account: config.account_name.clone(),
        container: config.container_name.clone(),
        path: config.container_path.clone(),
        cloud: config.azure_cloud.clone(),
        configurer: Some(AzureAccessKey::new(&config.access_key, &config.account_name).into()),
    })
}
