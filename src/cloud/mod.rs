//! Credential configuration for cloud billing and storage integrations.
//!
//! Every provider (AWS, Azure, GCP, Alibaba) has a small closed set of
//! credential strategies, its *configurers*. They all validate themselves,
//! compare structurally, build a native client configuration, and round trip
//! through a tagged DTO (`{type, values}`) that can be sanitized before it is
//! persisted or displayed.
//!
//! Top-level configuration objects ([`S3Configuration`], [`AthenaConfiguration`],
//! [`BigQueryConfiguration`], [`AzureStorageConfiguration`], [`BoaConfiguration`])
//! pair a configurer with the location of the data it unlocks and are
//! identified by [`KeyedConfig::key`].
//!
//! # Decoding
//! Untyped documents (parsed JSON, API payloads, legacy files) are decoded
//! through `from_interface`. The nested `configurer` entry is dispatched by
//! shape: an explicit `type` tag is not required, so the legacy flat shape,
//! API payloads and internal DTOs are all accepted.
//!
//! # Encoding
//! Serializing a top-level object always goes through its DTO and
//! [`ConfigDto::sanitize`], so serialized output never contains a secret.

/// Implements `Deserialize` by decoding into an untyped value first and
/// handing it to the type's `from_interface`.
macro_rules! deserialize_from_interface {
    ($target:ty) => {
        impl<'de> serde::Deserialize<'de> for $target {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                Self::from_interface(&value).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Implements `Serialize` for a top-level configuration by serializing its
/// sanitized DTO.
macro_rules! serialize_sanitized_dto {
    ($target:ty) => {
        impl serde::Serialize for $target {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                let mut dto = self.to_dto();
                $crate::cloud::ConfigDto::sanitize(&mut dto);
                serde::Serialize::serialize(&dto, serializer)
            }
        }
    };
}

pub mod alibaba;
pub mod athena;
pub mod aws;
pub mod azure;
pub mod azure_storage;
pub mod bigquery;
pub mod boa;
pub mod context;
pub mod dto;
pub mod error;
pub mod extract;
pub mod gcp;
pub mod integration;
pub mod legacy;
pub mod s3;
pub mod source;

pub use alibaba::{AlibabaAccessKey, AlibabaConfigurer, AlibabaConfigurerDto};
pub use athena::{AthenaConfiguration, AthenaConfigurationDto};
pub use aws::{AwsAccessKey, AwsAssumeRole, AwsConfigurer, AwsConfigurerDto, AwsServiceAccount};
pub use azure::{AzureAccessKey, AzureConfigurer, AzureConfigurerDto};
pub use azure_storage::{AzureStorageConfiguration, AzureStorageConfigurationDto};
pub use bigquery::{BigQueryConfiguration, BigQueryConfigurationDto};
pub use boa::{BoaConfiguration, BoaConfigurationDto};
pub use context::{CancellationHandle, ClientContext};
pub use dto::{Configurer, ConfigurerDto, MAX_CONFIGURER_DEPTH, REDACTED};
pub use error::{ConfigError, Result};
pub use gcp::{GcpConfigurer, GcpConfigurerDto, GcpKey, GcpWorkloadIdentity};
pub use integration::{CloudConfig, SourcedConfig};
pub use s3::{S3Configuration, S3ConfigurationDto};
pub use source::ConfigSource;

use error::ResultExt;


/// A configuration that can check itself and compare structurally.
pub trait Config: PartialEq {
    /// Returns the first problem found, naming the failing type and field.
    fn validate(&self) -> Result<()>;

    /// `false` against `None`, otherwise structural equality.
    fn equals(&self, other: Option<&Self>) -> bool {
        other.is_some_and(|other| self == other)
    }
}

/// A top-level [`Config`] identified by a stable key derived from its
/// public location fields, never from its credentials.
pub trait KeyedConfig: Config {
    fn key(&self) -> String;
}

/// A transfer representation that can redact its own secrets.
pub trait ConfigDto {
    /// Replaces secret values in place. Sanitizing twice is a no-op.
    fn sanitize(&mut self);
}


/// Equality for optional configurers: both absent, or both present and equal.
pub(crate) fn optional_configurers_equal<C: Config>(this: Option<&C>, that: Option<&C>) -> bool {
    match this {
        Some(configurer) => configurer.equals(that),
        None => that.is_none(),
    }
}

/// The configurer of a top-level object must be present and valid.
pub(crate) fn validate_configurer<C: Config>(configurer: Option<&C>, type_name: &str) -> Result<()> {
    match configurer {
        Some(configurer) => configurer.validate().prefixed(type_name),
        None => Err(ConfigError::missing_field(type_name, "configurer")),
    }
}

pub(crate) fn require_field(value: &str, type_name: &str, field: &'static str) -> Result<()> {
    if value.is_empty() {
        return Err(ConfigError::missing_field(type_name, field));
    }

    Ok(())
}
