//! Alibaba Cloud credential strategies, used for the BSS open API.

use std::fmt;

use serde_json::Value;

use super::{
    context::ClientContext,
    dto::{check_depth, redact_value, Configurer, ConfigurerDto, REDACTED},
    error::{ConfigError, Result, ResultExt},
    extract::{as_interface_map, get_interface_value, ValueMap},
    Config,
};


pub const ALIBABA_ACCESS_KEY_TYPE: &str = "AlibabaAccessKey";

pub type AlibabaConfigurerDto = ConfigurerDto<AlibabaConfigurer>;


/// What the Alibaba SDK signs requests with.
#[derive(Clone, PartialEq, Eq)]
pub struct AlibabaAccessKeyCredential {
    pub access_key_id: String,
    pub access_key_secret: String,
}

impl fmt::Debug for AlibabaAccessKeyCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlibabaAccessKeyCredential")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &REDACTED)
            .finish()
    }
}


#[derive(Clone, PartialEq, Eq, Default)]
pub struct AlibabaAccessKey {
    pub access_key_id: String,
    pub access_key_secret: String,
}

impl fmt::Debug for AlibabaAccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlibabaAccessKey")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &REDACTED)
            .finish()
    }
}

impl AlibabaAccessKey {
    pub fn new<I, S>(access_key_id: I, access_key_secret: S) -> Self
    where
        I: Into<String>,
        S: Into<String>,
    {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
        }
    }

    fn from_interface_map(map: &ValueMap) -> Result<Self> {
        let access_key_id: String =
            get_interface_value(map, "id").prefixed(ALIBABA_ACCESS_KEY_TYPE)?;
        let access_key_secret: String =
            get_interface_value(map, "secret").prefixed(ALIBABA_ACCESS_KEY_TYPE)?;

        Ok(Self {
            access_key_id,
            access_key_secret,
        })
    }

    pub fn to_dto(&self) -> AlibabaConfigurerDto {
        let mut values = ValueMap::with_capacity(2);
        values.insert("id".to_string(), Value::String(self.access_key_id.clone()));
        values.insert("secret".to_string(), Value::String(self.access_key_secret.clone()));

        AlibabaConfigurerDto::new(ALIBABA_ACCESS_KEY_TYPE, values)
    }

    pub fn create_alibaba_config(&self, context: &ClientContext) -> Result<AlibabaAccessKeyCredential> {
        self.validate()?;
        context.check()?;

        Ok(AlibabaAccessKeyCredential {
            access_key_id: self.access_key_id.clone(),
            access_key_secret: self.access_key_secret.clone(),
        })
    }
}

impl Config for AlibabaAccessKey {
    fn validate(&self) -> Result<()> {
        if self.access_key_id.is_empty() {
            return Err(ConfigError::missing_field(ALIBABA_ACCESS_KEY_TYPE, "Access key ID"));
        }

        if self.access_key_secret.is_empty() {
            return Err(ConfigError::missing_field(ALIBABA_ACCESS_KEY_TYPE, "Access Key secret"));
        }

        Ok(())
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlibabaConfigurer {
    AccessKey(AlibabaAccessKey),
}

impl From<AlibabaAccessKey> for AlibabaConfigurer {
    fn from(access_key: AlibabaAccessKey) -> Self {
        Self::AccessKey(access_key)
    }
}

impl AlibabaConfigurer {
    pub fn create_alibaba_config(&self, context: &ClientContext) -> Result<AlibabaAccessKeyCredential> {
        match self {
            Self::AccessKey(access_key) => access_key.create_alibaba_config(context),
        }
    }
}

impl Config for AlibabaConfigurer {
    fn validate(&self) -> Result<()> {
        match self {
            Self::AccessKey(access_key) => access_key.validate(),
        }
    }
}

impl Configurer for AlibabaConfigurer {
    const TYPE_NAME: &'static str = "AlibabaConfigurer";
    const DTO_NAME: &'static str = "AlibabaConfigurerDTO";
    const TYPE_TAGS: &'static [&'static str] = &[ALIBABA_ACCESS_KEY_TYPE];
    const SHAPE_KEYS: &'static [&'static str] = &["id"];

    fn from_interface_at_depth(value: &Value, depth: usize) -> Result<Option<Self>> {
        check_depth(depth).prefixed(Self::TYPE_NAME)?;

        if value.is_null() {
            return Ok(None);
        }

        let map = as_interface_map(value).prefixed(Self::TYPE_NAME)?;

        if map.contains_key("id") {
            return AlibabaAccessKey::from_interface_map(map).map(|configurer| Some(configurer.into()));
        }

        if map.contains_key("type") {
            return AlibabaConfigurerDto::from_interface_map(map)?.resolve_configurer(depth);
        }

        Err(ConfigError::UnrecognizedShape.prefixed(Self::TYPE_NAME))
    }

    fn decode_tagged(type_tag: &str, values: &ValueMap, _depth: usize) -> Result<Self> {
        match type_tag {
            ALIBABA_ACCESS_KEY_TYPE => AlibabaAccessKey::from_interface_map(values).map(Self::from),
            _ => Err(ConfigError::UnrecognizedVariant(type_tag.to_string())),
        }
    }

    fn to_dto(&self) -> AlibabaConfigurerDto {
        match self {
            Self::AccessKey(access_key) => access_key.to_dto(),
        }
    }

    fn sanitize_values(type_tag: &str, values: &mut ValueMap) {
        if type_tag == ALIBABA_ACCESS_KEY_TYPE {
            redact_value(values, "secret");
        }
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cloud::ConfigDto;

    fn access_key() -> AlibabaConfigurer {
        AlibabaAccessKey::new("LTAI", "secret").into()
    }

    #[test]
    fn test_validate() {
        assert!(access_key().validate().is_ok());

        let error = AlibabaAccessKey::new("", "secret").validate().unwrap_err();
        assert_eq!(error.to_string(), "AlibabaAccessKey: missing Access key ID");

        let error = AlibabaAccessKey::new("LTAI", "").validate().unwrap_err();
        assert_eq!(error.to_string(), "AlibabaAccessKey: missing Access Key secret");
    }

    #[test]
    fn test_equals() {
        assert!(access_key().equals(Some(&access_key())));
        assert!(!access_key().equals(None));
        assert!(!access_key().equals(Some(&AlibabaAccessKey::new("LTAI", "other").into())));
    }

    #[test]
    fn test_from_interface() {
        assert_eq!(AlibabaConfigurer::from_interface(&Value::Null).unwrap(), None);
        assert_eq!(
            AlibabaConfigurer::from_interface(&json!({ "id": "LTAI", "secret": "secret" })).unwrap(),
            Some(access_key())
        );
        assert_eq!(
            AlibabaConfigurer::from_interface(&access_key().to_dto().to_value()).unwrap(),
            Some(access_key())
        );

        let error = AlibabaConfigurer::from_interface(&json!({})).unwrap_err();
        assert!(matches!(error.root(), ConfigError::UnrecognizedShape));

        let error = AlibabaConfigurer::from_interface(&json!({ "id": "LTAI" })).unwrap_err();
        assert_eq!(error.to_string(), "AlibabaAccessKey: missing 'secret' property");
    }

    #[test]
    fn test_sanitize() {
        let mut dto = access_key().to_dto();
        dto.sanitize();

        assert_eq!(dto.values["id"], json!("LTAI"));
        assert_eq!(dto.values["secret"], json!(REDACTED));
        assert_eq!(dto.clone().sanitized(), dto);
    }

    #[test]
    fn test_create_alibaba_config() {
        let credential = access_key()
            .create_alibaba_config(&ClientContext::new())
            .unwrap();

        assert_eq!(credential.access_key_id, "LTAI");
        assert_eq!(credential.access_key_secret, "secret");
        assert!(!format!("{credential:?}").contains("\"secret\""));

        let error = AlibabaConfigurer::from(AlibabaAccessKey::new("LTAI", ""))
            .create_alibaba_config(&ClientContext::new())
            .unwrap_err();
        assert!(matches!(error.root(), ConfigError::MissingField { .. }));
    }
}
