//! AWS credential strategies.
//!
//! - [`AwsAccessKey`]: a static access key id and secret.
//! - [`AwsServiceAccount`]: no fields, relies on the ambient pod identity
//!   (service account annotation / IRSA) discovered by the SDK.
//! - [`AwsAssumeRole`]: wraps any other AWS configurer, including another
//!   assume-role, and assumes `roleARN` on top of it.

use std::{fmt, path::PathBuf};

use serde_json::Value;
use tracing::debug;

use super::{
    context::ClientContext,
    dto::{check_depth, redact_value, sanitize_nested, Configurer, ConfigurerDto, REDACTED},
    error::{ConfigError, Result, ResultExt},
    extract::{as_interface_map, get_interface_value, get_optional_interface_value, ValueMap},
    optional_configurers_equal,
    Config,
};


pub const AWS_ACCESS_KEY_TYPE: &str = "AWSAccessKey";
pub const AWS_SERVICE_ACCOUNT_TYPE: &str = "AWSServiceAccount";
pub const AWS_ASSUME_ROLE_TYPE: &str = "AWSAssumeRole";

const AWS_ASSUME_ROLE_NAME: &str = "AWSAssumeRoleConfigurer";

/// Session name used for the STS `AssumeRole` call.
pub const DEFAULT_ROLE_SESSION_NAME: &str = "cloud-configurer";

pub type AwsConfigurerDto = ConfigurerDto<AwsConfigurer>;


/***
 * Native configuration
 */

/// Resolved AWS credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &REDACTED)
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| REDACTED),
            )
            .finish()
    }
}

/// Identity settings found in the environment for the default credential chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AmbientAwsIdentity {
    pub web_identity_token_file: Option<PathBuf>,
    pub role_arn: Option<String>,
    pub profile: Option<String>,
    pub container_credentials_uri: Option<String>,
}

impl AmbientAwsIdentity {
    pub fn discover(context: &ClientContext) -> Self {
        Self {
            web_identity_token_file: context
                .env_var("AWS_WEB_IDENTITY_TOKEN_FILE")
                .map(PathBuf::from),
            role_arn: context.env_var("AWS_ROLE_ARN"),
            profile: context.env_var("AWS_PROFILE"),
            container_credentials_uri: context
                .env_var("AWS_CONTAINER_CREDENTIALS_FULL_URI")
                .or_else(|| context.env_var("AWS_CONTAINER_CREDENTIALS_RELATIVE_URI")),
        }
    }

    /// `true` when a web identity token and role were injected (IRSA).
    pub fn is_web_identity(&self) -> bool {
        self.web_identity_token_file.is_some() && self.role_arn.is_some()
    }

    /// `true` when nothing was found and the SDK will fall back to instance metadata.
    pub fn is_instance_metadata(&self) -> bool {
        !self.is_web_identity()
            && self.profile.is_none()
            && self.container_credentials_uri.is_none()
    }
}

/// Where an [`AwsSdkConfig`] gets its credentials from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AwsCredentialsProvider {
    Static(AwsCredentials),

    /// The SDK default chain.
    Ambient(AmbientAwsIdentity),

    /// STS `AssumeRole` for `role_arn`, signed with the `source` credentials.
    /// Credentials are fetched and cached by the SDK on first use.
    AssumeRole {
        role_arn: String,
        session_name: String,
        source: Box<AwsCredentialsProvider>,
    },
}

/// What the AWS SDK needs to construct a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSdkConfig {
    pub region: String,
    pub credentials: AwsCredentialsProvider,
}


fn resolve_region(region: &str, context: &ClientContext) -> Result<String> {
    if !region.is_empty() {
        return Ok(region.to_string());
    }

    context
        .env_var("AWS_REGION")
        .or_else(|| context.env_var("AWS_DEFAULT_REGION"))
        .ok_or_else(|| {
            ConfigError::delegated(
                "failed to initialize AWS SDK config: no region given \
                 and neither AWS_REGION nor AWS_DEFAULT_REGION is set",
            )
        })
}


/***
 * Access key
 */

#[derive(Clone, PartialEq, Eq, Default)]
pub struct AwsAccessKey {
    pub id: String,
    pub secret: String,
}

impl fmt::Debug for AwsAccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsAccessKey")
            .field("id", &self.id)
            .field("secret", &REDACTED)
            .finish()
    }
}

impl AwsAccessKey {
    pub fn new<I, S>(id: I, secret: S) -> Self
    where
        I: Into<String>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            secret: secret.into(),
        }
    }

    pub fn credentials(&self) -> AwsCredentials {
        AwsCredentials {
            access_key_id: self.id.clone(),
            secret_access_key: self.secret.clone(),
            session_token: None,
        }
    }

    fn from_interface_map(map: &ValueMap) -> Result<Self> {
        let id: String = get_interface_value(map, "id").prefixed(AWS_ACCESS_KEY_TYPE)?;
        let secret: String = get_interface_value(map, "secret").prefixed(AWS_ACCESS_KEY_TYPE)?;

        Ok(Self { id, secret })
    }

    pub fn to_dto(&self) -> AwsConfigurerDto {
        let mut values = ValueMap::with_capacity(2);
        values.insert("id".to_string(), Value::String(self.id.clone()));
        values.insert("secret".to_string(), Value::String(self.secret.clone()));

        AwsConfigurerDto::new(AWS_ACCESS_KEY_TYPE, values)
    }

    /// Builds an SDK configuration for `region` that signs with this key.
    pub fn create_aws_config(&self, region: &str, context: &ClientContext) -> Result<AwsSdkConfig> {
        self.validate()?;
        context.check()?;

        Ok(AwsSdkConfig {
            region: resolve_region(region, context)?,
            credentials: AwsCredentialsProvider::Static(self.credentials()),
        })
    }
}

impl Config for AwsAccessKey {
    fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(ConfigError::missing_field(AWS_ACCESS_KEY_TYPE, "ID"));
        }

        if self.secret.is_empty() {
            return Err(ConfigError::missing_field(AWS_ACCESS_KEY_TYPE, "Secret"));
        }

        Ok(())
    }
}


/***
 * Service account
 */

/// Authenticates through the pod's service account; nothing to check here,
/// a misconfigured annotation only shows up when the SDK connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AwsServiceAccount;

impl AwsServiceAccount {
    pub fn to_dto(&self) -> AwsConfigurerDto {
        AwsConfigurerDto::new(AWS_SERVICE_ACCOUNT_TYPE, ValueMap::new())
    }

    pub fn create_aws_config(&self, region: &str, context: &ClientContext) -> Result<AwsSdkConfig> {
        context.check()?;

        let identity = AmbientAwsIdentity::discover(context);
        if identity.is_instance_metadata() {
            debug!("AWSServiceAccount: no ambient identity in environment, using instance metadata.");
        }

        let region = resolve_region(region, context)
            .prefixed(AWS_SERVICE_ACCOUNT_TYPE)?;

        Ok(AwsSdkConfig {
            region,
            credentials: AwsCredentialsProvider::Ambient(identity),
        })
    }
}

impl Config for AwsServiceAccount {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}


/***
 * Assume role
 */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsAssumeRole {
    configurer: Option<Box<AwsConfigurer>>,
    role_arn: String,
}

impl AwsAssumeRole {
    pub fn new<S: Into<String>>(configurer: Option<AwsConfigurer>, role_arn: S) -> Self {
        Self {
            configurer: configurer.map(Box::new),
            role_arn: role_arn.into(),
        }
    }

    /// The configurer whose credentials are used to assume the role.
    pub fn configurer(&self) -> Option<&AwsConfigurer> {
        self.configurer.as_deref()
    }

    pub fn role_arn(&self) -> &str {
        &self.role_arn
    }

    fn from_interface_map(map: &ValueMap, depth: usize) -> Result<Self> {
        let role_arn: String = get_interface_value(map, "roleARN").prefixed(AWS_ASSUME_ROLE_NAME)?;

        let configurer = match get_optional_interface_value::<&Value>(map, "configurer")
            .prefixed(AWS_ASSUME_ROLE_NAME)?
        {
            Some(value) => AwsConfigurer::from_interface_at_depth(value, depth + 1)
                .prefixed(AWS_ASSUME_ROLE_NAME)?,
            None => None,
        };

        Ok(Self {
            configurer: configurer.map(Box::new),
            role_arn,
        })
    }

    pub fn to_dto(&self) -> AwsConfigurerDto {
        let configurer = match self.configurer.as_deref() {
            Some(configurer) => configurer.to_dto().to_value(),
            None => Value::Null,
        };

        let mut values = ValueMap::with_capacity(2);
        values.insert("roleARN".to_string(), Value::String(self.role_arn.clone()));
        values.insert("configurer".to_string(), configurer);

        AwsConfigurerDto::new(AWS_ASSUME_ROLE_TYPE, values)
    }

    /// Layers an STS assume-role credential provider over the wrapped
    /// configurer's configuration. Failures of the wrapped configurer are
    /// returned rather than papered over.
    pub fn create_aws_config(&self, region: &str, context: &ClientContext) -> Result<AwsSdkConfig> {
        self.validate()?;
        context.check()?;

        let base_configurer = self
            .configurer
            .as_deref()
            .ok_or_else(|| ConfigError::missing_field(AWS_ASSUME_ROLE_NAME, "base configurer"))?;

        let base_config = base_configurer
            .create_aws_config(region, context)
            .prefixed(AWS_ASSUME_ROLE_NAME)?;

        Ok(AwsSdkConfig {
            region: base_config.region,
            credentials: AwsCredentialsProvider::AssumeRole {
                role_arn: self.role_arn.clone(),
                session_name: DEFAULT_ROLE_SESSION_NAME.to_string(),
                source: Box::new(base_config.credentials),
            },
        })
    }
}

impl Config for AwsAssumeRole {
    fn validate(&self) -> Result<()> {
        let Some(configurer) = self.configurer.as_deref() else {
            return Err(ConfigError::missing_field(AWS_ASSUME_ROLE_NAME, "base configurer"));
        };

        configurer.validate()?;

        if self.role_arn.is_empty() {
            return Err(ConfigError::missing_field(AWS_ASSUME_ROLE_NAME, "roleARN"));
        }

        Ok(())
    }

    fn equals(&self, other: Option<&Self>) -> bool {
        let Some(other) = other else {
            return false;
        };

        optional_configurers_equal(self.configurer(), other.configurer())
            && self.role_arn == other.role_arn
    }
}


/***
 * Configurer
 */

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AwsConfigurer {
    AccessKey(AwsAccessKey),
    ServiceAccount(AwsServiceAccount),
    AssumeRole(AwsAssumeRole),
}

impl From<AwsAccessKey> for AwsConfigurer {
    fn from(access_key: AwsAccessKey) -> Self {
        Self::AccessKey(access_key)
    }
}

impl From<AwsServiceAccount> for AwsConfigurer {
    fn from(service_account: AwsServiceAccount) -> Self {
        Self::ServiceAccount(service_account)
    }
}

impl From<AwsAssumeRole> for AwsConfigurer {
    fn from(assume_role: AwsAssumeRole) -> Self {
        Self::AssumeRole(assume_role)
    }
}

impl AwsConfigurer {
    /// Builds an SDK configuration for `region`. Validates first and never
    /// touches the environment for an invalid configurer.
    pub fn create_aws_config(&self, region: &str, context: &ClientContext) -> Result<AwsSdkConfig> {
        match self {
            Self::AccessKey(access_key) => access_key.create_aws_config(region, context),
            Self::ServiceAccount(service_account) => {
                service_account.create_aws_config(region, context)
            }
            Self::AssumeRole(assume_role) => assume_role.create_aws_config(region, context),
        }
    }
}

impl Config for AwsConfigurer {
    fn validate(&self) -> Result<()> {
        match self {
            Self::AccessKey(access_key) => access_key.validate(),
            Self::ServiceAccount(service_account) => service_account.validate(),
            Self::AssumeRole(assume_role) => assume_role.validate(),
        }
    }
}

impl Configurer for AwsConfigurer {
    const TYPE_NAME: &'static str = "AWSConfigurer";
    const DTO_NAME: &'static str = "AWSConfigurerDTO";
    const TYPE_TAGS: &'static [&'static str] = &[
        AWS_ACCESS_KEY_TYPE,
        AWS_SERVICE_ACCOUNT_TYPE,
        AWS_ASSUME_ROLE_TYPE,
    ];
    const SHAPE_KEYS: &'static [&'static str] = &["roleARN", "id"];

    fn from_interface_at_depth(value: &Value, depth: usize) -> Result<Option<Self>> {
        check_depth(depth).prefixed(Self::TYPE_NAME)?;

        if value.is_null() {
            return Ok(None);
        }

        let map = as_interface_map(value).prefixed(Self::TYPE_NAME)?;

        if map.is_empty() {
            debug!("AWSConfigurer: empty configurer, using service account.");
            return Ok(Some(AwsServiceAccount.into()));
        }

        if map.contains_key("roleARN") {
            return AwsAssumeRole::from_interface_map(map, depth).map(|configurer| Some(configurer.into()));
        }

        if map.contains_key("id") {
            return AwsAccessKey::from_interface_map(map).map(|configurer| Some(configurer.into()));
        }

        if map.contains_key("type") {
            return AwsConfigurerDto::from_interface_map(map)?.resolve_configurer(depth);
        }

        Err(ConfigError::UnrecognizedShape.prefixed(Self::TYPE_NAME))
    }

    fn decode_tagged(type_tag: &str, values: &ValueMap, depth: usize) -> Result<Self> {
        match type_tag {
            AWS_ACCESS_KEY_TYPE => AwsAccessKey::from_interface_map(values).map(Self::from),
            AWS_SERVICE_ACCOUNT_TYPE => Ok(AwsServiceAccount.into()),
            AWS_ASSUME_ROLE_TYPE => AwsAssumeRole::from_interface_map(values, depth).map(Self::from),
            _ => Err(ConfigError::UnrecognizedVariant(type_tag.to_string())),
        }
    }

    fn to_dto(&self) -> AwsConfigurerDto {
        match self {
            Self::AccessKey(access_key) => access_key.to_dto(),
            Self::ServiceAccount(service_account) => service_account.to_dto(),
            Self::AssumeRole(assume_role) => assume_role.to_dto(),
        }
    }

    fn sanitize_values(type_tag: &str, values: &mut ValueMap) {
        match type_tag {
            AWS_ACCESS_KEY_TYPE => redact_value(values, "secret"),
            AWS_ASSUME_ROLE_TYPE => sanitize_nested::<Self>(values, "configurer"),
            _ => {}
        }
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cloud::{dto::MAX_CONFIGURER_DEPTH, ConfigDto};

    fn access_key() -> AwsConfigurer {
        AwsAccessKey::new("id", "secret").into()
    }

    fn assume_role(inner: Option<AwsConfigurer>, role_arn: &str) -> AwsConfigurer {
        AwsAssumeRole::new(inner, role_arn).into()
    }

    fn no_env() -> ClientContext {
        ClientContext::new().with_env_lookup(|_| None)
    }

    // ── validate ──

    #[test]
    fn test_access_key_validate() {
        assert!(AwsAccessKey::new("id", "secret").validate().is_ok());

        let error = AwsAccessKey::new("", "secret").validate().unwrap_err();
        assert_eq!(error.to_string(), "AWSAccessKey: missing ID");
        assert!(matches!(error.root(), ConfigError::MissingField { field: "ID" }));

        let error = AwsAccessKey::new("id", "").validate().unwrap_err();
        assert_eq!(error.to_string(), "AWSAccessKey: missing Secret");
    }

    #[test]
    fn test_service_account_always_validates() {
        assert!(AwsServiceAccount.validate().is_ok());
    }

    #[test]
    fn test_assume_role_validate() {
        assert!(assume_role(Some(access_key()), "arn").validate().is_ok());

        let error = assume_role(None, "arn").validate().unwrap_err();
        assert_eq!(
            error.to_string(),
            "AWSAssumeRoleConfigurer: missing base configurer"
        );

        let error = assume_role(Some(AwsAccessKey::new("id", "").into()), "arn")
            .validate()
            .unwrap_err();
        assert_eq!(error.to_string(), "AWSAccessKey: missing Secret");

        let error = assume_role(Some(access_key()), "").validate().unwrap_err();
        assert_eq!(error.to_string(), "AWSAssumeRoleConfigurer: missing roleARN");
    }

    // ── equals ──

    #[test]
    fn test_equals_reflexive_and_none() {
        let configurers = [
            access_key(),
            AwsServiceAccount.into(),
            assume_role(Some(access_key()), "arn"),
            assume_role(None, "arn"),
        ];

        for configurer in &configurers {
            assert!(configurer.equals(Some(configurer)));
            assert!(!configurer.equals(None));
        }
    }

    #[test]
    fn test_equals_across_variants_is_false() {
        assert!(!access_key().equals(Some(&AwsServiceAccount.into())));
        assert!(!AwsConfigurer::from(AwsServiceAccount).equals(Some(&assume_role(None, "arn"))));
    }

    #[test]
    fn test_access_key_equals_compares_fields() {
        assert!(!access_key().equals(Some(&AwsAccessKey::new("id", "other").into())));
        assert!(!access_key().equals(Some(&AwsAccessKey::new("other", "secret").into())));
    }

    #[test]
    fn test_assume_role_equals_compares_inner_configurers() {
        let with_key = assume_role(Some(AwsAccessKey::new("a", "b").into()), "r");
        let with_service_account = assume_role(Some(AwsServiceAccount.into()), "r");
        assert!(!with_key.equals(Some(&with_service_account)));

        assert!(assume_role(None, "r").equals(Some(&assume_role(None, "r"))));
        assert!(!assume_role(None, "r").equals(Some(&with_service_account)));
        assert!(!with_service_account.equals(Some(&assume_role(None, "r"))));
        assert!(!with_service_account.equals(Some(&assume_role(Some(AwsServiceAccount.into()), "x"))));
    }

    #[test]
    fn test_assume_role_equals_two_levels_deep() {
        let nested = |secret: &str| {
            assume_role(
                Some(assume_role(Some(AwsAccessKey::new("id", secret).into()), "inner")),
                "outer",
            )
        };

        assert!(nested("s").equals(Some(&nested("s"))));
        assert!(!nested("s").equals(Some(&nested("t"))));
    }

    // ── from_interface dispatch ──

    #[test]
    fn test_from_interface_null_is_none() {
        assert_eq!(AwsConfigurer::from_interface(&Value::Null).unwrap(), None);
    }

    #[test]
    fn test_from_interface_non_map_is_shape_error() {
        let error = AwsConfigurer::from_interface(&json!("id")).unwrap_err();
        assert!(matches!(error.root(), ConfigError::Shape { found: "string" }));
    }

    #[test]
    fn test_from_interface_empty_map_is_service_account() {
        let configurer = AwsConfigurer::from_interface(&json!({})).unwrap().unwrap();
        assert_eq!(configurer, AwsServiceAccount.into());
        assert!(configurer.validate().is_ok());
    }

    #[test]
    fn test_from_interface_access_key() {
        let configurer = AwsConfigurer::from_interface(&json!({ "id": "AKIA", "secret": "xyz" }))
            .unwrap()
            .unwrap();
        assert_eq!(configurer, AwsAccessKey::new("AKIA", "xyz").into());
        assert!(configurer.validate().is_ok());

        let dto = configurer.to_dto().sanitized();
        assert_eq!(
            serde_json::to_value(&dto).unwrap(),
            json!({ "type": "AWSAccessKey", "values": { "id": "AKIA", "secret": "REDACTED" } })
        );
    }

    #[test]
    fn test_from_interface_access_key_missing_secret() {
        let error = AwsConfigurer::from_interface(&json!({ "id": "AKIA" })).unwrap_err();
        assert_eq!(error.to_string(), "AWSAccessKey: missing 'secret' property");
    }

    #[test]
    fn test_from_interface_role_arn_takes_priority() {
        let configurer = AwsConfigurer::from_interface(&json!({
            "roleARN": "arn",
            "id": "ignored",
            "configurer": { "id": "a", "secret": "b" },
        }))
        .unwrap()
        .unwrap();

        assert_eq!(
            configurer,
            assume_role(Some(AwsAccessKey::new("a", "b").into()), "arn")
        );
    }

    #[test]
    fn test_from_interface_assume_role_configurer_is_optional() {
        let missing = AwsConfigurer::from_interface(&json!({ "roleARN": "arn" }))
            .unwrap()
            .unwrap();
        let null = AwsConfigurer::from_interface(&json!({ "roleARN": "arn", "configurer": null }))
            .unwrap()
            .unwrap();

        assert_eq!(missing, assume_role(None, "arn"));
        assert_eq!(null, assume_role(None, "arn"));
    }

    #[test]
    fn test_from_interface_assume_role_nested_dto() {
        let configurer = AwsConfigurer::from_interface(&json!({
            "roleARN": "arn",
            "configurer": { "type": "AWSServiceAccount" },
        }))
        .unwrap()
        .unwrap();

        assert_eq!(configurer, assume_role(Some(AwsServiceAccount.into()), "arn"));
    }

    #[test]
    fn test_from_interface_tagged_dto() {
        let configurer = AwsConfigurer::from_interface(&json!({
            "type": "AWSAccessKey",
            "values": { "id": "a", "secret": "b" },
        }))
        .unwrap();

        assert_eq!(configurer, Some(AwsAccessKey::new("a", "b").into()));
    }

    #[test]
    fn test_from_interface_unknown_tag_degrades_to_none() {
        let configurer = AwsConfigurer::from_interface(&json!({ "type": "AzureAccessKey" })).unwrap();
        assert_eq!(configurer, None);
    }

    #[test]
    fn test_from_interface_unrecognized_shape() {
        let error = AwsConfigurer::from_interface(&json!({ "secret": "s" })).unwrap_err();
        assert!(matches!(error.root(), ConfigError::UnrecognizedShape));
    }

    #[test]
    fn test_from_interface_rejects_excessive_nesting() {
        let mut document = json!({});
        for _ in 0..=MAX_CONFIGURER_DEPTH {
            document = json!({ "roleARN": "arn", "configurer": document });
        }

        let error = AwsConfigurer::from_interface(&document).unwrap_err();
        assert!(matches!(error.root(), ConfigError::NestingTooDeep { .. }));
    }

    #[test]
    fn test_from_interface_rejects_excessive_nesting_through_dtos() {
        let mut configurer: AwsConfigurer = AwsServiceAccount.into();
        for _ in 0..=MAX_CONFIGURER_DEPTH {
            configurer = assume_role(Some(configurer), "arn");
        }

        let document = configurer.to_dto().to_value();
        let error = AwsConfigurer::from_interface(&document).unwrap_err();
        assert!(matches!(error.root(), ConfigError::NestingTooDeep { .. }));
    }

    #[test]
    fn test_from_interface_accepts_maximum_nesting() {
        let mut configurer: AwsConfigurer = AwsServiceAccount.into();
        for _ in 0..MAX_CONFIGURER_DEPTH {
            configurer = assume_role(Some(configurer), "arn");
        }

        let decoded = AwsConfigurer::from_interface(&configurer.to_dto().to_value()).unwrap();
        assert_eq!(decoded, Some(configurer));
    }

    // ── DTO round trip ──

    #[test]
    fn test_dto_round_trip() {
        let configurers = [
            access_key(),
            AwsServiceAccount.into(),
            assume_role(Some(access_key()), "arn"),
            assume_role(Some(AwsServiceAccount.into()), "arn"),
            assume_role(None, "arn"),
            assume_role(Some(assume_role(Some(access_key()), "inner")), "outer"),
        ];

        for configurer in configurers {
            let dto = configurer.to_dto();
            let decoded = AwsConfigurer::decode_tagged(&dto.type_tag, &dto.values, 0).unwrap();
            assert!(configurer.equals(Some(&decoded)), "{configurer:?}");

            let json = serde_json::to_string(&dto).unwrap();
            let reparsed: AwsConfigurerDto = serde_json::from_str(&json).unwrap();
            assert_eq!(reparsed.to_configurer(), Some(configurer));
        }
    }

    // ── sanitize ──

    #[test]
    fn test_sanitize_access_key() {
        let mut dto = access_key().to_dto();
        dto.sanitize();

        assert_eq!(dto.values["id"], json!("id"));
        assert_eq!(dto.values["secret"], json!(REDACTED));
        assert_eq!(dto.to_configurer(), Some(AwsAccessKey::new("id", REDACTED).into()));
    }

    #[test]
    fn test_sanitize_service_account_is_noop() {
        let dto = AwsConfigurer::from(AwsServiceAccount).to_dto();
        assert_eq!(dto.clone().sanitized(), dto);
    }

    #[test]
    fn test_sanitize_assume_role_recurses() {
        let configurer = assume_role(Some(assume_role(Some(access_key()), "inner")), "outer");
        let dto = configurer.to_dto().sanitized();

        let expected = assume_role(
            Some(assume_role(Some(AwsAccessKey::new("id", REDACTED).into()), "inner")),
            "outer",
        );
        assert_eq!(dto.to_configurer(), Some(expected));
        assert_eq!(dto.values["roleARN"], json!("outer"));
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let configurers = [
            access_key(),
            assume_role(Some(access_key()), "arn"),
            assume_role(Some(assume_role(Some(access_key()), "inner")), "outer"),
        ];

        for configurer in configurers {
            let once = configurer.to_dto().sanitized();
            let twice = once.clone().sanitized();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_sanitize_leaves_empty_secret() {
        let mut dto = AwsConfigurer::from(AwsAccessKey::new("id", "")).to_dto();
        dto.sanitize();
        assert_eq!(dto.values["secret"], json!(""));
    }

    #[test]
    fn test_debug_never_prints_secret() {
        let rendered = format!("{:?}", access_key());
        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains(REDACTED));
    }

    // ── create_aws_config ──

    #[test]
    fn test_access_key_config() {
        let config = access_key().create_aws_config("us-east-1", &no_env()).unwrap();

        assert_eq!(config.region, "us-east-1");
        assert_eq!(
            config.credentials,
            AwsCredentialsProvider::Static(AwsAccessKey::new("id", "secret").credentials())
        );
    }

    #[test]
    fn test_invalid_configurer_fails_before_building() {
        let error = AwsConfigurer::from(AwsAccessKey::new("id", ""))
            .create_aws_config("us-east-1", &no_env())
            .unwrap_err();
        assert_eq!(error.to_string(), "AWSAccessKey: missing Secret");
    }

    #[test]
    fn test_service_account_discovers_ambient_identity() {
        let context = ClientContext::new().with_env_lookup(|name| match name {
            "AWS_ROLE_ARN" => Some("arn:aws:iam::1:role/pod".to_string()),
            "AWS_WEB_IDENTITY_TOKEN_FILE" => Some("/var/run/token".to_string()),
            "AWS_REGION" => Some("eu-west-1".to_string()),
            _ => None,
        });

        let config = AwsConfigurer::from(AwsServiceAccount)
            .create_aws_config("", &context)
            .unwrap();

        assert_eq!(config.region, "eu-west-1");
        let AwsCredentialsProvider::Ambient(identity) = config.credentials else {
            panic!("expected ambient credentials");
        };
        assert!(identity.is_web_identity());
        assert_eq!(identity.web_identity_token_file, Some(PathBuf::from("/var/run/token")));
    }

    #[test]
    fn test_service_account_without_region_fails() {
        let error = AwsConfigurer::from(AwsServiceAccount)
            .create_aws_config("", &no_env())
            .unwrap_err();
        assert!(matches!(error.root(), ConfigError::Delegated { .. }));
    }

    #[test]
    fn test_assume_role_layers_over_inner_credentials() {
        let configurer = assume_role(Some(assume_role(Some(access_key()), "inner")), "outer");
        let config = configurer.create_aws_config("us-west-2", &no_env()).unwrap();

        let expected = AwsCredentialsProvider::AssumeRole {
            role_arn: "outer".to_string(),
            session_name: DEFAULT_ROLE_SESSION_NAME.to_string(),
            source: Box::new(AwsCredentialsProvider::AssumeRole {
                role_arn: "inner".to_string(),
                session_name: DEFAULT_ROLE_SESSION_NAME.to_string(),
                source: Box::new(AwsCredentialsProvider::Static(
                    AwsAccessKey::new("id", "secret").credentials(),
                )),
            }),
        };
        assert_eq!(config.credentials, expected);
        assert_eq!(config.region, "us-west-2");
    }

    #[test]
    fn test_assume_role_propagates_inner_failure() {
        let configurer = assume_role(Some(AwsServiceAccount.into()), "arn");
        let error = configurer.create_aws_config("", &no_env()).unwrap_err();

        assert!(error.to_string().starts_with("AWSAssumeRoleConfigurer: AWSServiceAccount:"));
        assert!(matches!(error.root(), ConfigError::Delegated { .. }));
    }

    #[test]
    fn test_cancelled_context_fails() {
        let context = no_env();
        context.cancellation_handle().cancel();

        for configurer in [access_key(), AwsServiceAccount.into(), assume_role(Some(access_key()), "arn")] {
            let error = configurer.create_aws_config("us-east-1", &context).unwrap_err();
            assert!(matches!(error.root(), ConfigError::Cancelled));
        }
    }
}
