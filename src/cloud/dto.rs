//! The tagged transfer representation shared by every provider's configurers.
//!
//! A [`ConfigurerDto`] is `{ "type": <tag>, "values": { ... } }`. The tag
//! selects the decode path and the redaction rules; the shape of `values`
//! is owned by the configurer variant that the tag names.

use std::marker::PhantomData;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{error, warn};

use super::{
    error::{ConfigError, Result, ResultExt},
    extract::{as_interface_map, get_interface_value, get_optional_interface_value, ValueMap},
    Config,
    ConfigDto,
};


/// Replaces secret material in sanitized DTOs.
pub const REDACTED: &str = "REDACTED";

/// How many configurers may be nested inside one another (e.g. assume-role chains).
pub const MAX_CONFIGURER_DEPTH: usize = 8;


/// The capability set shared by one provider's credential strategies.
pub trait Configurer: Config + Clone + Sized {
    /// Prefix for dispatch errors, e.g. `AWSConfigurer`.
    const TYPE_NAME: &'static str;

    /// Prefix for DTO errors and log lines, e.g. `AWSConfigurerDTO`.
    const DTO_NAME: &'static str;

    /// Every DTO tag this provider decodes.
    const TYPE_TAGS: &'static [&'static str];

    /// Keys that [`Configurer::from_interface`] dispatches on before `type`.
    const SHAPE_KEYS: &'static [&'static str];

    /// Decodes an untyped value by shape-sniffing its keys.
    ///
    /// `null` decodes to `Ok(None)`: no credentials were specified.
    fn from_interface(value: &Value) -> Result<Option<Self>> {
        Self::from_interface_at_depth(value, 0)
    }

    /// [`Configurer::from_interface`] for a value nested `depth` configurers deep.
    fn from_interface_at_depth(value: &Value, depth: usize) -> Result<Option<Self>>;

    /// Decodes the `values` bag of a DTO carrying `type_tag`.
    ///
    /// Unknown tags fail with [`ConfigError::UnrecognizedVariant`].
    fn decode_tagged(type_tag: &str, values: &ValueMap, depth: usize) -> Result<Self>;

    fn to_dto(&self) -> ConfigurerDto<Self>;

    /// Redacts the secret-bearing entries of a `values` bag tagged `type_tag`.
    fn sanitize_values(type_tag: &str, values: &mut ValueMap);
}


/// Fails once `depth` goes past [`MAX_CONFIGURER_DEPTH`].
pub(crate) fn check_depth(depth: usize) -> Result<()> {
    if depth > MAX_CONFIGURER_DEPTH {
        return Err(ConfigError::NestingTooDeep {
            max_depth: MAX_CONFIGURER_DEPTH,
        });
    }

    Ok(())
}


#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(bound = "")]
pub struct ConfigurerDto<C> {
    #[serde(rename = "type")]
    pub type_tag: String,

    #[serde(skip_serializing_if = "ValueMap::is_empty")]
    pub values: ValueMap,

    #[serde(skip)]
    configurer: PhantomData<fn() -> C>,
}

impl<C> Default for ConfigurerDto<C> {
    fn default() -> Self {
        Self {
            type_tag: String::new(),
            values: ValueMap::new(),
            configurer: PhantomData,
        }
    }
}

impl<C: Configurer> ConfigurerDto<C> {
    pub fn new<S: Into<String>>(type_tag: S, values: ValueMap) -> Self {
        Self {
            type_tag: type_tag.into(),
            values,
            configurer: PhantomData,
        }
    }

    /// Reads `{type, values?}` out of an untyped value.
    pub fn from_interface(value: &Value) -> Result<Self> {
        let map = as_interface_map(value).prefixed(C::DTO_NAME)?;
        Self::from_interface_map(map)
    }

    pub(crate) fn from_interface_map(map: &ValueMap) -> Result<Self> {
        let type_tag: String = get_interface_value(map, "type").prefixed(C::DTO_NAME)?;

        let values = get_optional_interface_value::<&ValueMap>(map, "values")
            .prefixed(C::DTO_NAME)?
            .cloned()
            .unwrap_or_default();

        Ok(Self::new(type_tag, values))
    }

    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }

    /// Converts back into a live configurer.
    ///
    /// An empty tag means "no configurer". An unknown tag, or values that fail
    /// to decode, are logged and also produce `None`; callers must treat that
    /// as an unusable configuration.
    pub fn to_configurer(&self) -> Option<C> {
        match self.resolve_configurer(0) {
            Ok(configurer) => configurer,
            Err(error) => {
                error!(
                    "{}: ToConfigurer: failed to convert to {}: {}",
                    C::DTO_NAME,
                    C::TYPE_NAME,
                    error
                );
                None
            }
        }
    }

    /// Like [`ConfigurerDto::to_configurer`], but nesting-depth violations are
    /// returned instead of logged.
    pub(crate) fn resolve_configurer(&self, depth: usize) -> Result<Option<C>> {
        if self.type_tag.is_empty() {
            return Ok(None);
        }

        let error = match C::decode_tagged(&self.type_tag, &self.values, depth) {
            Ok(configurer) => return Ok(Some(configurer)),
            Err(error) => error,
        };

        if matches!(error.root(), ConfigError::NestingTooDeep { .. }) {
            return Err(error);
        }

        if matches!(error.root(), ConfigError::UnrecognizedVariant(_)) {
            error!("{}: ToConfigurer: {}", C::DTO_NAME, error);
        } else {
            error!(
                "{}: ToConfigurer: failed to convert to {}: {}",
                C::DTO_NAME,
                C::TYPE_NAME,
                error
            );
        }

        Ok(None)
    }

    /// The DTO as an untyped value, as stored when nested inside another DTO.
    pub fn to_value(&self) -> Value {
        let mut map = ValueMap::with_capacity(2);
        map.insert("type".to_string(), Value::String(self.type_tag.clone()));
        if !self.values.is_empty() {
            map.insert("values".to_string(), Value::Object(self.values.clone()));
        }

        Value::Object(map)
    }
}

impl<C: Configurer> ConfigDto for ConfigurerDto<C> {
    fn sanitize(&mut self) {
        C::sanitize_values(&self.type_tag, &mut self.values);
    }
}

impl<'de, C: Configurer> Deserialize<'de> for ConfigurerDto<C> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_interface(&value).map_err(D::Error::custom)
    }
}


/// Decodes the optional `configurer` entry of a top-level document by shape.
pub(crate) fn configurer_entry<C: Configurer>(map: &ValueMap) -> Result<Option<C>> {
    match get_optional_interface_value::<&Value>(map, "configurer")? {
        Some(value) => C::from_interface(value),
        None => Ok(None),
    }
}

/// Decodes the optional `configurer` entry of a top-level DTO; it must be tagged.
pub(crate) fn configurer_dto_entry<C: Configurer>(map: &ValueMap) -> Result<Option<ConfigurerDto<C>>> {
    get_optional_interface_value::<&Value>(map, "configurer")?
        .map(ConfigurerDto::from_interface)
        .transpose()
}


fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(string) => string.is_empty(),
        Value::Array(array) => array.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Overwrites `values[key]` with [`REDACTED`] if it is present and non-empty.
pub(crate) fn redact_value(values: &mut ValueMap, key: &str) {
    if let Some(value) = values.get_mut(key) {
        if !is_empty_value(value) {
            *value = Value::String(REDACTED.to_string());
        }
    }
}

/// Whether [`Configurer::from_interface`] reads `map` as a tagged DTO
/// rather than by the shape of its keys.
fn dispatches_on_tag<C: Configurer>(map: &ValueMap) -> bool {
    map.contains_key("type") && !C::SHAPE_KEYS.iter().any(|key| map.contains_key(*key))
}

/// Sanitizes the configurer nested under `values[key]`.
///
/// The entry is read with the same priority as [`Configurer::from_interface`].
/// A tagged DTO with a tag the provider owns is sanitized in place; any other
/// shape is normalised into its DTO first. Entries that cannot be decoded, or
/// carry a foreign tag, are dropped since their secrets cannot be located.
pub(crate) fn sanitize_nested<C: Configurer>(values: &mut ValueMap, key: &str) {
    let Some(nested) = values.get_mut(key) else {
        return;
    };
    if nested.is_null() {
        return;
    }

    let nested_dto = match nested.as_object() {
        Some(map) if dispatches_on_tag::<C>(map) => ConfigurerDto::<C>::from_interface_map(map)
            .ok()
            .filter(|dto| C::TYPE_TAGS.contains(&dto.type_tag.as_str())),
        Some(_) => C::from_interface(nested).ok().flatten().map(|configurer| configurer.to_dto()),
        None => None,
    };

    *nested = match nested_dto {
        Some(dto) => dto.sanitized().to_value(),
        None => {
            warn!(
                "{}: Sanitize: dropping undecodable nested '{}' entry",
                C::DTO_NAME,
                key
            );
            Value::Null
        }
    };
}
