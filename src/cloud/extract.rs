//! Typed access to untyped, decoded documents.
//!
//! Every decoder in this crate pulls its fields out of a [`ValueMap`] through
//! [`get_interface_value`], so a malformed document always fails with one of
//! two errors: [`ConfigError::MissingKey`] or [`ConfigError::TypeMismatch`].

use serde_json::Value;

use super::error::{ConfigError, Result};


/// A string-keyed map of arbitrary decoded values.
pub type ValueMap = serde_json::Map<String, Value>;


/// Types that can be borrowed or copied out of a [`Value`].
pub trait InterfaceValue<'a>: Sized {
    /// Name used in [`ConfigError::TypeMismatch`] messages.
    const EXPECTED: &'static str;

    fn from_interface_value(value: &'a Value) -> Option<Self>;
}

impl<'a> InterfaceValue<'a> for String {
    const EXPECTED: &'static str = "string";

    fn from_interface_value(value: &'a Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl<'a> InterfaceValue<'a> for &'a str {
    const EXPECTED: &'static str = "string";

    fn from_interface_value(value: &'a Value) -> Option<Self> {
        value.as_str()
    }
}

impl<'a> InterfaceValue<'a> for bool {
    const EXPECTED: &'static str = "bool";

    fn from_interface_value(value: &'a Value) -> Option<Self> {
        value.as_bool()
    }
}

impl<'a> InterfaceValue<'a> for &'a ValueMap {
    const EXPECTED: &'static str = "map";

    fn from_interface_value(value: &'a Value) -> Option<Self> {
        value.as_object()
    }
}

impl<'a> InterfaceValue<'a> for &'a Value {
    const EXPECTED: &'static str = "any";

    fn from_interface_value(value: &'a Value) -> Option<Self> {
        Some(value)
    }
}


/// Extracts `key` from `map` as `T`.
pub fn get_interface_value<'a, T>(map: &'a ValueMap, key: &str) -> Result<T>
where
    T: InterfaceValue<'a>,
{
    let value = map.get(key).ok_or_else(|| ConfigError::MissingKey {
        key: key.to_string(),
    })?;

    T::from_interface_value(value).ok_or_else(|| ConfigError::TypeMismatch {
        key: key.to_string(),
        expected: T::EXPECTED,
        found: value_kind(value),
    })
}

/// Like [`get_interface_value`], but an absent key or an explicit `null` yields `None`.
pub fn get_optional_interface_value<'a, T>(map: &'a ValueMap, key: &str) -> Result<Option<T>>
where
    T: InterfaceValue<'a>,
{
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => get_interface_value(map, key).map(Some),
    }
}

/// A string that may be left out of a document; absent reads as empty.
pub fn get_optional_string(map: &ValueMap, key: &str) -> Result<String> {
    get_optional_interface_value::<String>(map, key).map(Option::unwrap_or_default)
}

/// Views an untyped value as a string-keyed map.
pub fn as_interface_map(value: &Value) -> Result<&ValueMap> {
    value.as_object().ok_or(ConfigError::Shape {
        found: value_kind(value),
    })
}

/// Short name of the JSON shape held by `value`.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}
