//! Error types for the cloud configuration core.

use thiserror::Error;


pub type Result<T, E = ConfigError> = std::result::Result<T, E>;


/// Errors produced while decoding, validating or building cloud configurations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required key is absent from an untyped document.
    #[error("missing '{key}' property")]
    MissingKey { key: String },

    /// A required field is present but empty at validation time.
    #[error("missing {field}")]
    MissingField { field: &'static str },

    /// A key is present but holds a value of the wrong shape.
    #[error("property '{key}' had expected type '{expected}' but found '{found}'")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The untyped value handed to a decoder is not a string-keyed map.
    #[error("could not cast interface as map, found '{found}'")]
    Shape { found: &'static str },

    /// None of the dispatch rules matched the keys of an untyped map.
    #[error("interface is not a valid configurer format")]
    UnrecognizedShape,

    /// A DTO type tag that no configurer variant owns.
    #[error("invalid type: '{0}'")]
    UnrecognizedVariant(String),

    #[error("configurer nesting exceeds the maximum depth of {max_depth}")]
    NestingTooDeep { max_depth: usize },

    /// The caller cancelled the operation or its deadline passed.
    #[error("operation was cancelled")]
    Cancelled,

    /// A native credential or client builder failed.
    #[error("{message}")]
    Delegated {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Names the type that produced the wrapped error.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<ConfigError>,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Shorthand for a validation failure on `type_name`.
    pub fn missing_field(type_name: &str, field: &'static str) -> Self {
        ConfigError::MissingField { field }.prefixed(type_name)
    }

    pub fn delegated<S: Into<String>>(message: S) -> Self {
        ConfigError::Delegated {
            message: message.into(),
            source: None,
        }
    }

    pub fn delegated_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        ConfigError::Delegated {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wraps this error with the name of the type that failed.
    pub fn prefixed<S: Into<String>>(self, context: S) -> Self {
        ConfigError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping any [`ConfigError::Context`] layers.
    pub fn root(&self) -> &ConfigError {
        let mut current = self;
        while let ConfigError::Context { source, .. } = current {
            current = source;
        }
        current
    }
}


pub trait ResultExt<T> {
    fn prefixed<S: Into<String>>(self, context: S) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn prefixed<S: Into<String>>(self, context: S) -> Result<T> {
        self.map_err(|error| error.prefixed(context))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_display_chains_type_names() {
        let error = ConfigError::missing_field("AWSAccessKey", "Secret")
            .prefixed("AthenaConfiguration");

        assert_eq!(
            error.to_string(),
            "AthenaConfiguration: AWSAccessKey: missing Secret"
        );
    }

    #[test]
    fn test_root_skips_context_layers() {
        let error = ConfigError::UnrecognizedShape
            .prefixed("inner")
            .prefixed("outer");

        assert!(matches!(error.root(), ConfigError::UnrecognizedShape));
    }

    #[test]
    fn test_root_of_unwrapped_error_is_itself() {
        let error = ConfigError::Cancelled;
        assert!(matches!(error.root(), ConfigError::Cancelled));
    }

    #[test]
    fn test_result_ext_prefixes_only_errors() {
        let ok: Result<u8> = Ok(1);
        assert_eq!(ok.prefixed("ignored").ok(), Some(1));

        let err: Result<u8> = Err(ConfigError::MissingKey { key: "id".into() });
        let message = err.prefixed("AWSAccessKey").unwrap_err().to_string();
        assert_eq!(message, "AWSAccessKey: missing 'id' property");
    }
}
