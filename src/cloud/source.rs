//! Where an integration configuration came from.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};


/// Origin of a configuration. Later variants take priority over earlier ones
/// when two sources describe the same integration.
///
/// Serialized as its [`ConfigSource::name`]; unrecognized names deserialize
/// to [`ConfigSource::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ConfigSource {
    #[default]
    Unknown,
    ConfigController,
    MultiCloud,
    ConfigFile,
    Helm,
}

impl ConfigSource {
    pub const ALL: [ConfigSource; 5] = [
        ConfigSource::Unknown,
        ConfigSource::ConfigController,
        ConfigSource::MultiCloud,
        ConfigSource::ConfigFile,
        ConfigSource::Helm,
    ];

    /// Parses a source name; unrecognized names map to [`ConfigSource::Unknown`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "configController" => ConfigSource::ConfigController,
            "configfile" => ConfigSource::ConfigFile,
            "helm" => ConfigSource::Helm,
            "multicloud" => ConfigSource::MultiCloud,
            _ => ConfigSource::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ConfigSource::Unknown => "unknown",
            ConfigSource::ConfigController => "configController",
            ConfigSource::MultiCloud => "multicloud",
            ConfigSource::ConfigFile => "configfile",
            ConfigSource::Helm => "helm",
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ConfigSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ConfigSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(ConfigSource::from_name(&name))
    }
}
