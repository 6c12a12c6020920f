use std::path::PathBuf;

use miette::{miette, Context, IntoDiagnostic, Result};
use serde::Deserialize;

use super::BasePathsConfiguration;
use crate::{
    cloud::ConfigSource,
    configuration::traits::ResolvableConfigurationWithContext,
};


#[derive(Deserialize, Clone, Debug, Default)]
pub(super) struct UnresolvedIntegrationsConfiguration {
    #[serde(default)]
    sources: Vec<UnresolvedIntegrationSource>,
}

#[derive(Deserialize, Clone, Debug)]
struct UnresolvedIntegrationSource {
    /// One of `configController`, `multicloud`, `configfile` or `helm`.
    source: String,

    /// Integration document (JSON). Supports the `{BASE_DATA_DIRECTORY}` placeholder;
    /// relative paths are relative to the base data directory.
    file_path: String,
}


#[derive(Clone, Debug, Default)]
pub struct IntegrationsConfiguration {
    pub sources: Vec<IntegrationSource>,
}

/// An integration document and the priority of the entries it contains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntegrationSource {
    pub source: ConfigSource,
    pub file_path: PathBuf,
}


impl ResolvableConfigurationWithContext for UnresolvedIntegrationsConfiguration {
    type Resolved = IntegrationsConfiguration;
    type Context = BasePathsConfiguration;

    fn resolve(self, context: Self::Context) -> Result<Self::Resolved> {
        let sources = self
            .sources
            .into_iter()
            .enumerate()
            .map(|(index, unresolved_source)| {
                let source = ConfigSource::from_name(&unresolved_source.source);
                if source == ConfigSource::Unknown {
                    return Err(miette!(
                        "Unknown integration source \"{}\" in sources[{}].",
                        unresolved_source.source,
                        index
                    ));
                }

                let file_path = context.resolve_path(unresolved_source.file_path);

                if !file_path.is_file() {
                    return Err(miette!(
                        "Integration file for sources[{}] does not exist: {}.",
                        index,
                        file_path.display()
                    ));
                }

                let file_path = dunce::canonicalize(&file_path)
                    .into_diagnostic()
                    .wrap_err_with(|| {
                        miette!("Failed to canonicalize integration file path for sources[{}].", index)
                    })?;

                Ok(IntegrationSource { source, file_path })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(IntegrationsConfiguration { sources })
    }
}
