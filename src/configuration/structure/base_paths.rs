use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use miette::{miette, Context, IntoDiagnostic, Result};
use serde::Deserialize;

use crate::configuration::{
    traits::ResolvableConfiguration,
    utilities::replace_placeholders_in_path,
};


pub const BASE_DATA_DIRECTORY_PLACEHOLDER: &str = "{BASE_DATA_DIRECTORY}";


#[derive(Deserialize, Debug)]
pub(super) struct UnresolvedBasePathsConfiguration {
    base_data_directory_path: String,
}

/// Directory that relative paths and the `{BASE_DATA_DIRECTORY}`
/// placeholder in other tables refer to.
#[derive(Debug, Clone)]
pub struct BasePathsConfiguration {
    pub base_data_directory_path: PathBuf,
}

impl ResolvableConfiguration for UnresolvedBasePathsConfiguration {
    type Resolved = BasePathsConfiguration;

    fn resolve(self) -> Result<Self::Resolved> {
        let base_data_directory_path = PathBuf::from(self.base_data_directory_path);

        if base_data_directory_path.exists() && !base_data_directory_path.is_dir() {
            return Err(miette!(
                "Base data directory path {} exists, but is not a directory!",
                base_data_directory_path.display()
            ));
        }

        fs::create_dir_all(&base_data_directory_path)
            .into_diagnostic()
            .wrap_err("Failed to create missing base data directory.")?;

        let base_data_directory_path = dunce::canonicalize(base_data_directory_path)
            .into_diagnostic()
            .wrap_err("Failed to canonicalize base data directory path.")?;


        Ok(BasePathsConfiguration {
            base_data_directory_path,
        })
    }
}


impl BasePathsConfiguration {
    pub fn placeholders_map(&self) -> HashMap<&'static str, String> {
        HashMap::from([(
            BASE_DATA_DIRECTORY_PLACEHOLDER,
            self.base_data_directory_path.to_string_lossy().to_string(),
        )])
    }

    /// Substitutes placeholders in a configured path. Paths that are still
    /// relative afterwards are taken relative to the base data directory.
    pub fn resolve_path<S: Into<String>>(&self, configured_path: S) -> PathBuf {
        let path = replace_placeholders_in_path(configured_path, self.placeholders_map());

        if path.is_relative() {
            self.base_data_directory_path.join(path)
        } else {
            path
        }
    }

    pub fn base_data_directory(&self) -> &Path {
        &self.base_data_directory_path
    }
}
