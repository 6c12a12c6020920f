use std::path::PathBuf;

use miette::{miette, Context, IntoDiagnostic, Result};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use super::base_paths::BasePathsConfiguration;
use crate::configuration::traits::ResolvableConfigurationWithContext;


fn default_log_file_name() -> String {
    "cloud-configurer.log".to_string()
}


#[derive(Deserialize, Clone, Debug)]
pub(super) struct UnresolvedLoggingConfiguration {
    console_output_level_filter: String,

    log_file_output_level_filter: String,

    log_file_output_directory: String,

    #[serde(default = "default_log_file_name")]
    log_file_name: String,
}

/// Tracing filters for the console and the log file.
///
/// Filters use the `tracing_subscriber::EnvFilter` directive syntax,
/// e.g. `info,cloud_configurer=debug`.
#[derive(Clone, Debug)]
pub struct LoggingConfiguration {
    pub console_output_level_filter: String,

    pub log_file_output_level_filter: String,

    pub log_file_output_directory: PathBuf,

    pub log_file_name: String,
}

impl ResolvableConfigurationWithContext for UnresolvedLoggingConfiguration {
    type Resolved = LoggingConfiguration;
    type Context = BasePathsConfiguration;

    fn resolve(self, context: Self::Context) -> Result<Self::Resolved> {
        parse_level_filter(&self.console_output_level_filter)
            .wrap_err("Failed to parse field console_output_level_filter")?;

        parse_level_filter(&self.log_file_output_level_filter)
            .wrap_err("Failed to parse field log_file_output_level_filter")?;

        if self.log_file_name.trim().is_empty() {
            return Err(miette!("Field log_file_name must not be empty."));
        }


        Ok(Self::Resolved {
            console_output_level_filter: self.console_output_level_filter,
            log_file_output_level_filter: self.log_file_output_level_filter,
            log_file_output_directory: context.resolve_path(self.log_file_output_directory),
            log_file_name: self.log_file_name,
        })
    }
}

fn parse_level_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .into_diagnostic()
        .wrap_err_with(|| miette!("Invalid level filter: \"{}\".", directives))
}

impl LoggingConfiguration {
    pub fn console_output_level_filter(&self) -> Result<EnvFilter> {
        parse_level_filter(&self.console_output_level_filter)
    }

    pub fn log_file_output_level_filter(&self) -> Result<EnvFilter> {
        parse_level_filter(&self.log_file_output_level_filter)
    }
}
