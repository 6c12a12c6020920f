//! Command-line interface definitions for the `cloud-configurer` binary.

use std::path::PathBuf;

use clap::Parser;
use cloud_configurer::cloud::ConfigSource;



/// Command-line arguments.
#[derive(Parser)]
#[command(
    name = "cloud-configurer",
    author,
    about = "Loads cloud integration documents, merges them by source priority \
             and prints the sanitized result.",
    version
)]
pub struct CLIArgs {
    /// This is the path to the configuration file to use.
    /// If unspecified, this defaults to `./data/configuration.toml`.
    #[arg(
        short = 'c',
        long = "configuration-file-path",
        help = "Configuration file to use. If unspecified, this defaults to ./data/configuration.toml"
    )]
    pub configuration_file_path: Option<PathBuf>,

    #[arg(
        short = 'i',
        long = "integration-file-path",
        help = "Additional integration document (JSON) to merge with the configured sources."
    )]
    pub integration_file_path: Option<PathBuf>,

    #[arg(
        long = "source",
        default_value = "configfile",
        value_parser = parse_config_source,
        help = "Source of the document passed with --integration-file-path. \
                One of configController, multicloud, configfile or helm."
    )]
    pub source: ConfigSource,

    #[arg(
        long = "strict",
        help = "If this flag is present, the program exits with an error \
                when any merged integration fails validation."
    )]
    pub strict: bool,
}


/// Parse a source name, rejecting names that map to [`ConfigSource::Unknown`].
fn parse_config_source(value: &str) -> Result<ConfigSource, String> {
    match ConfigSource::from_name(value) {
        ConfigSource::Unknown => Err(format!(
            "unknown integration source \"{value}\", expected one of \
             configController, multicloud, configfile or helm"
        )),
        source => Ok(source),
    }
}
