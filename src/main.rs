use clap::Parser;
use cloud_configurer::{
    cloud::{
        integration::{load_integration_file, merge_by_key},
        Config,
        ConfigSource,
        KeyedConfig,
        SourcedConfig,
    },
    configuration::Configuration,
    logging::initialize_tracing,
};
use miette::{miette, Context, IntoDiagnostic, Result};
use tracing::{info, warn};

use crate::cli::CLIArgs;

mod cli;


fn main() -> Result<()> {
    let cli_args = CLIArgs::parse();

    // Load configuration.
    let configuration = match cli_args.configuration_file_path.as_ref() {
        Some(path) => {
            eprintln!("Loading configuration: {}", path.display());
            Configuration::load_from_path(path)
        }
        None => {
            eprintln!("Loading configuration at default path.");
            Configuration::load_from_default_path()
        }
    }
    .wrap_err("Failed to load configuration file.")?;

    eprintln!(
        "Configuration loaded: {}.",
        configuration.file_path.display()
    );


    let logging_raii_guard = initialize_tracing(
        configuration.logging.console_output_level_filter()?,
        configuration.logging.log_file_output_level_filter()?,
        &configuration.logging.log_file_output_directory,
        &configuration.logging.log_file_name,
    )
    .wrap_err("Failed to initialize tracing.")?;

    info!("Tracing initialized.");


    // Collect the configured sources plus the one passed on the command line.
    let mut sources: Vec<(ConfigSource, std::path::PathBuf)> = configuration
        .integrations
        .sources
        .iter()
        .map(|source| (source.source, source.file_path.clone()))
        .collect();

    if let Some(integration_file_path) = cli_args.integration_file_path.as_ref() {
        sources.push((cli_args.source, integration_file_path.clone()));
    }


    let mut loaded_configs: Vec<SourcedConfig> = Vec::new();
    for (source, file_path) in &sources {
        let configs = load_integration_file(file_path, *source)
            .into_diagnostic()
            .wrap_err_with(|| {
                miette!("Failed to load integration file {}.", file_path.display())
            })?;

        info!(
            "Loaded {} integration(s) from {} ({}).",
            configs.len(),
            file_path.display(),
            source
        );
        loaded_configs.extend(configs);
    }

    let merged_configs = merge_by_key(loaded_configs);
    info!("{} integration(s) after merging.", merged_configs.len());


    let mut invalid_count = 0usize;
    for sourced_config in &merged_configs {
        let key = sourced_config.config.key();

        match sourced_config.config.validate() {
            Ok(()) => info!(
                "Integration {} ({}, {}) is valid.",
                key,
                sourced_config.config.kind(),
                sourced_config.source
            ),
            Err(error) => {
                invalid_count += 1;
                warn!(
                    "Integration {} ({}, {}) is invalid: {}",
                    key,
                    sourced_config.config.kind(),
                    sourced_config.source,
                    error
                );
            }
        }
    }

    if cli_args.strict && invalid_count > 0 {
        return Err(miette!(
            "{} of {} merged integration(s) failed validation.",
            invalid_count,
            merged_configs.len()
        ));
    }


    let output = serde_json::to_string_pretty(&merged_configs)
        .into_diagnostic()
        .wrap_err("Failed to serialize merged integrations.")?;
    println!("{output}");


    drop(logging_raii_guard);
    Ok(())
}
