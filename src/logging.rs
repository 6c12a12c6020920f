//! Tracing setup for the binary.

use std::{fs, io, path::Path};

use miette::{miette, Context, IntoDiagnostic, Result};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};


/// Installs the global tracing subscriber: a console layer on standard error
/// and a non-blocking file layer writing to `log_file_directory/log_file_name`,
/// each with its own filter.
///
/// Log output that has not been flushed yet is lost once the returned guard is
/// dropped, so hold on to it until the program exits.
pub fn initialize_tracing(
    console_level_filter: EnvFilter,
    log_file_level_filter: EnvFilter,
    log_file_directory: &Path,
    log_file_name: &str,
) -> Result<WorkerGuard> {
    fs::create_dir_all(log_file_directory)
        .into_diagnostic()
        .wrap_err_with(|| {
            miette!(
                "Failed to create log file directory at {}.",
                log_file_directory.display()
            )
        })?;

    let file_appender = rolling::never(log_file_directory, log_file_name);
    let (non_blocking_file_writer, guard) = tracing_appender::non_blocking(file_appender);


    let console_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(console_level_filter);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file_writer)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_filter(log_file_level_filter);


    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .into_diagnostic()
        .wrap_err("Failed to install global tracing subscriber.")?;

    Ok(guard)
}
