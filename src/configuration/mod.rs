//! Application configuration for the `cloud-configurer` binary: base paths,
//! logging and the list of integration documents to load
//! (see `data/configuration.toml`).
//!
//! Your starting point should probably be [`Configuration::load_from_default_path`].
//!
//! # Internals
//! The TOML file is first deserialized into [`UnresolvedConfiguration`],
//! which is then turned into [`Configuration`] by its `resolve` method.
//! Resolution recursively resolves every table and is where validation
//! happens: log level filters are parsed, `{BASE_DATA_DIRECTORY}` placeholders
//! are substituted, integration source names are checked and every
//! integration file must exist.
//!
//! The cloud integrations themselves are decoded later, by
//! [`load_integration_file`][crate::cloud::integration::load_integration_file].

#![allow(rustdoc::private_intra_doc_links)]

mod structure;
mod traits;
mod utilities;

pub use structure::*;
