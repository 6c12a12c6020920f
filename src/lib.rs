//! Polymorphic cloud credential configuration.
//!
//! [`cloud`] holds the configurer variants, their DTOs and the top-level
//! configuration objects. [`configuration`] and [`logging`] back the
//! `cloud-configurer` binary.

pub mod cloud;
pub mod configuration;
pub mod logging;
