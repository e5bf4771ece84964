//! # EventHive Store Bootstrap
//!
//! Provisions the EventHive ticketing schema in dependency order, seeds the
//! baseline dataset and verifies the result. Every step is safe to re-run.

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod seeds;
pub mod telemetry;
pub mod verify;
pub use migration;

pub use bootstrap::{BootstrapReport, BootstrapState, Bootstrapper, bootstrap};
pub use error::BootstrapError;
