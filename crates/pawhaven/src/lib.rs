//! Pet adoption platform: shelters list pets, adopters apply, shelters review applications.

pub mod access;
pub mod accounts;
pub mod adoptions;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod http;
pub mod notifications;
pub mod pets;
pub mod platform;
pub mod stats;
pub mod store;
pub mod telemetry;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use platform::Platform;
