//! azbuilt - as-built documentation for Azure subscriptions
//!
//! Inventories the resources of one or more subscriptions, groups them into
//! per-service sections and renders a report document.

pub mod azure;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod resource;

/// Version injected at compile time via AZBUILT_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("AZBUILT_VERSION") {
    Some(v) => v,
    None => "dev",
};
