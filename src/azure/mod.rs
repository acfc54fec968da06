//! Azure Resource Manager interaction module
//!
//! This module provides the functionality for talking to Azure Resource Manager
//! (ARM): authentication, the HTTP client, and subscription discovery.
//!
//! # Module Structure
//!
//! - [`auth`] - Access tokens from env, service principal, or the Azure CLI
//! - [`client`] - Main ARM client with URL builders and `nextLink` pagination
//! - [`http`] - HTTP utilities for REST API calls
//! - [`subscriptions`] - Subscription listing
//!
//! # Example
//!
//! ```ignore
//! use azbuilt::azure::client::{ArmClient, DEFAULT_ARM_ENDPOINT};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = ArmClient::new(DEFAULT_ARM_ENDPOINT)?;
//!     let resources = client.get_all(&client.resources_url("my-subscription")).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod subscriptions;
