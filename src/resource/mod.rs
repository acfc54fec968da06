//! Resource aggregation layer
//!
//! Turns raw ARM resource records into the per-service sections a report is
//! built from.
//!
//! # Architecture
//!
//! - [`catalog`] - Resource type names/descriptions and per-service headers from embedded JSON
//! - [`normalize`] - Flattens one raw record into fixed report attributes
//! - [`aggregate`] - Groups records into ordered sections and counts them
//! - [`prune`] - Removes columns that are empty across a whole section
//! - [`fetcher`] - Resource/network sources and the multi-subscription merge
//! - [`snapshot`] - Saves and reloads fetched data as JSON
//!
//! # Example
//!
//! ```ignore
//! use azbuilt::resource::{aggregate, headers_for, prune};
//!
//! let (sections, counters) = aggregate(&records, 1);
//! for section in &sections {
//!     let headers = headers_for(section.service_name());
//!     let (headers, rows) = prune(&headers, &section.content);
//! }
//! ```

pub mod aggregate;
pub mod catalog;
pub mod fetcher;
pub mod normalize;
pub mod prune;
pub mod snapshot;

pub use aggregate::{aggregate, aggregate_with, Counters, Section};
pub use catalog::{headers_for, lookup};
pub use fetcher::{collect, Collected, FetchOutcome, NetworkDetailSource, NetworkDetails, ResourceSource};
pub use normalize::{normalize, NormalizedAttributes, ResourceRecord, SENTINEL};
pub use prune::prune;
pub use snapshot::Snapshot;
