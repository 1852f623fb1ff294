//! Upstream fare search API.
//!
//! Builds the outbound query from the two station names and fetches the
//! raw response bytes. No charset handling happens here; see
//! [`crate::decode`].

mod client;
mod error;
mod mock;
mod query;

pub use client::{FareFetcher, UpstreamClient};
pub use error::FetchError;
pub use mock::StaticFetcher;
pub use query::{FareQuery, MissingStations, encode_station};
