//! Fare lookup proxy.
//!
//! Forwards `GET /fare?station=..&to=..` to an upstream fare search API,
//! decodes its legacy-encoded response and re-serves it as UTF-8 JSON.

pub mod config;
pub mod decode;
pub mod upstream;
pub mod web;
