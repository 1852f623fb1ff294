//! Fare query and upstream URL construction.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::config::ProxyConfig;

/// Characters left as-is in a station name: RFC 3986 unreserved plus `/`.
const STATION: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// One or both station parameters were absent or empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing query parameter(s): {}", .missing.join(", "))]
pub struct MissingStations {
    /// Names of the missing parameters
    pub missing: Vec<&'static str>,
}

/// Origin and destination of a single fare lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareQuery {
    pub start_station: String,
    pub end_station: String,
}

impl FareQuery {
    /// Build a query from the `station` and `to` request parameters.
    pub fn new(station: Option<String>, to: Option<String>) -> Result<Self, MissingStations> {
        let station = station.filter(|s| !s.is_empty());
        let to = to.filter(|s| !s.is_empty());

        match (station, to) {
            (Some(start_station), Some(end_station)) => Ok(Self {
                start_station,
                end_station,
            }),
            (station, to) => {
                let mut missing = Vec::new();
                if station.is_none() {
                    missing.push("station");
                }
                if to.is_none() {
                    missing.push("to");
                }
                Err(MissingStations { missing })
            }
        }
    }

    /// `viaList` value: both names percent-encoded, joined by `:`.
    pub fn via_list(&self) -> String {
        format!(
            "{}:{}",
            encode_station(&self.start_station),
            encode_station(&self.end_station)
        )
    }

    /// Full upstream search URL for this query.
    pub fn upstream_url(&self, config: &ProxyConfig) -> String {
        format!(
            "{}?viaList={}&date={}&teikiKind={}&mode={}",
            config.base_url,
            self.via_list(),
            config.date_param(),
            config.teiki_kind,
            config.mode
        )
    }
}

/// Percent-encode the UTF-8 bytes of a station name.
pub fn encode_station(name: &str) -> String {
    utf8_percent_encode(name, STATION).to_string()
}
