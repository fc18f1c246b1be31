//! Typed wrappers over the fff read endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::ApiClient;
use crate::error::ApiError;

/// Row-major JSON records as returned by the stats endpoints.
pub type TableData = Vec<Map<String, Value>>;

/// A single week or an inclusive week range, written `3` or `3-5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weeks {
    Week(u16),
    Range(u16, u16),
}

impl FromStr for Weeks {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<u16> = s.split('-').map(str::parse).collect::<Result<_, _>>()?;
        match &*parts {
            [single] => Ok(Weeks::Week(*single)),
            [start, end] if start <= end => Ok(Weeks::Range(*start, *end)),
            // Reversed range: "5-3" never parses as a bare u16, so this
            // always yields the error.
            _ => Err(s.parse::<u16>().unwrap_err()),
        }
    }
}

impl fmt::Display for Weeks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weeks::Week(week) => write!(f, "{week}"),
            Weeks::Range(start, end) => write!(f, "{start}-{end}"),
        }
    }
}

impl Serialize for Weeks {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Weeks {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Query parameters for `/v1/stats`. Unset fields are omitted from the
/// request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weeks: Option<Weeks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

impl ApiClient {
    /// Fetch play-by-play stats filtered by the given parameters.
    pub async fn get_stats(&self, params: &StatsParams) -> Result<TableData, ApiError> {
        self.get_json("/v1/stats", params).await
    }

    /// Search rosters by player name.
    pub async fn search_players(&self, search: &str) -> Result<TableData, ApiError> {
        self.get_json("/v1/players", &[("search", search)]).await
    }
}
