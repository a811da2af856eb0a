//! LIFX cloud API access.
//!
//! client -> LifxClient (reqwest) + LifxApi trait + ApiError / RawResponse
//! model  -> lenient views of lights, scenes and action results (rendering only)
//!
//! Config is resolved once per process (see `crate::config`) and never changes.

pub mod client;
pub mod model;

pub use client::{LifxApi, LifxClient, RawResponse};

/// Default LIFX HTTP API root.
pub const DEFAULT_BASE_URL: &str = "https://api.lifx.com/v1";

/// Connection settings supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// API root, e.g. `https://api.lifx.com/v1` (trailing `/` is ignored)
    pub base_url: String,
    /// Personal access token, sent as `Authorization: Bearer <token>`
    pub api_token: String,
    /// Skip TLS certificate verification
    pub insecure: bool,
    /// Honor system / environment proxy settings
    pub proxy: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: String::new(),
            insecure: false,
            proxy: false,
        }
    }
}

impl Config {
    /// Whether certificates are verified (inverse of `insecure`).
    pub fn verify_tls(&self) -> bool {
        !self.insecure
    }
}
