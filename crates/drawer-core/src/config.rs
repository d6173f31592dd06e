use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::DrawerError;
use crate::gate::{FeatureFlags, FeatureGate, FlagSource};

/// Environment variable holding the live-streaming proxy URL.
pub const PROXY_URL_VAR: &str = "VITE_PROXY_URL";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawerConfig {
    #[serde(default)]
    pub flags: FeatureFlags,
    #[serde(default)]
    pub proxy_url: Option<String>,
}

impl DrawerConfig {
    pub fn from_env() -> Self {
        Self::from_source(&crate::gate::EnvFlagSource)
    }

    pub fn from_source(source: &dyn FlagSource) -> Self {
        Self {
            flags: FeatureGate::resolve(source).flags(),
            proxy_url: source.get_flag(PROXY_URL_VAR).filter(|s| !s.trim().is_empty()),
        }
    }

    /// Load from a JSON file. A missing or unreadable file yields the
    /// defaults, which have every optional feature off.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed drawer config {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn proxy_endpoint(&self) -> Result<ProxyEndpoint, DrawerError> {
        let raw = self
            .proxy_url
            .as_deref()
            .ok_or_else(|| DrawerError::Config(format!("{PROXY_URL_VAR} is not set")))?;
        ProxyEndpoint::parse(raw)
    }
}

/// Opaque indirection endpoint used to stop a live stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint(Url);

impl ProxyEndpoint {
    pub fn parse(raw: &str) -> Result<Self, DrawerError> {
        let url = Url::parse(raw.trim())
            .map_err(|e| DrawerError::Config(format!("invalid proxy url '{raw}': {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(Self(url)),
            other => Err(DrawerError::Config(format!(
                "proxy url must be http(s), got '{other}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
