use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Optional drawer features controlled by process-wide flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Recording,
    LiveStreaming,
}

impl Feature {
    pub const ALL: [Feature; 2] = [Feature::Recording, Feature::LiveStreaming];

    /// Name of the flag in the process environment.
    pub fn flag_name(self) -> &'static str {
        match self {
            Feature::Recording => "VITE_CONFERENCE_RECORDING",
            Feature::LiveStreaming => "VITE_RTMP_STREAMING",
        }
    }

    pub fn from_flag_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.flag_name() == name)
    }
}

/// Immutable feature flags, resolved once at drawer construction.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    #[serde(default)]
    pub live_streaming_enabled: bool,
    #[serde(default)]
    pub recording_enabled: bool,
}

impl FeatureFlags {
    pub fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::Recording => self.recording_enabled,
            Feature::LiveStreaming => self.live_streaming_enabled,
        }
    }
}

/// Raw key/value source of flags, usually the process environment.
pub trait FlagSource {
    fn get_flag(&self, name: &str) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EnvFlagSource;

impl FlagSource for EnvFlagSource {
    fn get_flag(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl FlagSource for HashMap<String, String> {
    fn get_flag(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// A flag is on only when its raw value is exactly `"true"`.
fn parse_flag(raw: Option<&str>) -> bool {
    raw == Some("true")
}

/// Resolves availability of optional actions. Missing or malformed flags
/// resolve to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureGate {
    flags: FeatureFlags,
}

impl FeatureGate {
    pub fn new(flags: FeatureFlags) -> Self {
        Self { flags }
    }

    /// Read every known flag from `source` once.
    pub fn resolve(source: &dyn FlagSource) -> Self {
        let read = |feature: Feature| {
            let raw = source.get_flag(feature.flag_name());
            let enabled = parse_flag(raw.as_deref());
            if raw.is_some() && !enabled && raw.as_deref() != Some("false") {
                tracing::warn!(flag = feature.flag_name(), ?raw, "unrecognized flag value, treating as disabled");
            }
            enabled
        };
        let flags = FeatureFlags {
            recording_enabled: read(Feature::Recording),
            live_streaming_enabled: read(Feature::LiveStreaming),
        };
        tracing::debug!(?flags, "feature flags resolved");
        Self { flags }
    }

    /// Look up a flag by name. Unknown names are disabled.
    pub fn is_enabled(&self, flag_name: &str) -> bool {
        Feature::from_flag_name(flag_name).is_some_and(|f| self.flags.get(f))
    }

    pub fn feature(&self, feature: Feature) -> bool {
        self.flags.get(feature)
    }

    pub fn flags(&self) -> FeatureFlags {
        self.flags
    }
}
