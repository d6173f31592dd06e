//! Capabilities the drawer consumes from the surrounding session layer.

use async_trait::async_trait;
use url::Url;

use crate::config::ProxyEndpoint;
use crate::errors::{DrawerError, ServiceFailure};

#[async_trait]
pub trait RecordingService: Send + Sync {
    /// Start recording. May return a message to show on success.
    async fn start_recording(&self) -> Result<Option<String>, ServiceFailure>;
    async fn stop_recording(&self) -> Result<String, ServiceFailure>;
}

#[async_trait]
pub trait LiveStreamingService: Send + Sync {
    async fn start_live_stream(&self, params: &StreamParams) -> Result<(), ServiceFailure>;
    /// Stop the stream through the proxy. Callers treat completion as success.
    async fn stop_live_stream(&self, proxy: &ProxyEndpoint) -> Result<(), ServiceFailure>;
}

/// Copies text to the system clipboard. Failures are the implementor's concern.
pub trait Clipboard: Send + Sync {
    fn copy_text(&self, text: &str);
}

/// Destination collected by the live-stream data-entry form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamParams {
    pub stream_url: String,
    pub stream_key: String,
}

impl StreamParams {
    pub fn new(stream_url: impl Into<String>, stream_key: impl Into<String>) -> Self {
        Self {
            stream_url: stream_url.into(),
            stream_key: stream_key.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DrawerError> {
        let url = Url::parse(self.stream_url.trim())
            .map_err(|e| DrawerError::InvalidStreamParams(format!("stream url: {e}")))?;
        if !matches!(url.scheme(), "rtmp" | "rtmps") {
            return Err(DrawerError::InvalidStreamParams(format!(
                "stream url must be rtmp or rtmps, got '{}'",
                url.scheme()
            )));
        }
        if self.stream_key.trim().is_empty() {
            return Err(DrawerError::InvalidStreamParams("stream key is empty".into()));
        }
        Ok(())
    }
}
