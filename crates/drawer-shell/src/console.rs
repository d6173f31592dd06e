//! Console stand-ins for the session services, and an event printer.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use drawer_core::errors::RECORDING_ALREADY_IN_PROGRESS;
use drawer_core::{
    Clipboard, DrawerEvent, DrawerEventListener, LiveStreamingService, NotificationKind,
    ProxyEndpoint, RecordingService, ServiceFailure, StreamParams,
};

/// Simulated backend latency.
const SERVICE_DELAY: Duration = Duration::from_millis(300);

#[derive(Default)]
pub struct ConsoleRecording {
    active: Mutex<bool>,
}

impl ConsoleRecording {
    pub fn is_active(&self) -> bool {
        self.active.lock().map(|a| *a).unwrap_or(false)
    }

    fn set_active(&self, value: bool) {
        if let Ok(mut active) = self.active.lock() {
            *active = value;
        }
    }
}

#[async_trait]
impl RecordingService for ConsoleRecording {
    async fn start_recording(&self) -> Result<Option<String>, ServiceFailure> {
        tokio::time::sleep(SERVICE_DELAY).await;
        if self.is_active() {
            return Err(ServiceFailure::from_reason(RECORDING_ALREADY_IN_PROGRESS));
        }
        self.set_active(true);
        Ok(None)
    }

    async fn stop_recording(&self) -> Result<String, ServiceFailure> {
        tokio::time::sleep(SERVICE_DELAY).await;
        if !self.is_active() {
            return Err(ServiceFailure::from_reason("no active recording"));
        }
        self.set_active(false);
        Ok("recording stopped".into())
    }
}

#[derive(Default)]
pub struct ConsoleStreaming {
    destination: Mutex<Option<StreamParams>>,
}

impl ConsoleStreaming {
    pub fn is_active(&self) -> bool {
        self.destination.lock().map(|d| d.is_some()).unwrap_or(false)
    }
}

#[async_trait]
impl LiveStreamingService for ConsoleStreaming {
    async fn start_live_stream(&self, params: &StreamParams) -> Result<(), ServiceFailure> {
        tokio::time::sleep(SERVICE_DELAY).await;
        let mut destination = self
            .destination
            .lock()
            .map_err(|_| ServiceFailure::Other("streaming state poisoned".into()))?;
        if destination.is_some() {
            return Err(ServiceFailure::Other("already streaming".into()));
        }
        *destination = Some(params.clone());
        Ok(())
    }

    async fn stop_live_stream(&self, proxy: &ProxyEndpoint) -> Result<(), ServiceFailure> {
        tracing::debug!(proxy = proxy.as_str(), "stop via proxy");
        tokio::time::sleep(SERVICE_DELAY).await;
        if let Ok(mut destination) = self.destination.lock() {
            destination.take();
        }
        Ok(())
    }
}

pub struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn copy_text(&self, text: &str) {
        println!("[clipboard] {text}");
    }
}

/// Prints every drawer event on stdout.
pub struct EventPrinter;

impl DrawerEventListener for EventPrinter {
    fn on_event(&self, event: DrawerEvent) {
        match event {
            DrawerEvent::ConfirmationRequested { action, phase, .. } => {
                println!("[modal] confirm {phase:?} {action:?}? (accept/cancel)");
            }
            DrawerEvent::ConfirmationResolved { action, accepted, .. } => {
                let verb = if accepted { "accepted" } else { "dismissed" };
                println!("[modal] {action:?} {verb}");
            }
            DrawerEvent::InviteLinkCopied { url } => println!("[invite] link copied: {url}"),
            DrawerEvent::PanelOpened(panel) => println!("[panel] {panel:?} opened"),
            DrawerEvent::Notification(n) => {
                let tag = match n.kind {
                    NotificationKind::Success => "ok",
                    NotificationKind::Error => "error",
                };
                println!("[{tag}] {}", n.message);
            }
            DrawerEvent::DrawerClosed => println!("[drawer] closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_start_reports_already_in_progress() {
        let recording = ConsoleRecording::default();
        recording.start_recording().await.unwrap();
        assert_eq!(
            recording.start_recording().await,
            Err(ServiceFailure::AlreadyInProgress)
        );
        recording.stop_recording().await.unwrap();
        assert!(!recording.is_active());
    }

    #[tokio::test]
    async fn stream_stop_clears_destination() {
        let streaming = ConsoleStreaming::default();
        let params = StreamParams::new("rtmp://live.example.com/app", "k");
        streaming.start_live_stream(&params).await.unwrap();
        assert!(streaming.is_active());

        let proxy = ProxyEndpoint::parse("https://proxy.example.com").unwrap();
        streaming.stop_live_stream(&proxy).await.unwrap();
        assert!(!streaming.is_active());
    }
}
