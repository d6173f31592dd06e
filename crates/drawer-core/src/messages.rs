//! Message ids for labels, tooltips and notifications.
//!
//! The core only deals in keys; turning a key into user-facing text is the
//! job of a [`MessageCatalog`] supplied by the host.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    InviteLabel,
    ParticipantsLabel,
    RecordingLabel,
    GoLive,
    Settings,
    Record,
    StopRecording,
    RecordingStopped,
    RecordingAlreadyInProgress,
    RecordingError,
    LiveStreamingError,
    LiveStreamingEnded,
}

impl MessageKey {
    /// Stable id used by translation files.
    pub fn id(self) -> &'static str {
        match self {
            Self::InviteLabel => "inviteLabel",
            Self::ParticipantsLabel => "participantsLabel",
            Self::RecordingLabel => "recordingLabel",
            Self::GoLive => "goLive",
            Self::Settings => "settings",
            Self::Record => "record",
            Self::StopRecording => "stopRecording",
            Self::RecordingStopped => "recordingStopped",
            Self::RecordingAlreadyInProgress => "recordingAlreadyInProgress",
            Self::RecordingError => "recordingError",
            Self::LiveStreamingError => "liveStreamingError",
            Self::LiveStreamingEnded => "liveStreamingEnded",
        }
    }
}

pub trait MessageCatalog: Send + Sync {
    fn format(&self, key: MessageKey) -> String;
}

/// English strings, used when the host does not provide translations.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCatalog;

impl MessageCatalog for DefaultCatalog {
    fn format(&self, key: MessageKey) -> String {
        let text = match key {
            MessageKey::InviteLabel => "Invite",
            MessageKey::ParticipantsLabel => "Participants",
            MessageKey::RecordingLabel => "Record",
            MessageKey::GoLive => "Go live",
            MessageKey::Settings => "Settings",
            MessageKey::Record => "Record",
            MessageKey::StopRecording => "Stop recording",
            MessageKey::RecordingStopped => "Recording stopped",
            MessageKey::RecordingAlreadyInProgress => "Recording is already in progress",
            MessageKey::RecordingError => "Recording error, please try again",
            MessageKey::LiveStreamingError => "Live streaming error, please try again",
            MessageKey::LiveStreamingEnded => "Live streaming ended",
        };
        text.to_string()
    }
}
