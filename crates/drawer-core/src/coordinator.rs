use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::ProxyEndpoint;
use crate::confirmation::{ConfirmationFlow, ConfirmationRequest};
use crate::errors::{DrawerError, ServiceFailure};
use crate::events::{
    ActionId, ConfirmationPhase, DrawerEvent, EventEmitter, Notification, NotificationKind,
    PanelKind, SessionContext,
};
use crate::messages::{MessageCatalog, MessageKey};
use crate::services::{Clipboard, LiveStreamingService, RecordingService, StreamParams};

/// Confirmation request as handed to the host for record and live-stream.
pub type ActionConfirmation = ConfirmationRequest<ConfirmationPhase>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Idle,
    Confirming,
    Executing,
}

/// Result of an accepted action. Service failures have already been turned
/// into an error notification by the time this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    Failed(ServiceFailure),
}

/// External collaborators the coordinator drives.
#[derive(Clone)]
pub struct SessionServices {
    pub recording: Arc<dyn RecordingService>,
    pub streaming: Arc<dyn LiveStreamingService>,
    pub clipboard: Arc<dyn Clipboard>,
    pub catalog: Arc<dyn MessageCatalog>,
    /// Required to stop a live stream; without it live-streaming is unavailable.
    pub proxy: Option<ProxyEndpoint>,
}

/// Owns the lifecycle of every drawer action.
///
/// Each action moves `Idle -> (Confirming) -> Executing -> Idle`. Service
/// failures stop here: they are reported as notifications and the drawer stays
/// open. Callers are expected not to fire the same action twice while it is
/// executing; a second request in that window is rejected with
/// [`DrawerError::ActionBusy`].
pub struct ActionCoordinator {
    emitter: EventEmitter,
    services: SessionServices,
    record_flow: ConfirmationFlow<ConfirmationPhase>,
    live_flow: ConfirmationFlow<ConfirmationPhase>,
    executing: Mutex<HashSet<ActionId>>,
}

/// Service call selected by an accepted confirmation.
enum Execution<'a> {
    StartRecording,
    StopRecording,
    StopLiveStream(&'a ProxyEndpoint),
}

/// Marks an action as executing until dropped.
struct ExecutionGuard<'a> {
    executing: &'a Mutex<HashSet<ActionId>>,
    action: ActionId,
}

impl Drop for ExecutionGuard<'_> {
    fn drop(&mut self) {
        self.executing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.action);
    }
}

impl ActionCoordinator {
    pub fn new(emitter: EventEmitter, services: SessionServices) -> Self {
        Self {
            emitter,
            services,
            record_flow: ConfirmationFlow::new(ActionId::Record),
            live_flow: ConfirmationFlow::new(ActionId::LiveStream),
            executing: Mutex::new(HashSet::new()),
        }
    }

    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    pub fn can_stop_live_stream(&self) -> bool {
        self.services.proxy.is_some()
    }

    fn is_executing(&self, action: ActionId) -> bool {
        self.executing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&action)
    }

    fn begin(&self, action: ActionId) -> Result<ExecutionGuard<'_>, DrawerError> {
        let mut executing = self.executing.lock().unwrap_or_else(PoisonError::into_inner);
        if !executing.insert(action) {
            return Err(DrawerError::ActionBusy(action));
        }
        Ok(ExecutionGuard {
            executing: &self.executing,
            action,
        })
    }

    fn flow(&self, action: ActionId) -> Option<&ConfirmationFlow<ConfirmationPhase>> {
        match action {
            ActionId::Record => Some(&self.record_flow),
            ActionId::LiveStream => Some(&self.live_flow),
            _ => None,
        }
    }

    pub fn state(&self, action: ActionId) -> ActionState {
        if self.is_executing(action) {
            ActionState::Executing
        } else if self.flow(action).is_some_and(|f| f.is_pending()) {
            ActionState::Confirming
        } else {
            ActionState::Idle
        }
    }

    pub fn pending_confirmation(&self, action: ActionId) -> Option<ActionConfirmation> {
        self.flow(action).and_then(|f| f.pending())
    }

    // ── Immediate actions ────────────────────────────────────────────

    pub fn copy_invite_link(&self, ctx: &SessionContext) -> Result<(), DrawerError> {
        let _guard = self.begin(ActionId::Invite)?;
        self.services.clipboard.copy_text(&ctx.conference_url);
        tracing::info!("invite link copied");
        self.emitter.emit(DrawerEvent::InviteLinkCopied {
            url: ctx.conference_url.clone(),
        });
        Ok(())
    }

    pub fn open_participants(&self) -> Result<(), DrawerError> {
        self.open_panel(ActionId::Participants, PanelKind::Participants)
    }

    pub fn open_settings(&self) -> Result<(), DrawerError> {
        self.open_panel(ActionId::Settings, PanelKind::Settings)
    }

    fn open_panel(&self, action: ActionId, panel: PanelKind) -> Result<(), DrawerError> {
        let _guard = self.begin(action)?;
        tracing::info!(?panel, "opening panel");
        self.emitter.emit(DrawerEvent::PanelOpened(panel));
        self.close_drawer();
        Ok(())
    }

    // ── Confirmed actions ────────────────────────────────────────────

    pub fn request_recording(&self, phase: ConfirmationPhase) -> Result<ActionConfirmation, DrawerError> {
        self.request(ActionId::Record, phase)
    }

    /// Starting opens the destination form; stopping opens a plain confirmation.
    pub fn request_live_stream(&self, phase: ConfirmationPhase) -> Result<ActionConfirmation, DrawerError> {
        if phase == ConfirmationPhase::Stop && !self.can_stop_live_stream() {
            return Err(DrawerError::FeatureUnavailable(ActionId::LiveStream));
        }
        self.request(ActionId::LiveStream, phase)
    }

    fn request(&self, action: ActionId, phase: ConfirmationPhase) -> Result<ActionConfirmation, DrawerError> {
        if self.is_executing(action) {
            return Err(DrawerError::ActionBusy(action));
        }
        let flow = self
            .flow(action)
            .ok_or(DrawerError::FeatureUnavailable(action))?;
        let request = flow.request(phase)?;
        tracing::info!(?action, ?phase, "awaiting confirmation");
        self.emitter.emit(DrawerEvent::ConfirmationRequested {
            action,
            phase,
            request_id: request.id(),
        });
        Ok(request)
    }

    /// Cancel a pending confirmation. Repeated calls are no-ops.
    pub fn cancel(&self, request: &ActionConfirmation) -> bool {
        let Some(flow) = self.flow(request.action()) else {
            return false;
        };
        let cancelled = flow.cancel(request);
        if cancelled {
            self.emit_resolved(request, false);
        }
        cancelled
    }

    /// Cancel every pending confirmation, e.g. when the drawer goes away.
    pub fn dismiss_pending(&self) {
        for flow in [&self.record_flow, &self.live_flow] {
            if let Some(request) = flow.dismiss() {
                self.emit_resolved(&request, false);
            }
        }
    }

    fn emit_resolved(&self, request: &ActionConfirmation, accepted: bool) {
        self.emitter.emit(DrawerEvent::ConfirmationResolved {
            action: request.action(),
            request_id: request.id(),
            accepted,
        });
    }

    /// Accept a pending confirmation and run the action to completion.
    ///
    /// Starting a live stream needs a destination; use
    /// [`submit_live_stream`](Self::submit_live_stream) for that.
    pub async fn accept(&self, request: &ActionConfirmation) -> Result<ActionOutcome, DrawerError> {
        let action = request.action();
        let execution = match (action, *request.payload()) {
            (ActionId::Record, ConfirmationPhase::Start) => Execution::StartRecording,
            (ActionId::Record, ConfirmationPhase::Stop) => Execution::StopRecording,
            (ActionId::LiveStream, ConfirmationPhase::Stop) => {
                let proxy = self
                    .services
                    .proxy
                    .as_ref()
                    .ok_or(DrawerError::FeatureUnavailable(action))?;
                Execution::StopLiveStream(proxy)
            }
            (ActionId::LiveStream, ConfirmationPhase::Start) => {
                return Err(DrawerError::InvalidStreamParams(
                    "a stream destination is required".into(),
                ));
            }
            _ => return Err(DrawerError::FeatureUnavailable(action)),
        };
        let flow = self
            .flow(action)
            .ok_or(DrawerError::FeatureUnavailable(action))?;
        flow.accept(request)?;
        let _guard = self.begin(action)?;
        self.emit_resolved(request, true);

        let outcome = match execution {
            Execution::StartRecording => self.start_recording().await,
            Execution::StopRecording => self.stop_recording().await,
            Execution::StopLiveStream(proxy) => self.stop_live_stream(proxy).await,
        };
        Ok(outcome)
    }

    /// Submit the live-stream destination form. Submission is the accept.
    /// Invalid parameters leave the form pending.
    pub async fn submit_live_stream(
        &self,
        request: &ActionConfirmation,
        params: StreamParams,
    ) -> Result<ActionOutcome, DrawerError> {
        if request.action() != ActionId::LiveStream
            || *request.payload() != ConfirmationPhase::Start
            || !self.live_flow.is_current(request)
        {
            return Err(DrawerError::StaleConfirmation(request.action()));
        }
        params.validate()?;
        self.live_flow.accept(request)?;
        let _guard = self.begin(ActionId::LiveStream)?;
        self.emit_resolved(request, true);

        tracing::info!(url = %params.stream_url, "starting live stream");
        match self.services.streaming.start_live_stream(&params).await {
            Ok(()) => {
                tracing::info!("live stream started");
                self.close_drawer();
                Ok(ActionOutcome::Completed)
            }
            Err(failure) => {
                tracing::error!("live stream start failed: {failure}");
                self.notify(NotificationKind::Error, MessageKey::LiveStreamingError);
                Ok(ActionOutcome::Failed(failure))
            }
        }
    }

    async fn start_recording(&self) -> ActionOutcome {
        tracing::info!("starting recording");
        match self.services.recording.start_recording().await {
            Ok(message) => {
                tracing::info!("recording started");
                self.close_drawer();
                if let Some(message) = message.filter(|m| !m.is_empty()) {
                    self.emitter.emit(DrawerEvent::Notification(Notification {
                        kind: NotificationKind::Success,
                        key: None,
                        message,
                    }));
                }
                ActionOutcome::Completed
            }
            Err(failure) => self.recording_failed(failure),
        }
    }

    async fn stop_recording(&self) -> ActionOutcome {
        tracing::info!("stopping recording");
        match self.services.recording.stop_recording().await {
            Ok(_) => {
                tracing::info!("recording stopped");
                self.close_drawer();
                self.notify(NotificationKind::Success, MessageKey::RecordingStopped);
                ActionOutcome::Completed
            }
            Err(failure) => self.recording_failed(failure),
        }
    }

    fn recording_failed(&self, failure: ServiceFailure) -> ActionOutcome {
        tracing::error!("recording failed: {failure}");
        let key = match failure {
            ServiceFailure::AlreadyInProgress => MessageKey::RecordingAlreadyInProgress,
            ServiceFailure::Other(_) => MessageKey::RecordingError,
        };
        self.notify(NotificationKind::Error, key);
        ActionOutcome::Failed(failure)
    }

    // The stop result is not inspected: completion of the call counts as
    // the stream having ended.
    async fn stop_live_stream(&self, proxy: &ProxyEndpoint) -> ActionOutcome {
        tracing::info!(proxy = proxy.as_str(), "stopping live stream");
        if let Err(e) = self.services.streaming.stop_live_stream(proxy).await {
            tracing::warn!("live stream stop reported: {e}");
        }
        self.close_drawer();
        self.notify(NotificationKind::Success, MessageKey::LiveStreamingEnded);
        ActionOutcome::Completed
    }

    // ── Host side effects ────────────────────────────────────────────

    /// Close the drawer, dropping any confirmation still on screen.
    pub fn close_drawer(&self) {
        self.dismiss_pending();
        tracing::debug!("closing drawer");
        self.emitter.emit(DrawerEvent::DrawerClosed);
    }

    fn notify(&self, kind: NotificationKind, key: MessageKey) {
        let message = self.services.catalog.format(key);
        self.emitter.emit(DrawerEvent::Notification(Notification {
            kind,
            key: Some(key),
            message,
        }));
    }
}
