use std::sync::Arc;

use crate::coordinator::{ActionConfirmation, ActionCoordinator};
use crate::errors::DrawerError;
use crate::events::{ActionId, ConfirmationPhase, DeviceClass, SessionContext};
use crate::gate::{Feature, FeatureFlags, FeatureGate};
use crate::messages::MessageKey;

/// One action slot and whether it is shown for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub id: ActionId,
    pub visible: bool,
    pub requires_confirmation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub descriptor: ActionDescriptor,
    pub label: MessageKey,
    pub tooltip: Option<MessageKey>,
    /// Participant count shown on the participants button.
    pub badge: Option<usize>,
    /// Recording or streaming is currently running.
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawerSlot {
    Action(ActionButton),
    Spacer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawerView {
    pub slots: Vec<DrawerSlot>,
    /// Phone or tablet without go-live: a centered row with spacers.
    pub centered: bool,
    /// Taller drawer used when the go-live button is present off-tablet.
    pub extended: bool,
}

impl DrawerView {
    pub fn actions(&self) -> Vec<ActionId> {
        self.slots
            .iter()
            .filter_map(|slot| match slot {
                DrawerSlot::Action(button) => Some(button.descriptor.id),
                DrawerSlot::Spacer => None,
            })
            .collect()
    }

    pub fn button(&self, id: ActionId) -> Option<&ActionButton> {
        self.slots.iter().find_map(|slot| match slot {
            DrawerSlot::Action(button) if button.descriptor.id == id => Some(button),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerIntent {
    Click(ActionId),
    Close,
}

/// What the host has to do after dispatching an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Done,
    /// Show a confirmation modal (or, for starting a live stream, the
    /// destination form) bound to this request.
    Confirm(ActionConfirmation),
}

/// Computes the visible action set and routes clicks to the coordinator.
pub struct DrawerPresenter {
    gate: FeatureGate,
    coordinator: Arc<ActionCoordinator>,
}

impl DrawerPresenter {
    pub fn new(flags: FeatureFlags, coordinator: Arc<ActionCoordinator>) -> Self {
        let mut flags = flags;
        if flags.live_streaming_enabled && !coordinator.can_stop_live_stream() {
            tracing::warn!("live streaming enabled without a proxy endpoint, hiding go-live");
            flags.live_streaming_enabled = false;
        }
        Self {
            gate: FeatureGate::new(flags),
            coordinator,
        }
    }

    pub fn coordinator(&self) -> &Arc<ActionCoordinator> {
        &self.coordinator
    }

    pub fn flags(&self) -> FeatureFlags {
        self.gate.flags()
    }

    fn is_visible(&self, id: ActionId, ctx: &SessionContext) -> bool {
        match id {
            ActionId::Invite | ActionId::Settings => true,
            ActionId::Participants => ctx.device_class == DeviceClass::MobileSmall,
            ActionId::Record => self.gate.feature(Feature::Recording),
            ActionId::LiveStream => self.gate.feature(Feature::LiveStreaming),
        }
    }

    pub fn descriptors(&self, ctx: &SessionContext) -> Vec<ActionDescriptor> {
        ActionId::ALL
            .into_iter()
            .map(|id| ActionDescriptor {
                id,
                visible: self.is_visible(id, ctx),
                requires_confirmation: id.requires_confirmation(),
            })
            .collect()
    }

    pub fn visible_actions(&self, ctx: &SessionContext) -> Vec<ActionId> {
        self.descriptors(ctx)
            .into_iter()
            .filter(|d| d.visible)
            .map(|d| d.id)
            .collect()
    }

    pub fn render(&self, ctx: &SessionContext) -> DrawerView {
        let live_streaming = self.gate.feature(Feature::LiveStreaming);
        let centered = !live_streaming
            && matches!(ctx.device_class, DeviceClass::Tablet | DeviceClass::Mobile);

        // Spacers sit after the invite slot and after the record slot,
        // whether or not the record button itself is shown.
        let mut slots = Vec::with_capacity(ActionId::ALL.len() + 2);
        for descriptor in self.descriptors(ctx) {
            if descriptor.visible {
                slots.push(DrawerSlot::Action(button_for(descriptor, ctx)));
            }
            if centered && matches!(descriptor.id, ActionId::Invite | ActionId::Record) {
                slots.push(DrawerSlot::Spacer);
            }
        }

        DrawerView {
            slots,
            centered,
            extended: live_streaming && ctx.device_class != DeviceClass::Tablet,
        }
    }

    /// Route a user intent. Clicks on actions that are not visible for `ctx`
    /// are rejected.
    pub fn dispatch(&self, intent: DrawerIntent, ctx: &SessionContext) -> Result<Dispatch, DrawerError> {
        let id = match intent {
            DrawerIntent::Close => {
                self.coordinator.close_drawer();
                return Ok(Dispatch::Done);
            }
            DrawerIntent::Click(id) => id,
        };
        if !self.is_visible(id, ctx) {
            tracing::warn!(action = ?id, "click on hidden action ignored");
            return Err(DrawerError::FeatureUnavailable(id));
        }
        tracing::debug!(action = ?id, "dispatching click");

        match id {
            ActionId::Invite => self.coordinator.copy_invite_link(ctx).map(|_| Dispatch::Done),
            ActionId::Participants => self.coordinator.open_participants().map(|_| Dispatch::Done),
            ActionId::Settings => self.coordinator.open_settings().map(|_| Dispatch::Done),
            ActionId::Record => self
                .coordinator
                .request_recording(toggle(ctx.recording_active))
                .map(Dispatch::Confirm),
            ActionId::LiveStream => self
                .coordinator
                .request_live_stream(toggle(ctx.live_streaming_active))
                .map(Dispatch::Confirm),
        }
    }
}

fn toggle(active: bool) -> ConfirmationPhase {
    if active {
        ConfirmationPhase::Stop
    } else {
        ConfirmationPhase::Start
    }
}

fn button_for(descriptor: ActionDescriptor, ctx: &SessionContext) -> ActionButton {
    let (label, tooltip, badge, active) = match descriptor.id {
        ActionId::Invite => (MessageKey::InviteLabel, None, None, false),
        ActionId::Participants => (
            MessageKey::ParticipantsLabel,
            None,
            Some(ctx.participant_count),
            false,
        ),
        ActionId::Record => {
            let tooltip = if ctx.recording_active {
                MessageKey::StopRecording
            } else {
                MessageKey::Record
            };
            (MessageKey::RecordingLabel, Some(tooltip), None, ctx.recording_active)
        }
        ActionId::LiveStream => (MessageKey::GoLive, None, None, ctx.live_streaming_active),
        ActionId::Settings => (MessageKey::Settings, None, None, false),
    };
    ActionButton {
        descriptor,
        label,
        tooltip,
        badge,
        active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::tests::harness;
    use crate::coordinator::{ActionOutcome, ActionState};
    use crate::errors::ServiceFailure;
    use crate::events::{DrawerEvent, NotificationKind, PanelKind};
    use std::sync::atomic::Ordering;

    const DEVICES: [DeviceClass; 4] = [
        DeviceClass::Mobile,
        DeviceClass::MobileSmall,
        DeviceClass::Tablet,
        DeviceClass::Desktop,
    ];

    fn flags(recording: bool, live: bool) -> FeatureFlags {
        FeatureFlags {
            recording_enabled: recording,
            live_streaming_enabled: live,
        }
    }

    fn presenter(recording: bool, live: bool) -> (DrawerPresenter, crate::coordinator::tests::Harness) {
        let h = harness();
        let coordinator = Arc::new(ActionCoordinator::new(
            h.coordinator.emitter().clone(),
            crate::coordinator::SessionServices {
                recording: h.recording.clone(),
                streaming: h.streaming.clone(),
                clipboard: h.clipboard.clone(),
                catalog: Arc::new(crate::messages::DefaultCatalog),
                proxy: Some(crate::config::ProxyEndpoint::parse("https://proxy.example.com").unwrap()),
            },
        ));
        (DrawerPresenter::new(flags(recording, live), coordinator), h)
    }

    #[test]
    fn visible_set_matches_flags_and_device_for_all_combinations() {
        for recording in [false, true] {
            for live in [false, true] {
                let (p, _h) = presenter(recording, live);
                for device in DEVICES {
                    let ctx = SessionContext::new(4, device);
                    let visible = p.visible_actions(&ctx);

                    assert!(visible.contains(&ActionId::Invite));
                    assert!(visible.contains(&ActionId::Settings));
                    assert_eq!(
                        visible.contains(&ActionId::Participants),
                        device == DeviceClass::MobileSmall
                    );
                    assert_eq!(visible.contains(&ActionId::Record), recording);
                    assert_eq!(visible.contains(&ActionId::LiveStream), live);
                }
            }
        }
    }

    #[test]
    fn actions_keep_presentation_order() {
        let (p, _h) = presenter(true, true);
        let view = p.render(&SessionContext::new(2, DeviceClass::MobileSmall));
        assert_eq!(view.actions(), ActionId::ALL.to_vec());
        assert!(!view.centered);
        assert!(view.extended);
    }

    #[test]
    fn tablet_with_recording_only_is_centered_row() {
        let (p, _h) = presenter(true, false);
        let view = p.render(&SessionContext::new(5, DeviceClass::Tablet));

        assert_eq!(
            view.actions(),
            vec![ActionId::Invite, ActionId::Record, ActionId::Settings]
        );
        assert!(view.centered);
        assert!(!view.extended);
        assert!(matches!(view.slots[1], DrawerSlot::Spacer));
        assert!(matches!(view.slots[3], DrawerSlot::Spacer));
        assert_eq!(view.slots.len(), 5);
    }

    #[test]
    fn desktop_is_never_centered() {
        let (p, _h) = presenter(true, false);
        let view = p.render(&SessionContext::new(3, DeviceClass::Desktop));
        assert_eq!(
            view.actions(),
            vec![ActionId::Invite, ActionId::Record, ActionId::Settings]
        );
        assert!(!view.centered);
        assert!(!view.slots.contains(&DrawerSlot::Spacer));
    }

    #[test]
    fn phone_without_optional_actions_is_centered() {
        let (p, _h) = presenter(false, false);
        let view = p.render(&SessionContext::new(2, DeviceClass::Mobile));

        assert_eq!(view.actions(), vec![ActionId::Invite, ActionId::Settings]);
        assert!(view.centered);
        assert!(matches!(view.slots[1], DrawerSlot::Spacer));
        assert!(matches!(view.slots[2], DrawerSlot::Spacer));
        assert_eq!(view.slots.len(), 4);
    }

    #[test]
    fn small_phone_is_not_centered() {
        let (p, _h) = presenter(true, false);
        let view = p.render(&SessionContext::new(2, DeviceClass::MobileSmall));
        assert!(!view.centered);
        assert_eq!(view.actions().len(), 4);
    }

    #[test]
    fn live_streaming_disables_centering_and_extends_off_tablet() {
        let (p, _h) = presenter(false, true);
        let phone = p.render(&SessionContext::new(1, DeviceClass::Mobile));
        assert_eq!(phone.actions().len(), 3);
        assert!(!phone.centered);
        assert!(phone.extended);

        let tablet = p.render(&SessionContext::new(1, DeviceClass::Tablet));
        assert!(!tablet.extended);
    }

    #[test]
    fn descriptors_mark_confirmation_requirements() {
        let (p, _h) = presenter(true, true);
        let descriptors = p.descriptors(&SessionContext::new(1, DeviceClass::Desktop));
        for d in descriptors {
            assert_eq!(
                d.requires_confirmation,
                matches!(d.id, ActionId::Record | ActionId::LiveStream)
            );
        }
    }

    #[test]
    fn participants_badge_and_record_tooltip_follow_session() {
        let (p, _h) = presenter(true, false);
        let mut ctx = SessionContext::new(7, DeviceClass::MobileSmall);
        let view = p.render(&ctx);
        assert_eq!(view.button(ActionId::Participants).unwrap().badge, Some(7));
        assert_eq!(
            view.button(ActionId::Record).unwrap().tooltip,
            Some(MessageKey::Record)
        );

        ctx.recording_active = true;
        let view = p.render(&ctx);
        let record = view.button(ActionId::Record).unwrap();
        assert!(record.active);
        assert_eq!(record.tooltip, Some(MessageKey::StopRecording));
    }

    #[test]
    fn live_streaming_hidden_without_proxy() {
        let h = harness();
        let coordinator = Arc::new(ActionCoordinator::new(
            h.coordinator.emitter().clone(),
            crate::coordinator::SessionServices {
                recording: h.recording.clone(),
                streaming: h.streaming.clone(),
                clipboard: h.clipboard.clone(),
                catalog: Arc::new(crate::messages::DefaultCatalog),
                proxy: None,
            },
        ));
        let p = DrawerPresenter::new(flags(false, true), coordinator);
        let ctx = SessionContext::new(1, DeviceClass::Mobile);
        assert!(!p.visible_actions(&ctx).contains(&ActionId::LiveStream));
    }

    #[test]
    fn hidden_action_click_is_rejected() {
        let (p, h) = presenter(false, false);
        let ctx = SessionContext::new(1, DeviceClass::Tablet);
        assert_eq!(
            p.dispatch(DrawerIntent::Click(ActionId::Record), &ctx),
            Err(DrawerError::FeatureUnavailable(ActionId::Record))
        );
        assert_eq!(
            p.dispatch(DrawerIntent::Click(ActionId::Participants), &ctx),
            Err(DrawerError::FeatureUnavailable(ActionId::Participants))
        );
        assert!(h.events.take().is_empty());
    }

    #[test]
    fn settings_click_opens_panel() {
        let (p, h) = presenter(false, false);
        let ctx = SessionContext::new(1, DeviceClass::Mobile);
        assert_eq!(
            p.dispatch(DrawerIntent::Click(ActionId::Settings), &ctx),
            Ok(Dispatch::Done)
        );
        assert_eq!(
            h.events.take(),
            vec![
                DrawerEvent::PanelOpened(PanelKind::Settings),
                DrawerEvent::DrawerClosed
            ]
        );
    }

    #[test]
    fn record_click_then_cancel_leaves_drawer_open() {
        let (p, h) = presenter(true, false);
        let ctx = SessionContext::new(1, DeviceClass::Tablet);

        let Dispatch::Confirm(req) = p.dispatch(DrawerIntent::Click(ActionId::Record), &ctx).unwrap() else {
            panic!("record should ask for confirmation");
        };
        assert_eq!(p.coordinator().state(ActionId::Record), ActionState::Confirming);

        p.coordinator().cancel(&req);

        assert_eq!(p.coordinator().state(ActionId::Record), ActionState::Idle);
        assert_eq!(h.recording.starts.load(Ordering::SeqCst), 0);
        assert_eq!(h.events.closed_count(), 0);
    }

    #[tokio::test]
    async fn record_click_accept_generic_failure() {
        let (p, h) = presenter(true, false);
        *h.recording.start_result.lock().unwrap() = Some(Err(ServiceFailure::Other("disk full".into())));
        let ctx = SessionContext::new(1, DeviceClass::Tablet);

        let Dispatch::Confirm(req) = p.dispatch(DrawerIntent::Click(ActionId::Record), &ctx).unwrap() else {
            panic!("record should ask for confirmation");
        };
        let outcome = p.coordinator().accept(&req).await.unwrap();

        assert!(matches!(outcome, ActionOutcome::Failed(_)));
        let notes = h.events.notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Error);
        assert_eq!(notes[0].key, Some(MessageKey::RecordingError));
        assert_eq!(h.events.closed_count(), 0);
        assert_eq!(p.coordinator().state(ActionId::Record), ActionState::Idle);
    }

    #[test]
    fn active_recording_click_requests_stop() {
        let (p, _h) = presenter(true, false);
        let mut ctx = SessionContext::new(1, DeviceClass::Tablet);
        ctx.recording_active = true;

        let Dispatch::Confirm(req) = p.dispatch(DrawerIntent::Click(ActionId::Record), &ctx).unwrap() else {
            panic!("record should ask for confirmation");
        };
        assert_eq!(*req.payload(), ConfirmationPhase::Stop);
    }

    #[test]
    fn close_intent_dismisses_pending_confirmation() {
        let (p, h) = presenter(true, false);
        let ctx = SessionContext::new(1, DeviceClass::Tablet);
        p.dispatch(DrawerIntent::Click(ActionId::Record), &ctx).unwrap();

        assert_eq!(p.dispatch(DrawerIntent::Close, &ctx), Ok(Dispatch::Done));
        assert_eq!(p.coordinator().state(ActionId::Record), ActionState::Idle);
        assert_eq!(h.events.closed_count(), 1);
    }
}
