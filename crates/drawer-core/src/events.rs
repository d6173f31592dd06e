use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::messages::MessageKey;

/// Actions offered by the in-call drawer, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionId {
    Invite,
    Participants,
    Record,
    LiveStream,
    Settings,
}

impl ActionId {
    pub const ALL: [ActionId; 5] = [
        ActionId::Invite,
        ActionId::Participants,
        ActionId::Record,
        ActionId::LiveStream,
        ActionId::Settings,
    ];

    /// Record and LiveStream go through a confirmation step; the rest never do.
    pub fn requires_confirmation(self) -> bool {
        matches!(self, ActionId::Record | ActionId::LiveStream)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    Mobile,
    MobileSmall,
    Tablet,
    Desktop,
}

/// Session state the drawer reads on every render. Owned by the session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub participant_count: usize,
    pub device_class: DeviceClass,
    /// URL of the current conference, copied by the invite action.
    pub conference_url: String,
    pub recording_active: bool,
    pub live_streaming_active: bool,
}

impl SessionContext {
    pub fn new(participant_count: usize, device_class: DeviceClass) -> Self {
        Self {
            participant_count,
            device_class,
            conference_url: String::new(),
            recording_active: false,
            live_streaming_active: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Participants,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    /// `None` when the text came straight from a session service.
    pub key: Option<MessageKey>,
    pub message: String,
}

/// Which side of a toggle a confirmation guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationPhase {
    Start,
    Stop,
}

/// Events emitted by the drawer core to the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawerEvent {
    ConfirmationRequested {
        action: ActionId,
        phase: ConfirmationPhase,
        request_id: String,
    },
    /// The modal closes, whether the user accepted or cancelled.
    ConfirmationResolved {
        action: ActionId,
        request_id: String,
        accepted: bool,
    },
    InviteLinkCopied { url: String },
    PanelOpened(PanelKind),
    Notification(Notification),
    DrawerClosed,
}

/// Trait for receiving events from the core.
pub trait DrawerEventListener: Send + Sync {
    fn on_event(&self, event: DrawerEvent);
}

/// Dispatches events to every registered listener.
#[derive(Clone, Default)]
pub struct EventEmitter {
    listeners: Arc<RwLock<Vec<Arc<dyn DrawerEventListener>>>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: Arc<dyn DrawerEventListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn emit(&self, event: DrawerEvent) {
        tracing::trace!(?event, "emit");
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        for listener in listeners.iter() {
            listener.on_event(event.clone());
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingListener {
        count: Arc<AtomicUsize>,
    }

    impl DrawerEventListener for CountingListener {
        fn on_event(&self, _event: DrawerEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Records every event it receives, for assertions in other modules' tests.
    #[derive(Default)]
    pub(crate) struct EventCapture {
        pub events: Mutex<Vec<DrawerEvent>>,
    }

    impl EventCapture {
        pub fn take(&self) -> Vec<DrawerEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }

        pub fn notifications(&self) -> Vec<Notification> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter_map(|e| match e {
                    DrawerEvent::Notification(n) => Some(n.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn closed_count(&self) -> usize {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| matches!(e, DrawerEvent::DrawerClosed))
                .count()
        }
    }

    impl DrawerEventListener for EventCapture {
        fn on_event(&self, event: DrawerEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn emitter_dispatches_to_multiple_listeners() {
        let emitter = EventEmitter::new();
        let count1 = Arc::new(AtomicUsize::new(0));
        let count2 = Arc::new(AtomicUsize::new(0));

        emitter.add_listener(Arc::new(CountingListener { count: count1.clone() }));
        emitter.add_listener(Arc::new(CountingListener { count: count2.clone() }));
        emitter.emit(DrawerEvent::DrawerClosed);

        assert_eq!(count1.load(Ordering::SeqCst), 1);
        assert_eq!(count2.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn emitter_delivers_correct_events() {
        let emitter = EventEmitter::new();
        let capture = Arc::new(EventCapture::default());
        emitter.add_listener(capture.clone());

        emitter.emit(DrawerEvent::PanelOpened(PanelKind::Settings));

        assert_eq!(capture.take(), vec![DrawerEvent::PanelOpened(PanelKind::Settings)]);
    }

    #[test]
    fn only_record_and_live_stream_require_confirmation() {
        let confirmable: Vec<_> = ActionId::ALL
            .into_iter()
            .filter(|a| a.requires_confirmation())
            .collect();
        assert_eq!(confirmable, vec![ActionId::Record, ActionId::LiveStream]);
    }
}
