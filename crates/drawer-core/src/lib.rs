//! In-call action drawer core.
//!
//! Decides which drawer actions are available for a session and runs each
//! one through its optional confirmation, the session service call and the
//! resulting notification. No rendering, no platform dependencies; the host
//! UI listens for [`DrawerEvent`]s and supplies the session services.

pub mod config;
pub mod confirmation;
pub mod coordinator;
pub mod errors;
pub mod events;
pub mod gate;
pub mod messages;
pub mod presenter;
pub mod services;

pub use config::{DrawerConfig, ProxyEndpoint};
pub use confirmation::{ConfirmationFlow, ConfirmationRequest};
pub use coordinator::{ActionConfirmation, ActionCoordinator, ActionOutcome, ActionState, SessionServices};
pub use errors::{DrawerError, ServiceFailure};
pub use events::{
    ActionId, ConfirmationPhase, DeviceClass, DrawerEvent, DrawerEventListener, EventEmitter,
    Notification, NotificationKind, PanelKind, SessionContext,
};
pub use gate::{Feature, FeatureFlags, FeatureGate};
pub use messages::{DefaultCatalog, MessageCatalog, MessageKey};
pub use presenter::{ActionButton, ActionDescriptor, Dispatch, DrawerIntent, DrawerPresenter, DrawerSlot, DrawerView};
pub use services::{Clipboard, LiveStreamingService, RecordingService, StreamParams};
