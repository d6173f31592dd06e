//! Two-phase confirm-then-execute protocol shared by record and live-stream.
//!
//! A [`ConfirmationFlow`] holds at most one pending [`ConfirmationRequest`].
//! The request is resolved exactly once: `accept` hands back the payload so
//! the caller can execute, `cancel` drops it. Both are safe to call with a
//! request that has already been resolved; they simply report that nothing
//! happened.

use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::errors::DrawerError;
use crate::events::ActionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest<P> {
    id: Uuid,
    action: ActionId,
    payload: P,
}

impl<P> ConfirmationRequest<P> {
    pub fn id(&self) -> String {
        self.id.to_string()
    }

    pub fn action(&self) -> ActionId {
        self.action
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }
}

pub struct ConfirmationFlow<P> {
    action: ActionId,
    pending: Mutex<Option<ConfirmationRequest<P>>>,
}

impl<P: Clone> ConfirmationFlow<P> {
    pub fn new(action: ActionId) -> Self {
        Self {
            action,
            pending: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<ConfirmationRequest<P>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a confirmation. Fails if one is already pending for this action.
    pub fn request(&self, payload: P) -> Result<ConfirmationRequest<P>, DrawerError> {
        let mut slot = self.slot();
        if slot.is_some() {
            return Err(DrawerError::ConfirmationPending(self.action));
        }
        let request = ConfirmationRequest {
            id: Uuid::new_v4(),
            action: self.action,
            payload,
        };
        *slot = Some(request.clone());
        tracing::debug!(action = ?self.action, id = %request.id, "confirmation requested");
        Ok(request)
    }

    /// True if `request` is the one currently awaiting a decision.
    pub fn is_current(&self, request: &ConfirmationRequest<P>) -> bool {
        self.slot().as_ref().is_some_and(|p| p.id == request.id)
    }

    /// Resolve `request` as accepted and return its payload.
    pub fn accept(&self, request: &ConfirmationRequest<P>) -> Result<P, DrawerError> {
        let mut slot = self.slot();
        match slot.take() {
            Some(pending) if pending.id == request.id => {
                tracing::debug!(action = ?self.action, id = %pending.id, "confirmation accepted");
                Ok(pending.payload)
            }
            other => {
                *slot = other;
                Err(DrawerError::StaleConfirmation(self.action))
            }
        }
    }

    /// Resolve `request` as cancelled. Returns false when it was not pending.
    pub fn cancel(&self, request: &ConfirmationRequest<P>) -> bool {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|p| p.id == request.id) {
            *slot = None;
            tracing::debug!(action = ?self.action, id = %request.id, "confirmation cancelled");
            true
        } else {
            false
        }
    }

    /// Cancel whatever is pending, returning it.
    pub fn dismiss(&self) -> Option<ConfirmationRequest<P>> {
        self.slot().take()
    }

    pub fn pending(&self) -> Option<ConfirmationRequest<P>> {
        self.slot().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.slot().is_some()
    }
}
