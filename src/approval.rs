//! Transaction approval as an explicit two-phase transition.
//!
//! A settled state (`Approved` / `Rejected`) moves to `Pending` while the
//! mutation runs and only settles on the requested value once the backend
//! accepted it and the session cache was cleared. A failed mutation puts the
//! previous settled state back.

use crate::api::{SetTransactionApprovalParams, Transaction};
use crate::client::FetchClient;
use crate::{Error, ErrorContext, Result};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    Approved,
    /// Not approved.
    Rejected,
    Pending { previous: bool, requested: bool },
}

impl ApprovalState {
    pub fn from_flag(approved: bool) -> Self {
        if approved {
            Self::Approved
        } else {
            Self::Rejected
        }
    }

    /// Settled value, or `None` while a change is in flight.
    pub fn settled(&self) -> Option<bool> {
        match self {
            Self::Approved => Some(true),
            Self::Rejected => Some(false),
            Self::Pending { .. } => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// Checkbox value to show: a pending change keeps showing the old value.
    pub fn displayed(&self) -> bool {
        match *self {
            Self::Approved => true,
            Self::Rejected => false,
            Self::Pending { previous, .. } => previous,
        }
    }
}

/// Approval state of one transaction.
pub struct ApprovalToggle {
    transaction_id: String,
    state: Mutex<ApprovalState>,
}

impl ApprovalToggle {
    pub fn new(transaction: &Transaction) -> Self {
        Self {
            transaction_id: transaction.id.clone(),
            state: Mutex::new(ApprovalState::from_flag(transaction.approved)),
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn state(&self) -> ApprovalState {
        *self.lock()
    }

    /// Requests `value` from the backend and settles on it when accepted.
    ///
    /// Fails with a validation error if another change is still pending. On a
    /// backend error the previous state is restored and the error returned.
    pub async fn set(&self, client: &FetchClient, value: bool) -> Result<ApprovalState> {
        let previous = {
            let mut state = self.lock();
            if state.is_pending() {
                return Err(Error::validation_with_context(
                    "approval change already in progress",
                    ErrorContext::new()
                        .with_field_path("transactionId")
                        .with_details(self.transaction_id.clone())
                        .with_source("approval"),
                ));
            }
            let previous = state.displayed();
            *state = ApprovalState::Pending {
                previous,
                requested: value,
            };
            previous
        };

        let result = client
            .fetch_without_cache(&SetTransactionApprovalParams::new(
                self.transaction_id.clone(),
                value,
            ))
            .await;

        let mut state = self.lock();
        match result {
            Ok(()) => {
                client.clear_cache();
                *state = ApprovalState::from_flag(value);
                info!(transaction_id = %self.transaction_id, approved = value, "approval updated");
                Ok(*state)
            }
            Err(e) => {
                *state = ApprovalState::from_flag(previous);
                Err(e)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ApprovalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
