//! Signup write path: validate, normalize, insert under the uniqueness constraint

use crate::signup_validator::{validate_signup, SignupRequest, ValidationError};
use crate::waitlist_entry::{EntryId, EntryStatus, NewWaitlistEntry};
use crate::waitlist_store::{CountFilter, StoreError, WaitlistStore};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub const SIGNUP_SUCCESS_MESSAGE: &str = "Successfully joined waitlist!";

#[derive(Debug, Error)]
pub enum SignupError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for SignupError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => SignupError::DuplicateEmail,
            other => SignupError::Store(other),
        }
    }
}

/// Result of a successful signup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupReceipt {
    pub message: String,
    /// Total number of entries observed right after the insert. Under
    /// concurrent signups this is approximate, not the entry's exact rank.
    pub position: u64,
    #[serde(skip)]
    pub id: EntryId,
}

pub struct SignupService {
    store: Arc<dyn WaitlistStore>,
}

impl SignupService {
    pub fn new(store: Arc<dyn WaitlistStore>) -> Self {
        Self { store }
    }

    /// Register a new waitlist entry
    pub async fn join(&self, request: &SignupRequest) -> Result<SignupReceipt, SignupError> {
        let signup = validate_signup(request).map_err(|e| {
            debug!("Rejecting signup: {}", e);
            e
        })?;

        let entry = NewWaitlistEntry {
            email: signup.email,
            name: signup.name,
            farm_type: signup.farm_type,
            farm_size: signup.farm_size,
            interests: signup.interests,
            signup_date: Utc::now(),
            status: EntryStatus::Active,
        };
        let email = entry.email.clone();

        let id = self.store.insert_unique(entry).await.map_err(|e| {
            if matches!(e, StoreError::DuplicateEmail) {
                debug!("Rejecting signup for {}: already registered", email);
            }
            SignupError::from(e)
        })?;

        // Separate read; other signups may land between the insert and this count.
        let position = self.store.count(CountFilter::all()).await?;
        info!("New waitlist signup #{} (entry id {})", position, id);

        Ok(SignupReceipt {
            message: SIGNUP_SUCCESS_MESSAGE.to_string(),
            position,
            id,
        })
    }
}
