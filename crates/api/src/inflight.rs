//! One generation at a time per user.
//!
//! [`InFlightRegistry::try_acquire`] hands out an RAII [`InFlightGuard`];
//! a second acquire for the same user fails with [`CoreError::Conflict`]
//! until the guard is dropped. The guard is dropped on every exit path of
//! the handler, including cancellation when the client disconnects.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use editai_core::error::CoreError;
use editai_core::types::DbId;

#[derive(Debug, Default)]
pub struct InFlightRegistry {
    users: Mutex<HashSet<DbId>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `user_id` as generating.
    pub fn try_acquire(self: &Arc<Self>, user_id: DbId) -> Result<InFlightGuard, CoreError> {
        let mut users = self
            .users
            .lock()
            .map_err(|e| CoreError::Internal(format!("In-flight registry poisoned: {e}")))?;
        if !users.insert(user_id) {
            return Err(CoreError::Conflict(
                "A plan is already being generated for this account".into(),
            ));
        }
        Ok(InFlightGuard {
            registry: Arc::clone(self),
            user_id,
        })
    }

    pub fn is_generating(&self, user_id: DbId) -> bool {
        self.users
            .lock()
            .map(|users| users.contains(&user_id))
            .unwrap_or(false)
    }
}

/// Releases the user's slot when dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    registry: Arc<InFlightRegistry>,
    user_id: DbId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        match self.registry.users.lock() {
            Ok(mut users) => {
                users.remove(&self.user_id);
            }
            Err(poisoned) => {
                poisoned.into_inner().remove(&self.user_id);
            }
        }
    }
}
