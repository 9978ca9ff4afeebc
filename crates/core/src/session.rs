//! Client-side plan session: the dashboard's plan store as an explicit,
//! injectable state container.
//!
//! A [`PlanSession`] wraps a [`PlanBackend`] (the HTTP API in production, a
//! fake in tests) and owns `current_plan`, the `plans` history and the
//! generation state machine:
//!
//! ```text
//! Idle --generate--> Generating --success/error--> Idle
//!                        |
//!                        +--cancel--> Idle (late result discarded)
//! ```
//!
//! A `generate` issued while `Generating` is rejected, so responses can
//! never be applied out of order. Each generation carries a ticket; a result
//! whose ticket no longer matches (because the session was cancelled) is
//! dropped on arrival. Dropping a pending `generate` future (a timeout,
//! `select!`, a view going away) returns the session to `Idle`.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Serialize;

use crate::command::{validate_command, Command};
use crate::error::CoreError;
use crate::plan::EditPlan;
use crate::quota::{SubscriptionTier, Usage};
use crate::types::Timestamp;

/// Remote operations the session depends on.
#[async_trait]
pub trait PlanBackend: Send + Sync {
    /// Generate a plan for an already-validated command.
    async fn generate(&self, command: &Command) -> Result<EditPlan, CoreError>;

    /// The user's full plan history, ordered by `created_at`.
    async fn fetch_plans(&self) -> Result<Vec<EditPlan>, CoreError>;
}

/// Generation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Generating { ticket: u64 },
}

/// Read-only view of the session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub is_loading: bool,
    pub current_plan: Option<EditPlan>,
    pub plans: Vec<EditPlan>,
    pub last_error: Option<String>,
}

#[derive(Debug)]
struct Inner {
    state: SessionState,
    next_ticket: u64,
    current_plan: Option<EditPlan>,
    plans: Vec<EditPlan>,
    last_error: Option<String>,
}

/// Plan store for one user session.
pub struct PlanSession<B> {
    backend: B,
    inner: Mutex<Inner>,
}

impl<B: PlanBackend> PlanSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            inner: Mutex::new(Inner {
                state: SessionState::Idle,
                next_ticket: 0,
                current_plan: None,
                plans: Vec::new(),
                last_error: None,
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validate `raw`, generate a plan and make it the current plan.
    ///
    /// - Invalid input fails with [`CoreError::Validation`] without touching
    ///   the backend or the state.
    /// - A call made while another generation is in flight fails with
    ///   [`CoreError::Conflict`].
    /// - Backend errors return the session to `Idle`, are recorded as
    ///   `last_error`, and leave history unchanged.
    /// - If the session was cancelled meanwhile, the result is discarded
    ///   and [`CoreError::Cancelled`] is returned.
    pub async fn generate(&self, raw: &str) -> Result<EditPlan, CoreError> {
        let command = validate_command(raw)?;

        let ticket = {
            let mut inner = self.lock()?;
            if let SessionState::Generating { .. } = inner.state {
                return Err(CoreError::Conflict(
                    "A plan is already being generated".into(),
                ));
            }
            let ticket = inner.next_ticket;
            inner.next_ticket += 1;
            inner.state = SessionState::Generating { ticket };
            inner.last_error = None;
            ticket
        };
        let _pending = PendingGeneration {
            inner: &self.inner,
            ticket,
        };

        let result = self.backend.generate(&command).await;

        let mut inner = self.lock()?;
        if inner.state != (SessionState::Generating { ticket }) {
            tracing::debug!(ticket, "Discarding result of cancelled generation");
            return Err(CoreError::Cancelled);
        }
        inner.state = SessionState::Idle;

        match result {
            Ok(plan) => {
                inner.current_plan = Some(plan.clone());
                inner.plans.push(plan.clone());
                Ok(plan)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Plan generation failed");
                inner.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Replace the history with the backend's list.
    pub async fn fetch_plans(&self) -> Result<Vec<EditPlan>, CoreError> {
        match self.backend.fetch_plans().await {
            Ok(plans) => {
                let mut inner = self.lock()?;
                inner.plans = plans.clone();
                Ok(plans)
            }
            Err(err) => {
                self.lock()?.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Abandon an in-flight generation, if any. Returns whether one was
    /// pending.
    pub fn cancel(&self) -> Result<bool, CoreError> {
        let mut inner = self.lock()?;
        let was_generating = matches!(inner.state, SessionState::Generating { .. });
        inner.state = SessionState::Idle;
        Ok(was_generating)
    }

    pub fn state(&self) -> Result<SessionState, CoreError> {
        Ok(self.lock()?.state)
    }

    pub fn is_loading(&self) -> Result<bool, CoreError> {
        Ok(matches!(self.state()?, SessionState::Generating { .. }))
    }

    pub fn current_plan(&self) -> Result<Option<EditPlan>, CoreError> {
        Ok(self.lock()?.current_plan.clone())
    }

    pub fn plans(&self) -> Result<Vec<EditPlan>, CoreError> {
        Ok(self.lock()?.plans.clone())
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot, CoreError> {
        let inner = self.lock()?;
        Ok(SessionSnapshot {
            is_loading: matches!(inner.state, SessionState::Generating { .. }),
            current_plan: inner.current_plan.clone(),
            plans: inner.plans.clone(),
            last_error: inner.last_error.clone(),
        })
    }

    /// Plans used in the billing period containing `now`.
    pub fn usage(
        &self,
        tier: SubscriptionTier,
        free_limit: u32,
        now: Timestamp,
    ) -> Result<Usage, CoreError> {
        let inner = self.lock()?;
        Ok(Usage::from_plans(tier, &inner.plans, free_limit, now))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, CoreError> {
        self.inner
            .lock()
            .map_err(|e| CoreError::Internal(format!("Plan session state poisoned: {e}")))
    }
}

/// Resets the state to `Idle` when dropped while its ticket is still the
/// one generating.
struct PendingGeneration<'a> {
    inner: &'a Mutex<Inner>,
    ticket: u64,
}

impl Drop for PendingGeneration<'_> {
    fn drop(&mut self) {
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        if inner.state == (SessionState::Generating { ticket: self.ticket }) {
            tracing::debug!(ticket = self.ticket, "Generation abandoned before completion");
            inner.state = SessionState::Idle;
        }
    }
}
