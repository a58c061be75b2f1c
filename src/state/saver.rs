use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{Plan, PlanId};
use crate::state::backend::{PlanStore, SessionContext};
use crate::state::persistence::{build_save_payload, SavePayload};

/// Where the save trigger stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveStatus {
    Idle,
    Saving,
    /// Saved; the editor should leave after `leave_after`.
    Saved { plan_id: PlanId, leave_after: Duration },
    /// Last attempt failed; the trigger is enabled again.
    Failed { message: String },
}

/// Save guard: at most one outstanding save per editor session.
///
/// A save runs in three steps so the guard holds across event turns:
/// [`PlanSaver::begin`] snapshots the plan, [`SaveRequest::dispatch`] talks to
/// the store, [`PlanSaver::finish`] records the outcome.
#[derive(Debug)]
pub struct PlanSaver {
    bound_id: Option<PlanId>,
    status: SaveStatus,
    redirect_delay: Duration,
}

impl PlanSaver {
    pub fn new(bound_id: Option<PlanId>, redirect_delay: Duration) -> Self {
        Self {
            bound_id,
            status: SaveStatus::Idle,
            redirect_delay,
        }
    }

    pub fn bound_id(&self) -> Option<PlanId> {
        self.bound_id
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    /// Whether the save trigger should be disabled.
    pub fn is_saving(&self) -> bool {
        self.status == SaveStatus::Saving
    }

    /// Snapshot `plan` into a request. `None` while another save is outstanding.
    pub fn begin(&mut self, plan: &Plan) -> Option<SaveRequest> {
        if self.is_saving() {
            debug!("save already in flight, ignoring");
            return None;
        }
        self.status = SaveStatus::Saving;
        Some(SaveRequest {
            target: self.bound_id,
            payload: build_save_payload(plan),
        })
    }

    /// Record the outcome of the outstanding save and re-enable the trigger.
    pub fn finish(&mut self, outcome: Result<PlanId>) -> &SaveStatus {
        self.status = match outcome {
            Ok(plan_id) => {
                self.bound_id = Some(plan_id);
                SaveStatus::Saved {
                    plan_id,
                    leave_after: self.redirect_delay,
                }
            }
            Err(e) => {
                warn!(error = %e, transient = e.is_transient(), "plan save failed");
                SaveStatus::Failed {
                    message: e.user_message(),
                }
            }
        };
        &self.status
    }
}

/// A save snapshot ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    target: Option<PlanId>,
    payload: SavePayload,
}

impl SaveRequest {
    pub fn payload(&self) -> &SavePayload {
        &self.payload
    }

    /// Create when unbound, update the bound plan otherwise.
    pub async fn dispatch(self, store: &dyn PlanStore, session: &SessionContext) -> Result<PlanId> {
        match self.target {
            None => {
                info!(meals = self.payload.meals.len(), "creating plan");
                let created = store.create_plan(session, &self.payload).await?;
                Ok(created.id)
            }
            Some(id) => {
                info!(plan_id = %id, meals = self.payload.meals.len(), "updating plan");
                store.update_plan(session, id, &self.payload).await?;
                Ok(id)
            }
        }
    }
}
