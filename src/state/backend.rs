//! Collaborator interfaces the editor core talks to.
//!
//! Transport is up to the implementor; [`crate::state::LocalBackend`] backs
//! both traits with local files.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{PlanId, SearchResult};
use crate::state::persistence::{CreatedPlan, PlanSummary, PortionRequest, SavePayload, StoredPlan};

/// Credential context passed explicitly to every collaborator call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    bearer: Option<String>,
}

impl SessionContext {
    pub fn with_bearer(token: impl Into<String>) -> Self {
        Self {
            bearer: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn bearer(&self) -> Option<&str> {
        self.bearer.as_deref()
    }
}

/// Saved-plan storage.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn list_plans(&self, session: &SessionContext) -> Result<Vec<PlanSummary>>;

    async fn fetch_plan(&self, session: &SessionContext, id: PlanId) -> Result<StoredPlan>;

    async fn create_plan(&self, session: &SessionContext, payload: &SavePayload) -> Result<CreatedPlan>;

    async fn update_plan(&self, session: &SessionContext, id: PlanId, payload: &SavePayload) -> Result<()>;

    async fn delete_plan(&self, session: &SessionContext, id: PlanId) -> Result<()>;
}

/// Food catalog lookups.
#[async_trait]
pub trait FoodCatalog: Send + Sync {
    /// Free-text, case-insensitive search.
    async fn search_foods(&self, session: &SessionContext, query: &str) -> Result<Vec<SearchResult>>;

    /// Micronutrient amounts (name to total) for a list of portions.
    async fn compute_micronutrients(
        &self,
        session: &SessionContext,
        portions: &[PortionRequest],
    ) -> Result<BTreeMap<String, f64>>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn PlanStore, _: &dyn FoodCatalog) {}
};
