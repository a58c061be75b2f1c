//! On-demand micronutrient breakdown of one day.
//!
//! Independent of the macro totals: the day's persistable entries are sent
//! to the catalog as `{foodCode, grams}` portions. Each opening starts a new
//! cycle and only the response of the current cycle is applied.

use std::collections::BTreeMap;

use tracing::{debug, info, trace, warn};

use crate::error::{PlanError, Result};
use crate::models::Day;
use crate::state::{micronutrient_portions, FoodCatalog, PortionRequest, SessionContext};

const OVERLAY_ERROR_MESSAGE: &str = "Impossibile calcolare i micronutrienti.";

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayState {
    Closed,
    Loading,
    /// Nutrient name to amount, ordered by name.
    Ready(BTreeMap<String, f64>),
    /// The request failed; the overlay stays open for a retry.
    Failed(String),
}

#[derive(Debug)]
pub struct MicronutrientOverlay {
    state: OverlayState,
    cycle: u64,
}

impl Default for MicronutrientOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl MicronutrientOverlay {
    pub fn new() -> Self {
        Self {
            state: OverlayState::Closed,
            cycle: 0,
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != OverlayState::Closed
    }

    /// Start a cycle for `day`.
    ///
    /// Rejected up front, with no state change, when the day has no entry
    /// with a catalog code and positive grams.
    pub fn open(&mut self, day: &Day) -> Result<OverlayRequest> {
        let portions = micronutrient_portions(day);
        if portions.is_empty() {
            return Err(PlanError::NoMicronutrientEntries);
        }
        self.cycle += 1;
        self.state = OverlayState::Loading;
        debug!(cycle = self.cycle, portions = portions.len(), "micronutrient overlay loading");
        Ok(OverlayRequest {
            cycle: self.cycle,
            portions,
        })
    }

    /// Apply a response. Returns `false` when it belongs to an old cycle.
    pub fn settle(&mut self, response: OverlayResponse) -> bool {
        if response.cycle != self.cycle || self.state != OverlayState::Loading {
            trace!(cycle = response.cycle, current = self.cycle, "discarding stale micronutrients");
            return false;
        }
        self.state = match response.outcome {
            Ok(values) => OverlayState::Ready(values),
            Err(e) => {
                warn!(error = %e, transient = e.is_transient(), "micronutrient request failed");
                OverlayState::Failed(OVERLAY_ERROR_MESSAGE.to_string())
            }
        };
        true
    }

    /// Close and forget any in-flight cycle.
    pub fn close(&mut self) {
        self.cycle += 1;
        self.state = OverlayState::Closed;
    }
}

/// Portions of one overlay cycle, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRequest {
    cycle: u64,
    portions: Vec<PortionRequest>,
}

impl OverlayRequest {
    pub fn portions(&self) -> &[PortionRequest] {
        &self.portions
    }

    pub async fn dispatch(self, catalog: &dyn FoodCatalog, session: &SessionContext) -> OverlayResponse {
        info!(portions = self.portions.len(), "requesting micronutrients");
        let outcome = catalog.compute_micronutrients(session, &self.portions).await;
        OverlayResponse {
            cycle: self.cycle,
            outcome,
        }
    }
}

#[derive(Debug)]
pub struct OverlayResponse {
    cycle: u64,
    outcome: Result<BTreeMap<String, f64>>,
}
