use thiserror::Error;

use crate::models::PlanId;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Plan not found: {0}")]
    PlanNotFound(PlanId),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Missing or expired credential")]
    Unauthorized,

    #[error("No food entries with a catalog code and positive grams")]
    NoMicronutrientEntries,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PlanError {
    /// Failures of a collaborator call, recoverable by retrying the action.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlanError::Request(_)
                | PlanError::Unauthorized
                | PlanError::PlanNotFound(_)
                | PlanError::Io(_)
                | PlanError::Json(_)
                | PlanError::Csv(_)
        )
    }

    /// The terminal went away; the interactive session cannot go on.
    pub fn ends_session(&self) -> bool {
        matches!(self, PlanError::Prompt(_))
    }

    /// Short message suitable for showing to the user in place of the raw error.
    pub fn user_message(&self) -> String {
        match self {
            PlanError::NoMicronutrientEntries => {
                "Aggiungi almeno un alimento con grammi validi.".to_string()
            }
            PlanError::InvalidInput(msg) => msg.clone(),
            PlanError::PlanNotFound(_) => "Dieta non trovata.".to_string(),
            _ => "Richiesta non riuscita, riprova.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
