use chrono::NaiveDateTime;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchedulerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("invalid request for patient '{patient_id}': {reason}")]
    InvalidRequest { patient_id: String, reason: String },

    #[error("invalid calendar configuration: {0}")]
    InvalidCalendarConfig(String),

    #[error("appointment {start} - {end} is outside working hours")]
    OutOfHours {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("appointment {start} - {end} overlaps existing appointment for '{existing}'")]
    Overlap {
        start: NaiveDateTime,
        end: NaiveDateTime,
        existing: String,
    },

    #[error("invalid priority: '{0}'. Must be one of: emergency, urgent, routine")]
    UnknownPriority(String),

    /// A calendar mutation failed during the scheduler's own commit or
    /// rollback. Indicates a defect, not a rejected request.
    #[error("scheduling invariant violated: {0}")]
    InvariantViolation(#[source] Box<SchedulerError>),
}

impl SchedulerError {
    pub(crate) fn invalid_request(patient_id: &str, reason: impl Into<String>) -> Self {
        SchedulerError::InvalidRequest {
            patient_id: patient_id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invariant(err: SchedulerError) -> Self {
        SchedulerError::InvariantViolation(Box::new(err))
    }
}
