//! Data models for the appointment scheduling system.
//!
//! This module defines the value types the scheduler works with:
//! - Priority: Ranked urgency levels used for preemption
//! - AppointmentRequest: What a patient asks for
//! - ConfirmedAppointment: What the calendar has committed to

use crate::error::{Result, SchedulerError};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Appointment lengths must be a multiple of this many minutes.
pub const DURATION_GRANULARITY_MINUTES: u32 = 5;

/// Priority levels for appointments.
///
/// Lower rank means higher precedence: an `Emergency` outranks everything,
/// a `Routine` outranks nothing. The derived ordering follows rank, so
/// `Priority::Emergency < Priority::Routine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Emergency = 0,
    Urgent = 1,
    Routine = 2,
}

impl Priority {
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Whether `self` takes strict precedence over `other`.
    pub fn outranks(self, other: Priority) -> bool {
        self.rank() < other.rank()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Priority::Emergency => "EMERGENCY",
            Priority::Urgent => "URGENT",
            Priority::Routine => "ROUTINE",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Priority {
    type Err = SchedulerError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "emergency" => Ok(Priority::Emergency),
            "urgent" => Ok(Priority::Urgent),
            "routine" => Ok(Priority::Routine),
            _ => Err(SchedulerError::UnknownPriority(value.to_string())),
        }
    }
}

/// A patient's request for an appointment.
///
/// `requested_start..requested_end` is the acceptable window; the appointment
/// itself lasts `duration_minutes` and may land anywhere inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub patient_id: String,
    pub requested_start: NaiveDateTime,
    pub requested_end: NaiveDateTime,
    pub duration_minutes: u32,
    pub priority: Priority,
    pub note: String,
}

impl AppointmentRequest {
    /// Build a request. Nothing is checked here; call [`validate`](Self::validate)
    /// or go through [`create_appointment_request`].
    pub fn new(
        patient_id: impl Into<String>,
        requested_start: NaiveDateTime,
        requested_end: NaiveDateTime,
        duration_minutes: u32,
        priority: Priority,
    ) -> Self {
        AppointmentRequest {
            patient_id: patient_id.into(),
            requested_start,
            requested_end,
            duration_minutes,
            priority,
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.requested_end <= self.requested_start {
            return Err(SchedulerError::invalid_request(
                &self.patient_id,
                "requested_end must be after requested_start",
            ));
        }
        if self.duration_minutes == 0 || self.duration_minutes % DURATION_GRANULARITY_MINUTES != 0 {
            return Err(SchedulerError::invalid_request(
                &self.patient_id,
                format!(
                    "duration_minutes must be positive and a multiple of {}, got {}",
                    DURATION_GRANULARITY_MINUTES, self.duration_minutes
                ),
            ));
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// An appointment committed to a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedAppointment {
    pub patient_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub priority: Priority,
    pub note: String,
}

impl ConfirmedAppointment {
    /// Confirm `request` at `[start, end)`.
    pub fn from_request(request: &AppointmentRequest, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        ConfirmedAppointment {
            patient_id: request.patient_id.clone(),
            start,
            end,
            priority: request.priority,
            note: request.note.clone(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        !(end <= self.start || start >= self.end)
    }
}

/// Factory function to create a validated appointment request.
pub fn create_appointment_request(
    patient_id: impl Into<String>,
    priority: &str,
    requested_start: NaiveDateTime,
    requested_end: NaiveDateTime,
    duration_minutes: u32,
    note: impl Into<String>,
) -> Result<AppointmentRequest> {
    let priority = priority.parse::<Priority>()?;
    let request = AppointmentRequest::new(
        patient_id,
        requested_start,
        requested_end,
        duration_minutes,
        priority,
    )
    .with_note(note);
    request.validate()?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 13)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_priority_precedence() {
        assert!(Priority::Emergency.outranks(Priority::Urgent));
        assert!(Priority::Urgent.outranks(Priority::Routine));
        assert!(!Priority::Emergency.outranks(Priority::Emergency));
        assert!(!Priority::Routine.outranks(Priority::Urgent));
        assert!(Priority::Emergency < Priority::Routine);
        assert_eq!(Priority::Routine.rank(), 2);
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(" Emergency ".parse::<Priority>().unwrap(), Priority::Emergency);
        assert_eq!("ROUTINE".parse::<Priority>().unwrap(), Priority::Routine);
        assert_eq!(
            "stat".parse::<Priority>(),
            Err(SchedulerError::UnknownPriority("stat".into()))
        );
    }

    #[test]
    fn test_validate_window() {
        let req = AppointmentRequest::new("p1", at(10, 0), at(10, 0), 15, Priority::Routine);
        let err = req.validate().unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidRequest { ref patient_id, .. } if patient_id == "p1"));
    }

    #[test]
    fn test_validate_duration() {
        for bad in [0, 7, 12] {
            let req = AppointmentRequest::new("p1", at(9, 0), at(10, 0), bad, Priority::Urgent);
            assert!(req.validate().is_err(), "duration {bad} should be rejected");
        }
        let ok = AppointmentRequest::new("p1", at(9, 0), at(10, 0), 45, Priority::Urgent);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_duration_may_exceed_window() {
        // Window length and appointment length are independent.
        let req = AppointmentRequest::new("p1", at(9, 0), at(9, 10), 30, Priority::Routine);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_confirmed_overlap_is_half_open() {
        let appt = ConfirmedAppointment {
            patient_id: "p1".into(),
            start: at(9, 0),
            end: at(9, 30),
            priority: Priority::Routine,
            note: String::new(),
        };
        assert_eq!(appt.duration(), Duration::minutes(30));
        assert!(appt.overlaps(at(9, 15), at(9, 45)));
        assert!(appt.overlaps(at(8, 0), at(10, 0)));
        assert!(!appt.overlaps(at(9, 30), at(10, 0)));
        assert!(!appt.overlaps(at(8, 30), at(9, 0)));
    }

    #[test]
    fn test_factory() {
        let req = create_appointment_request("P002", "emergency", at(10, 0), at(11, 0), 30, "Severe chest pain").unwrap();
        assert_eq!(req.priority, Priority::Emergency);
        assert_eq!(req.note, "Severe chest pain");

        assert!(create_appointment_request("P003", "soon", at(10, 0), at(11, 0), 30, "").is_err());
        assert!(create_appointment_request("P004", "urgent", at(10, 0), at(11, 0), 7, "").is_err());
    }
}
