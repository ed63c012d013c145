//! Priority-aware appointment scheduling for a single doctor's working day.
//!
//! Requests are placed onto a [`DoctorCalendar`] in input order using a
//! quantized first-fit search. Emergency requests that find no vacancy may
//! displace overlapping lower-priority appointments; the displacement is
//! rolled back if the emergency still cannot be placed.

pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;

pub use calendar::DoctorCalendar;
pub use config::ClinicConfig;
pub use error::{Result, SchedulerError};
pub use models::{create_appointment_request, AppointmentRequest, ConfirmedAppointment, Priority};
pub use scheduler::{schedule_requests, AppointmentScheduler, SchedulingResult};
