//! Appointment scheduling algorithm with emergency preemption.
//!
//! Requests are processed strictly in input order. Each one is first placed
//! with a first-fit search over its window; only an emergency that finds no
//! vacancy may evict lower-priority appointments, and the eviction is undone
//! if the emergency still cannot be placed.

use crate::calendar::DoctorCalendar;
use crate::error::{Result, SchedulerError};
use crate::models::{AppointmentRequest, ConfirmedAppointment, Priority};
use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

/// Outcome of a scheduling run.
///
/// Every input request ends up either in `confirmed` (as the appointment it
/// produced) or in `rejected`. `preempted` holds appointments evicted to make
/// room for emergencies, in removal order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingResult {
    pub confirmed: Vec<ConfirmedAppointment>,
    pub rejected: Vec<AppointmentRequest>,
    pub preempted: Vec<ConfirmedAppointment>,
}

impl SchedulingResult {
    pub fn total_requests(&self) -> usize {
        self.confirmed.len() + self.rejected.len()
    }

    /// Calculate the success rate as a percentage.
    pub fn success_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        (self.confirmed.len() as f64 / total as f64) * 100.0
    }
}

/// Schedule `requests` onto `calendar` in order.
///
/// All requests are validated before anything is placed; one invalid request
/// aborts the run and leaves the calendar untouched.
pub fn schedule_requests(calendar: &mut DoctorCalendar, requests: &[AppointmentRequest]) -> Result<SchedulingResult> {
    for request in requests {
        request.validate()?;
    }

    let span = info_span!("schedule_run", run_id = %Uuid::new_v4(), requests = requests.len());
    let _guard = span.enter();

    let mut result = SchedulingResult::default();
    for request in requests {
        match place_request(calendar, request)? {
            Placement::Confirmed(appt) => result.confirmed.push(appt),
            Placement::Preempting(appt, evicted) => {
                result.confirmed.push(appt);
                result.preempted.extend(evicted);
            }
            Placement::Rejected => {
                debug!(patient_id = %request.patient_id, priority = %request.priority, "request rejected");
                result.rejected.push(request.clone());
            }
        }
    }

    info!(
        confirmed = result.confirmed.len(),
        rejected = result.rejected.len(),
        preempted = result.preempted.len(),
        "scheduling run finished"
    );
    Ok(result)
}

enum Placement {
    Confirmed(ConfirmedAppointment),
    Preempting(ConfirmedAppointment, Vec<ConfirmedAppointment>),
    Rejected,
}

fn place_request(calendar: &mut DoctorCalendar, request: &AppointmentRequest) -> Result<Placement> {
    let duration = request.duration();

    if let Some((start, end)) =
        calendar.find_first_fit(request.requested_start, request.requested_end, duration, None)
    {
        let appt = ConfirmedAppointment::from_request(request, start, end);
        calendar.add_appointment(appt.clone()).map_err(SchedulerError::invariant)?;
        debug!(patient_id = %appt.patient_id, start = %start, end = %end, "placed");
        return Ok(Placement::Confirmed(appt));
    }

    if request.priority != Priority::Emergency {
        return Ok(Placement::Rejected);
    }

    // Forced placement is not snapped to the slot grid.
    let start = truncate_to_minute(request.requested_start.max(calendar.open_time()));
    let end = start + duration;
    if !calendar.is_within_hours(start, end) {
        return Ok(Placement::Rejected);
    }

    let evicted = calendar.preempt_if_needed(start, end, request.priority);
    let blocker = calendar.overlaps_existing(start, end).map(|a| a.patient_id.clone());
    if let Some(blocker) = blocker {
        warn!(
            patient_id = %request.patient_id,
            blocker = %blocker,
            restored = evicted.len(),
            "emergency still blocked, rolling back preemption"
        );
        for appt in evicted {
            calendar.add_appointment(appt).map_err(SchedulerError::invariant)?;
        }
        return Ok(Placement::Rejected);
    }

    let appt = ConfirmedAppointment::from_request(request, start, end);
    calendar.add_appointment(appt.clone()).map_err(SchedulerError::invariant)?;
    info!(
        patient_id = %appt.patient_id,
        start = %start,
        end = %end,
        preempted = evicted.len(),
        "emergency placed by preemption"
    );
    Ok(Placement::Preempting(appt, evicted))
}

fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt - Duration::seconds(i64::from(dt.second())) - Duration::nanoseconds(i64::from(dt.nanosecond()))
}

/// Owns a calendar and a FIFO queue of pending requests.
///
/// Requests are processed in the order they were queued; priority only
/// matters for preemption, never for queue order.
pub struct AppointmentScheduler {
    pub calendar: DoctorCalendar,
    request_queue: Vec<AppointmentRequest>,
}

impl AppointmentScheduler {
    pub fn new(calendar: DoctorCalendar) -> Self {
        AppointmentScheduler {
            calendar,
            request_queue: Vec::new(),
        }
    }

    /// Add a request to the scheduling queue.
    pub fn add_request(&mut self, request: AppointmentRequest) {
        self.request_queue.push(request);
    }

    pub fn add_requests(&mut self, requests: impl IntoIterator<Item = AppointmentRequest>) {
        self.request_queue.extend(requests);
    }

    pub fn pending_count(&self) -> usize {
        self.request_queue.len()
    }

    /// Clear all pending requests, returning how many were dropped.
    pub fn clear_queue(&mut self) -> usize {
        let count = self.request_queue.len();
        self.request_queue.clear();
        count
    }

    /// Schedule everything queued so far.
    ///
    /// On a validation error the queue is kept intact so the caller can fix
    /// or clear it.
    pub fn process_queue(&mut self) -> Result<SchedulingResult> {
        let result = schedule_requests(&mut self.calendar, &self.request_queue)?;
        self.request_queue.clear();
        Ok(result)
    }

    pub fn schedule_batch(&mut self, requests: Vec<AppointmentRequest>) -> Result<SchedulingResult> {
        self.add_requests(requests);
        self.process_queue()
    }
}
