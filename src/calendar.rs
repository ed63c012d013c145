//! Calendar management for the appointment scheduling system.
//!
//! This module provides the DoctorCalendar struct which owns a doctor's
//! working hours and the set of confirmed appointments within them.

use crate::error::{Result, SchedulerError};
use crate::models::{ConfirmedAppointment, Priority};
use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DoctorCalendar {
    open_time: NaiveDateTime,
    close_time: NaiveDateTime,
    slot_minutes: u32,
    /// Sorted by start time, pairwise non-overlapping.
    appointments: Vec<ConfirmedAppointment>,
}

impl DoctorCalendar {
    /// Initialize a calendar for the given working hours.
    ///
    /// `slot_minutes` is the grid that first-fit candidate starts snap to.
    pub fn new(open_time: NaiveDateTime, close_time: NaiveDateTime, slot_minutes: u32) -> Result<Self> {
        if close_time <= open_time {
            return Err(SchedulerError::InvalidCalendarConfig(format!(
                "close_time {} must be after open_time {}",
                close_time, open_time
            )));
        }
        if slot_minutes == 0 {
            return Err(SchedulerError::InvalidCalendarConfig(
                "slot_minutes must be positive".to_string(),
            ));
        }

        Ok(DoctorCalendar {
            open_time,
            close_time,
            slot_minutes,
            appointments: Vec::new(),
        })
    }

    pub fn open_time(&self) -> NaiveDateTime {
        self.open_time
    }

    pub fn close_time(&self) -> NaiveDateTime {
        self.close_time
    }

    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    /// Snapshot of all confirmed appointments sorted by start time.
    pub fn appointments(&self) -> Vec<ConfirmedAppointment> {
        self.appointments.clone()
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    /// First appointment booked for `patient_id`, if any.
    pub fn find_by_patient(&self, patient_id: &str) -> Option<&ConfirmedAppointment> {
        self.appointments.iter().find(|a| a.patient_id == patient_id)
    }

    pub fn is_within_hours(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.open_time <= start && end <= self.close_time
    }

    /// First confirmed appointment intersecting `[start, end)`.
    pub fn overlaps_existing(&self, start: NaiveDateTime, end: NaiveDateTime) -> Option<&ConfirmedAppointment> {
        self.appointments.iter().find(|a| a.overlaps(start, end))
    }

    /// Insert an appointment, keeping the start-time order.
    ///
    /// Fails without touching the calendar if the appointment is outside
    /// working hours or collides with an existing one.
    pub fn add_appointment(&mut self, appt: ConfirmedAppointment) -> Result<()> {
        if !self.is_within_hours(appt.start, appt.end) {
            return Err(SchedulerError::OutOfHours {
                start: appt.start,
                end: appt.end,
            });
        }
        if let Some(existing) = self.overlaps_existing(appt.start, appt.end) {
            return Err(SchedulerError::Overlap {
                start: appt.start,
                end: appt.end,
                existing: existing.patient_id.clone(),
            });
        }

        let idx = self.appointments.partition_point(|a| a.start <= appt.start);
        self.appointments.insert(idx, appt);
        Ok(())
    }

    /// Remove every appointment equal to `appt`. Returns whether any was found.
    pub fn remove_appointment(&mut self, appt: &ConfirmedAppointment) -> bool {
        let before = self.appointments.len();
        self.appointments.retain(|a| a != appt);
        self.appointments.len() != before
    }

    /// Earliest free slot of length `duration` inside the request window.
    ///
    /// Candidate starts begin at `max(window_start, open_time)` rounded up to
    /// a multiple of `step_minutes` counted from midnight, and advance by
    /// `step_minutes`. `step_minutes` defaults to the calendar's slot size.
    pub fn find_first_fit(
        &self,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
        duration: Duration,
        step_minutes: Option<u32>,
    ) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let step = step_minutes.filter(|s| *s > 0).unwrap_or(self.slot_minutes);
        let stride = Duration::minutes(i64::from(step));
        let latest_start = window_end.min(self.close_time) - duration;

        let mut cursor = ceil_to_step(window_start.max(self.open_time), step);
        while cursor <= latest_start {
            let end = cursor + duration;
            if end <= self.close_time && self.overlaps_existing(cursor, end).is_none() {
                return Some((cursor, end));
            }
            cursor += stride;
        }
        None
    }

    /// Evict every appointment overlapping `[start, end)` that `incoming`
    /// strictly outranks. Returns the evicted appointments in start order.
    ///
    /// Overlapping appointments of equal or higher precedence stay put, so
    /// the caller must re-check for overlap before placing.
    pub fn preempt_if_needed(
        &mut self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        incoming: Priority,
    ) -> Vec<ConfirmedAppointment> {
        let (evicted, kept): (Vec<_>, Vec<_>) = self
            .appointments
            .drain(..)
            .partition(|a| a.overlaps(start, end) && incoming.outranks(a.priority));
        self.appointments = kept;

        for appt in &evicted {
            debug!(
                patient_id = %appt.patient_id,
                priority = %appt.priority,
                start = %appt.start,
                "evicted appointment for {} request",
                incoming
            );
        }
        evicted
    }

    /// Every free grid-aligned slot of `duration` within working hours.
    pub fn available_slots(&self, duration: Duration) -> Vec<(NaiveDateTime, NaiveDateTime)> {
        let mut slots = Vec::new();
        let mut from = self.open_time;
        while let Some((start, end)) = self.find_first_fit(from, self.close_time, duration, None) {
            slots.push((start, end));
            from = start + Duration::minutes(i64::from(self.slot_minutes));
        }
        slots
    }
}

impl fmt::Display for DoctorCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DoctorCalendar({} - {}, slot={}m, appointments={})",
            self.open_time.format("%Y-%m-%d %H:%M"),
            self.close_time.format("%H:%M"),
            self.slot_minutes,
            self.appointments.len()
        )
    }
}

/// Round `dt` up to the next multiple of `step_minutes` since its midnight.
fn ceil_to_step(dt: NaiveDateTime, step_minutes: u32) -> NaiveDateTime {
    let midnight = dt.date().and_time(NaiveTime::MIN);
    let step = i64::from(step_minutes) * 60;
    let mut since = (dt - midnight).num_seconds();
    if dt.nanosecond() > 0 {
        since += 1;
    }
    let rounded = (since + step - 1) / step * step;
    midnight + Duration::seconds(rounded)
}
