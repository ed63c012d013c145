//! Demo run of the appointment scheduler.
//!
//! Builds tomorrow's calendar from the environment, schedules a fixed set of
//! requests and prints the outcome. Set `CLINICSLOT_OUTPUT=json` to get the
//! result as JSON instead of text.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use clinicslot::{create_appointment_request, AppointmentRequest, ClinicConfig, Result, SchedulingResult};
use clinicslot::{AppointmentScheduler, DoctorCalendar};
use tracing::info;

fn at(day: NaiveDate, hour: u32, minute: u32) -> Result<NaiveDateTime> {
    day.and_hms_opt(hour, minute, 0).ok_or_else(|| {
        clinicslot::SchedulerError::InvalidCalendarConfig(format!("bad demo time {hour:02}:{minute:02}"))
    })
}

fn demo_requests(day: NaiveDate) -> Result<Vec<AppointmentRequest>> {
    Ok(vec![
        create_appointment_request("P001", "routine", at(day, 9, 0)?, at(day, 10, 0)?, 60, "Annual checkup")?,
        create_appointment_request("P002", "emergency", at(day, 9, 0)?, at(day, 9, 30)?, 30, "Severe chest pain")?,
        create_appointment_request("P003", "urgent", at(day, 14, 0)?, at(day, 15, 0)?, 45, "Follow-up on test results")?,
        create_appointment_request("P004", "routine", at(day, 14, 0)?, at(day, 15, 0)?, 30, "Prescription renewal")?,
        create_appointment_request("P005", "urgent", at(day, 9, 15)?, at(day, 9, 45)?, 15, "Wound check")?,
    ])
}

fn print_text(result: &SchedulingResult, calendar: &DoctorCalendar) {
    println!("\n{}", "=".repeat(60));
    println!("       APPOINTMENT SCHEDULING RESULTS");
    println!("{}", "=".repeat(60));
    println!("{calendar}");
    println!(
        "Confirmed: {} | Rejected: {} | Preempted: {} | Success rate: {:.1}%",
        result.confirmed.len(),
        result.rejected.len(),
        result.preempted.len(),
        result.success_rate()
    );

    println!("\nConfirmed schedule:");
    for apt in calendar.appointments() {
        println!(
            "  [{:9}] {:6} {} - {}  {}",
            apt.priority.name(),
            apt.patient_id,
            apt.start.format("%H:%M"),
            apt.end.format("%H:%M"),
            apt.note
        );
    }

    if !result.preempted.is_empty() {
        println!("\nPreempted (removed for an emergency):");
        for apt in &result.preempted {
            println!("  - {} ({}) was at {}", apt.patient_id, apt.priority.name(), apt.start.format("%H:%M"));
        }
    }

    if !result.rejected.is_empty() {
        println!("\nRejected requests:");
        for req in &result.rejected {
            println!(
                "  - {} ({}) wanted {}m between {} and {}",
                req.patient_id,
                req.priority.name(),
                req.duration_minutes,
                req.requested_start.format("%H:%M"),
                req.requested_end.format("%H:%M")
            );
        }
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = ClinicConfig::from_env()?;
    let day = (Local::now() + Duration::days(1)).date_naive();
    let calendar = config.calendar_for(day)?;
    info!("clinic day {day}: {calendar}");

    let mut scheduler = AppointmentScheduler::new(calendar);
    let result = scheduler.schedule_batch(demo_requests(day)?)?;

    match std::env::var("CLINICSLOT_OUTPUT").as_deref() {
        Ok("json") => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text(&result, &scheduler.calendar),
    }
    Ok(())
}
