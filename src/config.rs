//! Clinic working-hours configuration.
//!
//! Read from `CLINICSLOT_OPEN`, `CLINICSLOT_CLOSE` (both `HH:MM`) and
//! `CLINICSLOT_SLOT_MINUTES`. Missing variables fall back to a 09:00-17:00
//! day on a 5 minute grid.

use crate::calendar::DoctorCalendar;
use crate::error::{Result, SchedulerError};
use chrono::{NaiveDate, NaiveTime};

pub const OPEN_VAR: &str = "CLINICSLOT_OPEN";
pub const CLOSE_VAR: &str = "CLINICSLOT_CLOSE";
pub const SLOT_MINUTES_VAR: &str = "CLINICSLOT_SLOT_MINUTES";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClinicConfig {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub slot_minutes: u32,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        ClinicConfig {
            open: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            slot_minutes: 5,
        }
    }
}

impl ClinicConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ClinicConfig::default();
        if let Some(raw) = lookup(OPEN_VAR) {
            config.open = parse_time(OPEN_VAR, &raw)?;
        }
        if let Some(raw) = lookup(CLOSE_VAR) {
            config.close = parse_time(CLOSE_VAR, &raw)?;
        }
        if let Some(raw) = lookup(SLOT_MINUTES_VAR) {
            config.slot_minutes = raw.trim().parse().map_err(|_| {
                SchedulerError::InvalidCalendarConfig(format!("{SLOT_MINUTES_VAR}: '{raw}' is not a minute count"))
            })?;
        }
        Ok(config)
    }

    /// Working-hours calendar for one clinic day.
    pub fn calendar_for(&self, date: NaiveDate) -> Result<DoctorCalendar> {
        DoctorCalendar::new(date.and_time(self.open), date.and_time(self.close), self.slot_minutes)
    }
}

fn parse_time(var: &str, raw: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|e| SchedulerError::InvalidCalendarConfig(format!("{var}: '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClinicConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClinicConfig::default());
        assert_eq!(config.open, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(config.slot_minutes, 5);
    }

    #[test]
    fn test_overrides() {
        let config = ClinicConfig::from_lookup(lookup(&[
            (OPEN_VAR, "08:30"),
            (CLOSE_VAR, " 12:00 "),
            (SLOT_MINUTES_VAR, "15"),
        ]))
        .unwrap();
        assert_eq!(config.open, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(config.close, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(config.slot_minutes, 15);
    }

    #[test]
    fn test_bad_values() {
        assert!(matches!(
            ClinicConfig::from_lookup(lookup(&[(OPEN_VAR, "nine")])),
            Err(SchedulerError::InvalidCalendarConfig(_))
        ));
        assert!(matches!(
            ClinicConfig::from_lookup(lookup(&[(SLOT_MINUTES_VAR, "-5")])),
            Err(SchedulerError::InvalidCalendarConfig(_))
        ));
    }

    #[test]
    fn test_calendar_for() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 13).unwrap();
        let cal = ClinicConfig::default().calendar_for(day).unwrap();
        assert_eq!(cal.open_time(), day.and_hms_opt(9, 0, 0).unwrap());
        assert_eq!(cal.close_time(), day.and_hms_opt(17, 0, 0).unwrap());

        let inverted = ClinicConfig {
            open: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            close: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            slot_minutes: 5,
        };
        assert!(inverted.calendar_for(day).is_err());
    }
}
