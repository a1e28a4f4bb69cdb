//! Service-day filtering.
//!
//! A feed covers many days; a network is built for one. `calendar.txt`
//! gives each service a weekly pattern over a date range and
//! `calendar_dates.txt` adds or removes single days.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};

use super::records::{CalendarDateRecord, CalendarRecord};

const SERVICE_ADDED: u8 = 1;
const SERVICE_REMOVED: u8 = 2;

impl CalendarRecord {
    /// Returns true if the weekly pattern runs on `date`.
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        if date < self.start_date || date > self.end_date {
            return false;
        }
        let flag = match date.weekday() {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        };
        flag == 1
    }
}

/// Service ids running on `date`.
pub fn active_services(
    calendar: &[CalendarRecord],
    exceptions: &[CalendarDateRecord],
    date: NaiveDate,
) -> HashSet<String> {
    let mut active: HashSet<String> = calendar
        .iter()
        .filter(|c| c.runs_on(date))
        .map(|c| c.service_id.clone())
        .collect();

    for exception in exceptions.iter().filter(|e| e.date == date) {
        match exception.exception_type {
            SERVICE_ADDED => {
                active.insert(exception.service_id.clone());
            }
            SERVICE_REMOVED => {
                active.remove(&exception.service_id);
            }
            _ => {}
        }
    }

    active
}
