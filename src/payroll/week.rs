use std::cmp::Ordering;

use chrono::{Datelike as _, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::PayrollError;

/// Shift grouping that decides which weekday a pay week starts on
///
/// Resolved once from the free-text department stored on a profile, so the
/// calculator never has to compare department strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    /// Week runs Wednesday to Tuesday
    LateShift,
    /// Week runs Thursday to Wednesday
    StandardShift,
}

impl Department {
    pub fn from_label(label: Option<&str>, late_shift_label: &str) -> Self {
        match label {
            Some(label) if label.trim() == late_shift_label => Self::LateShift,
            _ => Self::StandardShift,
        }
    }

    pub fn anchor(self) -> Weekday {
        match self {
            Department::LateShift => Weekday::Wed,
            Department::StandardShift => Weekday::Thu,
        }
    }
}

/// Where a pay week sits relative to the week containing today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekPosition {
    Past,
    Current,
    Future,
}

/// Start of the pay week containing `date`
pub fn week_start(date: NaiveDate, department: Department) -> NaiveDate {
    let anchor = department.anchor().num_days_from_sunday();
    let day = date.weekday().num_days_from_sunday();

    // Days since the most recent anchor, wrapping when the anchor is later in the calendar week
    let back = (day + 7 - anchor) % 7;

    date.checked_sub_days(Days::new(back as u64))
        .unwrap_or(NaiveDate::MIN)
}

pub fn week_end(week_start: NaiveDate) -> NaiveDate {
    week_start.checked_add_days(Days::new(6))
        .unwrap_or(NaiveDate::MAX)
}

pub fn week_position(week_start: NaiveDate, today: NaiveDate, department: Department) -> WeekPosition {
    match week_start.cmp(&self::week_start(today, department)) {
        Ordering::Less => WeekPosition::Past,
        Ordering::Equal => WeekPosition::Current,
        Ordering::Greater => WeekPosition::Future,
    }
}

/// Parses a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate, PayrollError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| PayrollError::invalid(format!("`{value}` is not a valid date")))
}

/// Day-of-week index stored on rows, 0 is Sunday
pub fn start_day_of_week(department: Department) -> i16 {
    department.anchor().num_days_from_sunday() as i16
}

/// Weekdays in the order they appear within a pay week
pub fn days_of_week(department: Department) -> [Weekday; 7] {
    let mut day = department.anchor();

    std::array::from_fn(|_| {
        let current = day;
        day = day.succ();
        current
    })
}

pub fn weekday_from_index(day_of_week: i16) -> Result<Weekday, PayrollError> {
    if !(0..=6).contains(&day_of_week) {
        return Err(PayrollError::invalid(format!("day_of_week `{day_of_week}` must be between 0 and 6")));
    }

    Ok((0..day_of_week).fold(Weekday::Sun, |day, _| day.succ()))
}

/// Calendar date of a stored day-of-week index inside the given pay week
pub fn actual_date(week_start: NaiveDate, day_of_week: i16, department: Department) -> Result<NaiveDate, PayrollError> {
    weekday_from_index(day_of_week)?;

    let offset = (day_of_week - start_day_of_week(department) + 7) % 7;

    week_start.checked_add_days(Days::new(offset as u64))
        .ok_or_else(|| PayrollError::invalid("date is out of range"))
}
