use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::*;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct DayPath {
    pub(super) day_of_week: i16,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct MarkDay {
    /// Models worked that day, empty clears the day
    pub(super) models: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct ExportRange {
    /// Last day to export, defaults to the end of the requested week
    pub(super) to: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WeekAttendance {
    pub(super) week: WeekSummary,
    pub(super) rows: Vec<attendance::Model>,
    pub(super) days_present: usize,
    pub(super) hours_worked: Decimal,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub(super) struct ExportRow {
    pub(super) date: NaiveDate,
    pub(super) day_name: String,
    pub(super) present: bool,
    pub(super) models_worked: Vec<String>,
    pub(super) submitted_at: Option<DateTimeWithTimeZone>,
}
