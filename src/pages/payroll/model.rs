use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::*;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WeekStatus {
    pub(super) week: WeekSummary,
    pub(super) record: Option<payroll_week::Model>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct ApproveWeek {
    /// Defaults to the hours derived from attendance
    pub(super) hours_worked: Option<Decimal>,
    /// Defaults to the tier matching the week's sales
    pub(super) commission_rate: Option<Decimal>,
    pub(super) overtime_pay: Option<Decimal>,
    pub(super) overtime_notes: Option<String>,
    pub(super) deduction_amount: Option<Decimal>,
    pub(super) deduction_notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct Approval {
    pub(super) record: payroll_week::Model,
    pub(super) payout: Payout,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct OverviewRow {
    pub(super) chatter_id: Uuid,
    pub(super) name: String,
    pub(super) department: Option<String>,
    pub(super) week_start: NaiveDate,
    pub(super) week_end: NaiveDate,
    pub(super) state: PayrollState,
    pub(super) total_sales: Decimal,
    pub(super) hours_worked: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct Overview {
    pub(super) date: NaiveDate,
    pub(super) rows: Vec<OverviewRow>,
    pub(super) total_sales: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct PayslipChatter {
    pub(super) id: Uuid,
    pub(super) username: String,
    pub(super) name: String,
    pub(super) department: Option<String>,
    pub(super) hourly_rate: Decimal,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub(super) struct PayslipModelSales {
    pub(super) model_name: String,
    pub(super) earnings: Decimal,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub(super) struct PayslipAdjustment {
    pub(super) amount: Decimal,
    pub(super) notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct Payslip {
    pub(super) chatter: PayslipChatter,
    pub(super) week_start: NaiveDate,
    pub(super) week_end: NaiveDate,
    pub(super) sales: Vec<PayslipModelSales>,
    pub(super) total_sales: Decimal,
    pub(super) days_present: usize,
    pub(super) hours_worked: Decimal,
    pub(super) overtime: PayslipAdjustment,
    pub(super) deduction: PayslipAdjustment,
    pub(super) payout: Payout,
}
