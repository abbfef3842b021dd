use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{consts::COMMISSION_TIERS, entity::sales_entry, error::PayrollError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationInput {
    pub total_sales: Decimal,
    pub hours_worked: Decimal,
    pub hourly_rate: Decimal,
    pub overtime_pay: Decimal,
    pub deduction_amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    /// Percent, `3` means 3%
    pub commission_rate: Decimal,
    pub commission_amount: Decimal,
    pub hourly_pay: Decimal,
    /// Negative when deductions exceed earnings
    pub total_payout: Decimal,
}

impl Payout {
    /// Amounts rounded to cents for display
    pub fn rounded(&self) -> Self {
        Self {
            commission_rate: self.commission_rate,
            commission_amount: to_cents(self.commission_amount),
            hourly_pay: to_cents(self.hourly_pay),
            total_payout: to_cents(self.total_payout),
        }
    }
}

pub fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Commission percent for a week's total sales
pub fn commission_rate(total_sales: Decimal) -> Decimal {
    COMMISSION_TIERS.iter()
        .find(|(minimum, _)| total_sales >= Decimal::from(*minimum))
        .map(|(_, rate)| Decimal::from(*rate))
        .unwrap_or(Decimal::ZERO)
}

pub fn is_tier_rate(rate: Decimal) -> bool {
    COMMISSION_TIERS.iter().any(|(_, tier)| Decimal::from(*tier) == rate)
}

pub fn total_sales<'a>(entries: impl IntoIterator<Item = &'a sales_entry::Model>) -> Decimal {
    entries.into_iter()
        .map(|entry| entry.earnings)
        .sum()
}

pub fn compute_payout(input: CompensationInput) -> Result<Payout, PayrollError> {
    compute_payout_with_rate(input, commission_rate(input.total_sales))
}

/// Same as [`compute_payout`] but with the commission percent picked by an approver
pub fn compute_payout_with_rate(input: CompensationInput, rate: Decimal) -> Result<Payout, PayrollError> {
    validate(&input)?;

    if !is_tier_rate(rate) {
        return Err(PayrollError::invalid(format!("commission rate `{rate}` is not one of the commission tiers")));
    }

    let commission_amount = input.total_sales * rate / Decimal::ONE_HUNDRED;
    let hourly_pay = input.hours_worked * input.hourly_rate;

    Ok(Payout {
        commission_rate: rate,
        commission_amount,
        hourly_pay,
        total_payout: hourly_pay + commission_amount + input.overtime_pay - input.deduction_amount,
    })
}

fn validate(input: &CompensationInput) -> Result<(), PayrollError> {
    let fields = [
        ("total_sales", input.total_sales),
        ("hours_worked", input.hours_worked),
        ("hourly_rate", input.hourly_rate),
        ("overtime_pay", input.overtime_pay),
        ("deduction_amount", input.deduction_amount),
    ];

    match fields.iter().find(|(_, value)| value.is_sign_negative() && !value.is_zero()) {
        Some((name, value)) => Err(PayrollError::invalid(format!("`{name}` cannot be negative, got {value}"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn input(total_sales: Decimal) -> CompensationInput {
        CompensationInput {
            total_sales,
            hours_worked: dec!(40),
            hourly_rate: dec!(15),
            overtime_pay: Decimal::ZERO,
            deduction_amount: Decimal::ZERO,
        }
    }

    #[test]
    fn test_commission_tier_boundaries() {
        assert_eq!(compute_payout(input(dec!(999))).unwrap().commission_rate, dec!(0));
        assert_eq!(compute_payout(input(dec!(1000))).unwrap().commission_rate, dec!(1));
        assert_eq!(compute_payout(input(dec!(1499.99))).unwrap().commission_rate, dec!(1));
        assert_eq!(compute_payout(input(dec!(1500))).unwrap().commission_rate, dec!(2));
        assert_eq!(compute_payout(input(dec!(1999.99))).unwrap().commission_rate, dec!(2));
        assert_eq!(compute_payout(input(dec!(2000))).unwrap().commission_rate, dec!(3));
        assert_eq!(compute_payout(input(dec!(0))).unwrap().commission_rate, dec!(0));
    }

    #[test]
    fn test_payout_scenario() {
        let payout = compute_payout(CompensationInput {
            total_sales: dec!(1750),
            hours_worked: dec!(40),
            hourly_rate: dec!(15),
            overtime_pay: dec!(50),
            deduction_amount: dec!(20),
        }).unwrap();

        assert_eq!(payout, Payout {
            commission_rate: dec!(2),
            commission_amount: dec!(35),
            hourly_pay: dec!(600),
            total_payout: dec!(665),
        });
    }

    #[test]
    fn test_hourly_pay_is_linear_in_rate() {
        let single = compute_payout(input(dec!(500))).unwrap();
        let doubled = compute_payout(CompensationInput { hourly_rate: dec!(30), ..input(dec!(500)) }).unwrap();

        assert_eq!(doubled.hourly_pay, single.hourly_pay * dec!(2));
        assert_eq!(doubled.total_payout - single.total_payout, single.hourly_pay);
    }

    #[test]
    fn test_deductions_can_make_payout_negative() {
        let payout = compute_payout(CompensationInput {
            total_sales: dec!(0),
            hours_worked: dec!(8),
            hourly_rate: dec!(10),
            overtime_pay: dec!(0),
            deduction_amount: dec!(100),
        }).unwrap();

        assert_eq!(payout.total_payout, dec!(-20));
    }

    #[test]
    fn test_negative_inputs_are_rejected() {
        let err = compute_payout(CompensationInput { hourly_rate: dec!(-1), ..input(dec!(100)) }).unwrap_err();
        assert!(matches!(err, PayrollError::InvalidInput(message) if message.contains("hourly_rate")));

        let err = compute_payout(CompensationInput { deduction_amount: dec!(-0.01), ..input(dec!(100)) }).unwrap_err();
        assert!(matches!(err, PayrollError::InvalidInput(_)));
    }

    #[test]
    fn test_approver_rate_must_be_a_tier() {
        let payout = compute_payout_with_rate(input(dec!(1750)), dec!(3)).unwrap();
        assert_eq!(payout.commission_amount, dec!(52.5));

        assert!(compute_payout_with_rate(input(dec!(1750)), dec!(2.5)).is_err());
    }

    #[test]
    fn test_no_drift_across_many_additions() {
        let entries = (0..1000).map(|_| dec!(0.1)).sum::<Decimal>();

        assert_eq!(entries, dec!(100));
        assert_eq!(commission_rate(entries * dec!(10)), dec!(1));
    }

    #[test]
    fn test_rounding_happens_at_presentation() {
        let payout = compute_payout(CompensationInput {
            total_sales: dec!(1000.555),
            hours_worked: dec!(7.5),
            hourly_rate: dec!(13.333),
            overtime_pay: dec!(0),
            deduction_amount: dec!(0),
        }).unwrap();

        assert_eq!(payout.commission_amount, dec!(10.00555));
        assert_eq!(payout.hourly_pay, dec!(99.9975));

        let rounded = payout.rounded();
        assert_eq!(rounded.commission_amount, dec!(10.01));
        assert_eq!(rounded.hourly_pay, dec!(100.00));
        assert_eq!(rounded.total_payout, dec!(110.00));
    }
}
