use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::{consts::SHIFT_HOURS, entity::attendance};

/// A single attendance mark as seen by the hours aggregation
pub trait AttendanceMark {
    fn day_of_week(&self) -> i16;

    fn present(&self) -> bool;
}

impl AttendanceMark for attendance::Model {
    fn day_of_week(&self) -> i16 {
        self.day_of_week
    }

    fn present(&self) -> bool {
        self.present
    }
}

impl AttendanceMark for (i16, bool) {
    fn day_of_week(&self) -> i16 {
        self.0
    }

    fn present(&self) -> bool {
        self.1
    }
}

/// Distinct days with at least one present mark
///
/// A chatter working several models on one day has one row per model, the
/// day still counts once.
pub fn days_present<'a, T>(rows: impl IntoIterator<Item = &'a T>) -> usize
where
    T: AttendanceMark + 'a,
{
    rows.into_iter()
        .filter(|row| row.present())
        .map(|row| row.day_of_week())
        .collect::<BTreeSet<_>>()
        .len()
}

pub fn hours_worked<'a, T>(rows: impl IntoIterator<Item = &'a T>) -> Decimal
where
    T: AttendanceMark + 'a,
{
    Decimal::from(days_present(rows) as i64 * SHIFT_HOURS)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_same_day_rows_count_once() {
        let rows: [(i16, bool); 3] = [(5, true), (5, true), (5, true)];

        assert_eq!(days_present(&rows), 1);
        assert_eq!(hours_worked(&rows), dec!(8));
    }

    #[test]
    fn test_absent_rows_are_ignored() {
        let rows: [(i16, bool); 4] = [(4, true), (5, false), (6, true), (6, false)];

        assert_eq!(hours_worked(&rows), dec!(16));
    }

    #[test]
    fn test_full_week() {
        let rows = (0..7i16).flat_map(|day| [(day, true), (day, true)]).collect::<Vec<_>>();

        assert_eq!(days_present(&rows), 7);
        assert_eq!(hours_worked(&rows), dec!(56));
    }

    #[test]
    fn test_no_rows() {
        let rows: [(i16, bool); 0] = [];

        assert_eq!(hours_worked(&rows), Decimal::ZERO);
    }
}
