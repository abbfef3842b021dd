/// Hours credited for every day with attendance
pub const SHIFT_HOURS: i64 = 8;

/// Department whose pay week runs Wednesday to Tuesday
pub const DEFAULT_LATE_SHIFT_DEPARTMENT: &str = "10PM";

/// `(minimum weekly sales, commission percent)`, highest tier first
pub const COMMISSION_TIERS: [(i64, i64); 4] = [
    (2000, 3),
    (1500, 2),
    (1000, 1),
    (0, 0),
];

/// Longest attendance export, counted in pay weeks
pub const MAX_EXPORT_WEEKS: i64 = 26;
