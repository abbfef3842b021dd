use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{auth::AuthContext, error::PayrollError};

/// Review state of one chatter's pay week
///
/// ```text
/// UNLOCKED --lock--> LOCKED_PENDING_REVIEW --approve--> CONFIRMED
/// LOCKED_PENDING_REVIEW | CONFIRMED --reject--> UNLOCKED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayrollState {
    Unlocked,
    LockedPendingReview,
    Confirmed,
}

impl PayrollState {
    pub fn from_flags(sales_locked: bool, admin_confirmed: bool) -> Self {
        match (sales_locked, admin_confirmed) {
            (false, _) => PayrollState::Unlocked,
            (true, false) => PayrollState::LockedPendingReview,
            (true, true) => PayrollState::Confirmed,
        }
    }

    pub fn is_locked(self) -> bool {
        self != PayrollState::Unlocked
    }

    /// `(sales_locked, admin_confirmed)` to persist for this state
    pub fn flags(self) -> (bool, bool) {
        match self {
            PayrollState::Unlocked => (false, false),
            PayrollState::LockedPendingReview => (true, false),
            PayrollState::Confirmed => (true, true),
        }
    }

    pub fn lock(self, actor: &AuthContext, chatter_id: Uuid) -> Result<Self, PayrollError> {
        if !actor.can_edit(chatter_id) {
            return Err(PayrollError::Forbidden);
        }

        match self {
            PayrollState::Unlocked => Ok(PayrollState::LockedPendingReview),
            _ => Err(PayrollError::lock_violation("week is already locked")),
        }
    }

    pub fn approve(self, actor: &AuthContext) -> Result<Self, PayrollError> {
        if !actor.can_approve_payroll() {
            return Err(PayrollError::Forbidden);
        }

        match self {
            PayrollState::LockedPendingReview => Ok(PayrollState::Confirmed),
            PayrollState::Unlocked => Err(PayrollError::lock_violation("week has not been locked for review")),
            PayrollState::Confirmed => Err(PayrollError::lock_violation("week is already confirmed")),
        }
    }

    /// Returns the week to the chatter; confirmed fields must be cleared alongside
    pub fn reject(self, actor: &AuthContext) -> Result<Self, PayrollError> {
        if !actor.can_approve_payroll() {
            return Err(PayrollError::Forbidden);
        }

        match self {
            PayrollState::LockedPendingReview | PayrollState::Confirmed => Ok(PayrollState::Unlocked),
            PayrollState::Unlocked => Err(PayrollError::lock_violation("week is not locked")),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{auth::fixtures::context, entity::sea_orm_active_enums::RoleType};

    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(PayrollState::from_flags(false, false), PayrollState::Unlocked);
        // Confirmation without a lock is not meaningful
        assert_eq!(PayrollState::from_flags(false, true), PayrollState::Unlocked);
        assert_eq!(PayrollState::from_flags(true, false), PayrollState::LockedPendingReview);
        assert_eq!(PayrollState::from_flags(true, true), PayrollState::Confirmed);

        for state in [PayrollState::Unlocked, PayrollState::LockedPendingReview, PayrollState::Confirmed] {
            let (locked, confirmed) = state.flags();
            assert_eq!(PayrollState::from_flags(locked, confirmed), state);
        }
    }

    #[test]
    fn test_full_cycle() {
        let chatter = context(RoleType::Chatter);
        let hr = context(RoleType::HrWorkForce);

        let state = PayrollState::Unlocked.lock(&chatter, chatter.id()).unwrap();
        assert_eq!(state, PayrollState::LockedPendingReview);

        let state = state.approve(&hr).unwrap();
        assert_eq!(state, PayrollState::Confirmed);

        let state = state.reject(&hr).unwrap();
        assert_eq!(state, PayrollState::Unlocked);
        assert_eq!(state.flags(), (false, false));
    }

    #[test]
    fn test_lock_guards() {
        let chatter = context(RoleType::Chatter);
        let admin = context(RoleType::Admin);
        let someone_else = context(RoleType::Chatter);

        assert!(matches!(
            PayrollState::LockedPendingReview.lock(&chatter, chatter.id()),
            Err(PayrollError::ConcurrentLockViolation(_))
        ));
        assert!(matches!(
            PayrollState::Confirmed.lock(&admin, chatter.id()),
            Err(PayrollError::ConcurrentLockViolation(_))
        ));
        assert!(matches!(
            PayrollState::Unlocked.lock(&someone_else, chatter.id()),
            Err(PayrollError::Forbidden)
        ));
        assert_eq!(PayrollState::Unlocked.lock(&admin, chatter.id()).unwrap(), PayrollState::LockedPendingReview);
    }

    #[test]
    fn test_only_approvers_approve_or_reject() {
        let chatter = context(RoleType::Chatter);
        let admin = context(RoleType::Admin);

        for actor in [&chatter, &admin] {
            assert!(matches!(PayrollState::LockedPendingReview.approve(actor), Err(PayrollError::Forbidden)));
            assert!(matches!(PayrollState::LockedPendingReview.reject(actor), Err(PayrollError::Forbidden)));
        }
    }

    #[test]
    fn test_transitions_from_the_wrong_state() {
        let hr = context(RoleType::HrWorkForce);

        assert!(matches!(PayrollState::Unlocked.approve(&hr), Err(PayrollError::ConcurrentLockViolation(_))));
        assert!(matches!(PayrollState::Confirmed.approve(&hr), Err(PayrollError::ConcurrentLockViolation(_))));
        assert!(matches!(PayrollState::Unlocked.reject(&hr), Err(PayrollError::ConcurrentLockViolation(_))));
        assert_eq!(PayrollState::LockedPendingReview.reject(&hr).unwrap(), PayrollState::Unlocked);
    }
}
