//! Renewal date validation
//!
//! A borrowed copy can be renewed to any date between today and four weeks
//! ahead, both bounds included. Callers that have no proposed date yet are
//! offered today plus three weeks.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// Upper bound of the renewal window in weeks, counted from today
pub const MAX_RENEWAL_WEEKS: i64 = 4;

/// Renewal period in weeks suggested when the caller has not proposed a date
pub const DEFAULT_RENEWAL_WEEKS: i64 = 3;

/// Reasons a proposed renewal date is refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalError {
    #[error("Invalid date - renewal in past")]
    PastDate,

    #[error("Invalid date - renewal more than 4 weeks ahead")]
    TooFarAhead,
}

/// Check a proposed due-back date against today's date.
///
/// Returns the proposed date unchanged when it is accepted.
pub fn validate_renewal_date(proposed: NaiveDate, today: NaiveDate) -> Result<NaiveDate, RenewalError> {
    if proposed < today {
        return Err(RenewalError::PastDate);
    }

    if proposed > today + Duration::weeks(MAX_RENEWAL_WEEKS) {
        return Err(RenewalError::TooFarAhead);
    }

    Ok(proposed)
}

/// Date offered to the caller before any input was given
pub fn default_renewal_date(today: NaiveDate) -> NaiveDate {
    today + Duration::weeks(DEFAULT_RENEWAL_WEEKS)
}
