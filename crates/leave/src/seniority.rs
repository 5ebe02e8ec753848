//! Seniority eligibility.
//!
//! Seniority counts whole calendar months between the hire month and the
//! current month; the day of month is ignored, so someone hired on the 31st
//! gains a month on the 1st.

use chrono::{Datelike, NaiveDate};

use hrportal_core::{DomainError, DomainResult};

/// Minimum seniority, in calendar months, to request leave.
pub const MIN_SENIORITY_MONTHS: i32 = 6;

pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() * 12 + to.month0() as i32) - (from.year() * 12 + from.month0() as i32)
}

pub fn check_seniority(hire_date: NaiveDate, today: NaiveDate) -> DomainResult<()> {
    if months_between(hire_date, today) >= MIN_SENIORITY_MONTHS {
        Ok(())
    } else {
        Err(DomainError::forbidden(format!(
            "must have at least {MIN_SENIORITY_MONTHS} months seniority to request leave"
        )))
    }
}
