//! Admission of a new leave request.
//!
//! Stores gather the facts inside their atomic section and call [`admit`]
//! before inserting, so the check and the insert cannot interleave with a
//! concurrent change to the employee or leave type.

use chrono::NaiveDate;

use hrportal_core::{DomainError, DomainResult};

use crate::request::{AdmittedLeaveRequest, CreateLeaveRequest};
use crate::seniority::check_seniority;

/// What the store knows about the request's references at admission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionFacts {
    /// Hire date of the requesting employee, `None` if the employee is unknown.
    pub hire_date: Option<NaiveDate>,
    pub leave_type_exists: bool,
    pub today: NaiveDate,
}

/// Checks run in order: employee exists, seniority, dates and status,
/// leave type exists.
///
/// An ineligible employee is refused before their dates are looked at.
pub fn admit(cmd: CreateLeaveRequest, facts: AdmissionFacts) -> DomainResult<AdmittedLeaveRequest> {
    let hire_date = facts
        .hire_date
        .ok_or_else(|| DomainError::not_found(format!("employee {} not found", cmd.employee_id)))?;

    check_seniority(hire_date, facts.today)?;

    let admitted = cmd.validate()?;

    if !facts.leave_type_exists {
        return Err(DomainError::not_found(format!("leave type {} not found", admitted.leave_type_id)));
    }
    Ok(admitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::LeaveStatus;
    use hrportal_core::{EmployeeId, LeaveTypeId};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn cmd() -> CreateLeaveRequest {
        CreateLeaveRequest {
            employee_id: EmployeeId::new(1),
            leave_type_id: LeaveTypeId::new(1),
            start_date: "2024-09-01".into(),
            end_date: "2024-09-02".into(),
            reason: None,
            status: None,
        }
    }

    fn bad_dates() -> CreateLeaveRequest {
        CreateLeaveRequest { start_date: "not-a-date".into(), ..cmd() }
    }

    fn facts(hire_date: Option<NaiveDate>, leave_type_exists: bool) -> AdmissionFacts {
        AdmissionFacts { hire_date, leave_type_exists, today: d(2024, 8, 15) }
    }

    #[test]
    fn unknown_employee_wins_over_everything() {
        let err = admit(bad_dates(), facts(None, false)).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(m) if m.contains("employee")));
    }

    #[test]
    fn junior_employee_is_refused_before_dates_are_parsed() {
        let err = admit(bad_dates(), facts(Some(d(2024, 6, 1)), true)).unwrap_err();
        assert_eq!(err, DomainError::forbidden("must have at least 6 months seniority to request leave"));
    }

    #[test]
    fn eligible_employee_with_bad_dates_is_a_validation_error() {
        let err = admit(bad_dates(), facts(Some(d(2024, 1, 10)), true)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let inverted = CreateLeaveRequest { start_date: "2024-09-05".into(), ..cmd() };
        let err = admit(inverted, facts(Some(d(2024, 1, 10)), true)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(m) if m.contains("after")));
    }

    #[test]
    fn dates_are_checked_before_leave_type() {
        let err = admit(bad_dates(), facts(Some(d(2024, 1, 10)), false)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn seniority_is_checked_before_leave_type() {
        let err = admit(cmd(), facts(Some(d(2024, 6, 1)), false)).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn missing_leave_type_is_not_found() {
        let err = admit(cmd(), facts(Some(d(2024, 1, 10)), false)).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(m) if m.contains("leave type")));
    }

    #[test]
    fn eligible_request_is_admitted_as_pending() {
        let admitted = admit(cmd(), facts(Some(d(2024, 1, 10)), true)).unwrap();
        assert_eq!(admitted.status, LeaveStatus::Pending);
        assert_eq!(admitted.period.start(), d(2024, 9, 1));
    }
}
