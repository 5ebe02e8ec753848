use core::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use hrportal_core::{
    DomainError, DomainResult, EmployeeId, Entity, LeaveRequestId, LeaveTypeId, LooseId,
    optional_text, require_date, require_text,
};

/// Leave request status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeaveStatus::Pending => "PENDING",
            LeaveStatus::Approved => "APPROVED",
            LeaveStatus::Rejected => "REJECTED",
        }
    }

    /// Whether a decision has been made on the request.
    pub fn is_decided(self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

impl core::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaveStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(LeaveStatus::Pending),
            "APPROVED" => Ok(LeaveStatus::Approved),
            "REJECTED" => Ok(LeaveStatus::Rejected),
            _ => Err(DomainError::validation("invalid status")),
        }
    }
}

/// An inclusive date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeavePeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl LeavePeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if start > end {
            return Err(DomainError::validation("startDate must not be after endDate"));
        }
        Ok(Self { start, end })
    }

    fn parse(start: Option<&str>, end: Option<&str>) -> DomainResult<Self> {
        let start = require_date(start, "startDate")?;
        let end = require_date(end, "endDate")?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: LeaveRequestId,
    pub employee_id: EmployeeId,
    pub leave_type_id: LeaveTypeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
}

impl Entity for LeaveRequest {
    type Id = LeaveRequestId;

    fn id(&self) -> LeaveRequestId {
        self.id
    }
}

/// Admin payload for creating or updating a leave request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLeaveRequestInput {
    pub employee_id: Option<LooseId>,
    pub leave_type_id: Option<LooseId>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reason: Option<String>,
    pub status: Option<String>,
}

/// Employee payload for requesting leave for themselves.
///
/// There is deliberately no `employeeId` or `status` here: any such keys in
/// the body are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfServiceLeaveInput {
    pub leave_type_id: Option<LooseId>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reason: Option<String>,
}

fn parse_status(raw: Option<&str>) -> DomainResult<Option<LeaveStatus>> {
    raw.map(str::parse).transpose()
}

/// Command: create a leave request.
///
/// Construction only checks that the required fields are present and that
/// the ids parse. Dates and status stay raw until [`crate::admit`] has
/// confirmed the employee exists and is eligible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLeaveRequest {
    pub employee_id: EmployeeId,
    pub leave_type_id: LeaveTypeId,
    pub start_date: String,
    pub end_date: String,
    pub reason: Option<String>,
    pub status: Option<String>,
}

impl CreateLeaveRequest {
    /// Admin entry point: the caller names the employee and may preset the
    /// status.
    pub fn from_admin(input: AdminLeaveRequestInput) -> DomainResult<Self> {
        let employee_id = LooseId::require(input.employee_id.as_ref(), "employeeId")?;
        let leave_type_id = LooseId::require(input.leave_type_id.as_ref(), "leaveTypeId")?;

        Ok(Self {
            employee_id,
            leave_type_id,
            start_date: require_text(input.start_date, "startDate")?,
            end_date: require_text(input.end_date, "endDate")?,
            reason: optional_text(input.reason),
            status: input.status,
        })
    }

    /// Self-service entry point: the employee comes from the verified
    /// credential and the status is always pending.
    pub fn from_self_service(employee_id: EmployeeId, input: SelfServiceLeaveInput) -> DomainResult<Self> {
        let leave_type_id = LooseId::require(input.leave_type_id.as_ref(), "leaveTypeId")?;

        Ok(Self {
            employee_id,
            leave_type_id,
            start_date: require_text(input.start_date, "startDate")?,
            end_date: require_text(input.end_date, "endDate")?,
            reason: optional_text(input.reason),
            status: None,
        })
    }

    /// Parses the period and status.
    pub(crate) fn validate(self) -> DomainResult<AdmittedLeaveRequest> {
        let period = LeavePeriod::parse(Some(&self.start_date), Some(&self.end_date))?;
        let status = parse_status(self.status.as_deref())?.unwrap_or(LeaveStatus::Pending);

        Ok(AdmittedLeaveRequest {
            employee_id: self.employee_id,
            leave_type_id: self.leave_type_id,
            period,
            reason: self.reason,
            status,
        })
    }
}

/// A create command that passed admission, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmittedLeaveRequest {
    pub employee_id: EmployeeId,
    pub leave_type_id: LeaveTypeId,
    pub period: LeavePeriod,
    pub reason: Option<String>,
    pub status: LeaveStatus,
}

impl AdmittedLeaveRequest {
    pub fn into_leave_request(self, id: LeaveRequestId, created_at: DateTime<Utc>) -> LeaveRequest {
        LeaveRequest {
            id,
            employee_id: self.employee_id,
            leave_type_id: self.leave_type_id,
            start_date: self.period.start(),
            end_date: self.period.end(),
            reason: self.reason,
            status: self.status,
            created_at,
        }
    }
}

/// Command: admin update of an existing request.
///
/// References and dates are replaced; `reason` and `status` keep their
/// stored values when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateLeaveRequest {
    pub employee_id: EmployeeId,
    pub leave_type_id: LeaveTypeId,
    pub period: LeavePeriod,
    pub reason: Option<String>,
    pub status: Option<LeaveStatus>,
}

impl TryFrom<AdminLeaveRequestInput> for UpdateLeaveRequest {
    type Error = DomainError;

    fn try_from(input: AdminLeaveRequestInput) -> DomainResult<Self> {
        let employee_id = LooseId::require(input.employee_id.as_ref(), "employeeId")?;
        let leave_type_id = LooseId::require(input.leave_type_id.as_ref(), "leaveTypeId")?;
        let period = LeavePeriod::parse(input.start_date.as_deref(), input.end_date.as_deref())?;
        let status = parse_status(input.status.as_deref())?;

        Ok(Self {
            employee_id,
            leave_type_id,
            period,
            reason: optional_text(input.reason),
            status,
        })
    }
}

impl UpdateLeaveRequest {
    pub fn apply(self, request: &mut LeaveRequest) -> StatusChange {
        let previous = request.status;

        request.employee_id = self.employee_id;
        request.leave_type_id = self.leave_type_id;
        request.start_date = self.period.start();
        request.end_date = self.period.end();
        if let Some(reason) = self.reason {
            request.reason = Some(reason);
        }
        if let Some(status) = self.status {
            request.status = status;
        }

        StatusChange { previous, current: request.status }
    }
}

/// Status before and after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub previous: LeaveStatus,
    pub current: LeaveStatus,
}

impl StatusChange {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }

    /// A decided request moved to a different status.
    pub fn reopened(&self) -> bool {
        self.previous.is_decided() && self.changed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn admin_input() -> AdminLeaveRequestInput {
        AdminLeaveRequestInput {
            employee_id: Some(LooseId::Number(1)),
            leave_type_id: Some(LooseId::Text("2".into())),
            start_date: Some("2024-09-01".into()),
            end_date: Some("2024-09-05".into()),
            reason: Some("Holiday".into()),
            status: None,
        }
    }

    fn admitted(input: AdminLeaveRequestInput) -> DomainResult<AdmittedLeaveRequest> {
        CreateLeaveRequest::from_admin(input)?.validate()
    }

    #[test]
    fn admin_create_defaults_to_pending() {
        let cmd = admitted(admin_input()).unwrap();
        assert_eq!(cmd.status, LeaveStatus::Pending);
        assert_eq!(cmd.leave_type_id, LeaveTypeId::new(2));
        assert_eq!(cmd.period.end(), NaiveDate::from_ymd_opt(2024, 9, 5).unwrap());
    }

    #[test]
    fn admin_create_honours_supplied_status() {
        let mut input = admin_input();
        input.status = Some("APPROVED".into());
        assert_eq!(admitted(input).unwrap().status, LeaveStatus::Approved);
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        let mut input = admin_input();
        input.status = Some("approved".into());
        assert_eq!(admitted(input).unwrap_err(), DomainError::Validation("invalid status".into()));
    }

    #[test]
    fn dates_and_status_are_not_checked_at_construction() {
        let mut input = admin_input();
        input.start_date = Some("not-a-date".into());
        input.status = Some("bogus".into());
        let cmd = CreateLeaveRequest::from_admin(input).unwrap();
        assert!(matches!(cmd.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn blank_date_is_a_missing_field() {
        let mut input = admin_input();
        input.end_date = Some("  ".into());
        assert_eq!(
            CreateLeaveRequest::from_admin(input).unwrap_err(),
            DomainError::Validation("endDate is required".into())
        );
    }

    #[test]
    fn inverted_period_is_rejected() {
        let mut input = admin_input();
        input.start_date = Some("2024-09-10".into());
        assert_eq!(
            admitted(input).unwrap_err(),
            DomainError::Validation("startDate must not be after endDate".into())
        );
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut input = admin_input();
        input.employee_id = None;
        assert!(CreateLeaveRequest::from_admin(input).is_err());
    }

    #[test]
    fn self_service_ignores_client_employee_and_status() {
        let body = r#"{"employeeId":99,"status":"APPROVED","leaveTypeId":2,
                       "startDate":"2024-09-01","endDate":"2024-09-01"}"#;
        let input: SelfServiceLeaveInput = serde_json::from_str(body).unwrap();
        let cmd = CreateLeaveRequest::from_self_service(EmployeeId::new(5), input)
            .unwrap()
            .validate()
            .unwrap();

        assert_eq!(cmd.employee_id, EmployeeId::new(5));
        assert_eq!(cmd.status, LeaveStatus::Pending);
    }

    #[test]
    fn update_keeps_reason_and_status_when_absent() {
        let mut stored = admitted(admin_input())
            .unwrap()
            .into_leave_request(LeaveRequestId::new(1), Utc::now());
        stored.status = LeaveStatus::Approved;

        let mut input = admin_input();
        input.reason = None;
        input.end_date = Some("2024-09-08".into());
        let change = UpdateLeaveRequest::try_from(input).unwrap().apply(&mut stored);

        assert_eq!(stored.reason.as_deref(), Some("Holiday"));
        assert_eq!(stored.status, LeaveStatus::Approved);
        assert_eq!(stored.end_date, NaiveDate::from_ymd_opt(2024, 9, 8).unwrap());
        assert!(!change.changed());
    }

    #[test]
    fn moving_out_of_a_decision_is_reported_as_reopened() {
        let change = StatusChange { previous: LeaveStatus::Rejected, current: LeaveStatus::Pending };
        assert!(change.reopened());
        let change = StatusChange { previous: LeaveStatus::Pending, current: LeaveStatus::Approved };
        assert!(!change.reopened());
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&LeaveStatus::Rejected).unwrap(), "\"REJECTED\"");
    }

    proptest! {
        #[test]
        fn only_the_three_statuses_parse(s in "\\PC{0,12}") {
            let parsed = s.parse::<LeaveStatus>();
            let known = matches!(s.as_str(), "PENDING" | "APPROVED" | "REJECTED");
            prop_assert_eq!(parsed.is_ok(), known);
            if let Ok(status) = parsed {
                prop_assert_eq!(status.as_str(), s.as_str());
            }
        }
    }
}
