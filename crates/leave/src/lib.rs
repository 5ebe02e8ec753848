//! Leave domain module.
//!
//! Leave type configuration and the leave request lifecycle:
//! - `leave_type`: named categories with a yearly allotment
//! - `request`: request records, status vocabulary, create/update commands
//! - `seniority`: the six-month eligibility rule
//! - `engine`: admission of a new request against the current state
//!
//! Everything here is deterministic; callers supply `today` and the facts
//! read from storage.

pub mod engine;
pub mod leave_type;
pub mod request;
pub mod seniority;

pub use engine::{AdmissionFacts, admit};
pub use leave_type::{LeaveType, LeaveTypeInput, LeaveTypeSpec};
pub use request::{
    AdminLeaveRequestInput, AdmittedLeaveRequest, CreateLeaveRequest, LeavePeriod, LeaveRequest, LeaveStatus,
    SelfServiceLeaveInput, StatusChange, UpdateLeaveRequest,
};
pub use seniority::{MIN_SENIORITY_MONTHS, check_seniority, months_between};
