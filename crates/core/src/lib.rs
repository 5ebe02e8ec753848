//! `hrportal-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every HR module
//! (no storage, no HTTP).

pub mod entity;
pub mod error;
pub mod id;
pub mod input;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    ArticleId, CommentId, DepartmentId, EmployeeId, LeaveRequestId, LeaveTypeId, PostId,
    RecordId, SalaryId, UserId,
};
pub use input::{
    LooseId, optional_text, parse_date, require_date, require_email, require_text, validate_email,
};
