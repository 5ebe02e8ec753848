//! Strongly-typed identifiers used across the domain.
//!
//! Records are keyed by store-assigned positive integers. Each entity gets its
//! own newtype so an employee id can never be passed where a post id is
//! expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Common interface of every record identifier.
pub trait RecordId: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug + core::fmt::Display {
    /// Wrap a raw store key.
    fn from_raw(raw: i64) -> Self;

    /// The raw store key.
    fn raw(self) -> i64;
}

macro_rules! impl_record_id {
    ($t:ident, $name:literal) => {
        #[doc = concat!("Identifier of a ", $name, " record.")]
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(i64);

        impl $t {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl RecordId for $t {
            fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            fn raw(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().parse::<i64>() {
                    Ok(raw) if raw > 0 => Ok(Self(raw)),
                    _ => Err(DomainError::invalid_id(format!("{} id '{}'", $name, s))),
                }
            }
        }
    };
}

impl_record_id!(EmployeeId, "employee");
impl_record_id!(DepartmentId, "department");
impl_record_id!(PostId, "post");
impl_record_id!(LeaveTypeId, "leave type");
impl_record_id!(LeaveRequestId, "leave request");
impl_record_id!(SalaryId, "salary");
impl_record_id!(UserId, "user");
impl_record_id!(ArticleId, "article");
impl_record_id!(CommentId, "comment");
