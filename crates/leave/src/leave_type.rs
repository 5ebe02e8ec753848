use serde::{Deserialize, Serialize};

use hrportal_core::{DomainError, DomainResult, Entity, LeaveTypeId, require_text};

/// A named category of leave with a maximum yearly allotment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveType {
    pub id: LeaveTypeId,
    pub name: String,
    pub max_days: i32,
    pub carry_forward: bool,
}

impl Entity for LeaveType {
    type Id = LeaveTypeId;

    fn id(&self) -> LeaveTypeId {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveTypeInput {
    pub name: Option<String>,
    pub max_days: Option<i64>,
    pub carry_forward: Option<bool>,
}

/// Validated leave type attributes. Updates replace every field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveTypeSpec {
    pub name: String,
    pub max_days: i32,
    pub carry_forward: bool,
}

impl TryFrom<LeaveTypeInput> for LeaveTypeSpec {
    type Error = DomainError;

    fn try_from(input: LeaveTypeInput) -> DomainResult<Self> {
        let name = require_text(input.name, "name")?;
        let max_days = input
            .max_days
            .ok_or_else(|| DomainError::validation("maxDays is required"))?;
        let max_days = i32::try_from(max_days)
            .ok()
            .filter(|days| *days >= 0)
            .ok_or_else(|| DomainError::validation("maxDays must be a non-negative integer"))?;

        Ok(Self {
            name,
            max_days,
            carry_forward: input.carry_forward.unwrap_or(false),
        })
    }
}

impl LeaveTypeSpec {
    pub fn into_leave_type(self, id: LeaveTypeId) -> LeaveType {
        LeaveType {
            id,
            name: self.name,
            max_days: self.max_days,
            carry_forward: self.carry_forward,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(max_days: Option<i64>) -> LeaveTypeInput {
        LeaveTypeInput { name: Some("Annual".into()), max_days, carry_forward: None }
    }

    #[test]
    fn carry_forward_defaults_to_false() {
        let spec = LeaveTypeSpec::try_from(input(Some(25))).unwrap();
        assert_eq!(spec.max_days, 25);
        assert!(!spec.carry_forward);
    }

    #[test]
    fn zero_days_is_allowed() {
        assert!(LeaveTypeSpec::try_from(input(Some(0))).is_ok());
    }

    #[test]
    fn negative_or_missing_days_are_rejected() {
        assert!(LeaveTypeSpec::try_from(input(Some(-1))).is_err());
        assert!(LeaveTypeSpec::try_from(input(None)).is_err());
        assert!(LeaveTypeSpec::try_from(input(Some(i64::MAX))).is_err());
    }
}
