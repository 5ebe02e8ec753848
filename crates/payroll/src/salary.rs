use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hrportal_core::{DomainError, DomainResult, EmployeeId, Entity, LooseId, SalaryId};

/// A salary amount recorded for an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Salary {
    pub id: SalaryId,
    pub amount: Decimal,
    pub employee_id: EmployeeId,
}

impl Entity for Salary {
    type Id = SalaryId;

    fn id(&self) -> SalaryId {
        self.id
    }
}

/// A monetary amount as sent by clients: a JSON number or a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(Decimal),
    Text(String),
}

impl Amount {
    fn parse(&self) -> DomainResult<Decimal> {
        let value = match self {
            Amount::Number(d) => *d,
            Amount::Text(s) => Decimal::from_str(s.trim())
                .map_err(|_| DomainError::validation("amount must be a decimal number"))?,
        };
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::validation("amount must not be negative"));
        }
        Ok(value)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryInput {
    pub amount: Option<Amount>,
    pub employee_id: Option<LooseId>,
}

/// Command: record (or fully replace) a salary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSalary {
    pub amount: Decimal,
    pub employee_id: EmployeeId,
}

impl TryFrom<SalaryInput> for RecordSalary {
    type Error = DomainError;

    fn try_from(input: SalaryInput) -> DomainResult<Self> {
        let amount = input
            .amount
            .as_ref()
            .ok_or_else(|| DomainError::validation("amount is required"))?
            .parse()?;
        let employee_id = LooseId::require(input.employee_id.as_ref(), "employeeId")?;
        Ok(Self { amount, employee_id })
    }
}

impl RecordSalary {
    pub fn into_salary(self, id: SalaryId) -> Salary {
        Salary { id, amount: self.amount, employee_id: self.employee_id }
    }
}
