//! Salary ledger.

pub mod salary;

pub use salary::{Amount, RecordSalary, Salary, SalaryInput};
