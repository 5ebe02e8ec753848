//! Employee directory domain module.
//!
//! Employee records and the commands that create or change them. Pure
//! validation logic: password hashing and persistence happen in the callers.

pub mod employee;

pub use employee::{
    CreateEmployee, Employee, EmployeeChanges, EmployeeInput, NewEmployee, ProfileInput,
    UpdateEmployee,
};
