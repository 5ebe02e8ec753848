//! Infrastructure layer: configuration and persistence.

pub mod config;
pub mod store;

pub use config::{AppConfig, BootstrapAdmin, ConfigError, StoreBackend};
pub use store::{
    AccountStore, ContentStore, EmployeeStore, HrStore, InMemoryStore, LeaveStore,
    OrganizationStore, PostgresStore, SalaryStore, StoreError, StoreResult,
};
