//! Organizational structure: departments and the job posts inside them.

pub mod department;
pub mod post;

pub use department::{Department, DepartmentInput, DepartmentSpec};
pub use post::{Post, PostInput, PostSpec};
