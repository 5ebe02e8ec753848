//! Accounts, articles and comments.
//!
//! Accounts are self-registered users independent of the employee directory.
//! They own the articles and comments they write.

pub mod account;
pub mod article;
pub mod comment;

pub use account::{Account, AccountChanges, AccountInput, NewAccount, RegisterAccount, UpdateAccount};
pub use article::{Article, ArticleChanges, ArticleInput, ArticleSpec};
pub use comment::{Comment, CommentInput, CreateComment, UpdateComment};

/// Treat a supplied field as required-if-present.
fn supplied_text(value: Option<String>, field: &str) -> hrportal_core::DomainResult<Option<String>> {
    value.map(|v| hrportal_core::require_text(Some(v), field)).transpose()
}
