//! Authorization policy over a verified [`Principal`].
//!
//! There is exactly one permission dimension (the admin flag) plus
//! record ownership. No IO, no panics.

use thiserror::Error;

use hrportal_core::{EmployeeId, UserId};

use crate::{Principal, PrincipalKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("only admin access")]
    AdminRequired,

    #[error("{0}")]
    AdminNotAllowed(&'static str),

    #[error("this operation requires an {0} credential")]
    WrongKind(PrincipalKind),

    #[error("access denied: not the owner of this record")]
    NotOwner,
}

/// Admin-only gate.
pub fn require_admin(principal: &Principal) -> Result<(), AuthzError> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::AdminRequired)
    }
}

/// Self-service gate: a non-admin employee acting on their own records.
///
/// `admin_message` explains why admins are turned away from this path.
pub fn require_employee(principal: &Principal, admin_message: &'static str) -> Result<EmployeeId, AuthzError> {
    let id = principal
        .employee_id()
        .ok_or(AuthzError::WrongKind(PrincipalKind::Employee))?;
    if principal.is_admin() {
        return Err(AuthzError::AdminNotAllowed(admin_message));
    }
    Ok(id)
}

/// Account-only gate (article/comment strand).
pub fn require_account(principal: &Principal) -> Result<UserId, AuthzError> {
    principal
        .user_id()
        .ok_or(AuthzError::WrongKind(PrincipalKind::Account))
}

/// Ownership gate: the caller must be the record itself (`callerId == recordId`),
/// regardless of the admin flag.
pub fn require_self(principal: &Principal, kind: PrincipalKind, record_id: i64) -> Result<(), AuthzError> {
    if principal.kind() == kind && principal.raw_id() == record_id {
        Ok(())
    } else {
        Err(AuthzError::NotOwner)
    }
}

/// Authorship gate: the content's author, or any admin.
pub fn require_author_or_admin(principal: &Principal, author: UserId) -> Result<(), AuthzError> {
    if principal.is_admin() || principal.user_id() == Some(author) {
        Ok(())
    } else {
        Err(AuthzError::NotOwner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(id: i64, is_admin: bool) -> Principal {
        Principal::employee(EmployeeId::new(id), is_admin, "e@hr.test", "E Mployee")
    }

    #[test]
    fn admin_gate_checks_flag_only() {
        assert!(require_admin(&employee(1, true)).is_ok());
        assert_eq!(require_admin(&employee(1, false)), Err(AuthzError::AdminRequired));
        assert!(require_admin(&Principal::account(UserId::new(1), true, "root")).is_ok());
    }

    #[test]
    fn self_service_rejects_admins_and_accounts() {
        assert_eq!(require_employee(&employee(4, false), "no").unwrap(), EmployeeId::new(4));
        assert_eq!(
            require_employee(&employee(4, true), "admins cannot do this"),
            Err(AuthzError::AdminNotAllowed("admins cannot do this"))
        );
        let account = Principal::account(UserId::new(4), false, "reader");
        assert_eq!(
            require_employee(&account, "no"),
            Err(AuthzError::WrongKind(PrincipalKind::Employee))
        );
    }

    #[test]
    fn self_gate_compares_kind_and_id() {
        let p = employee(9, true);
        assert!(require_self(&p, PrincipalKind::Employee, 9).is_ok());
        assert_eq!(require_self(&p, PrincipalKind::Employee, 10), Err(AuthzError::NotOwner));
        // Same number in the other table is a different record.
        assert_eq!(require_self(&p, PrincipalKind::Account, 9), Err(AuthzError::NotOwner));
    }

    #[test]
    fn author_or_admin() {
        let author = Principal::account(UserId::new(3), false, "writer");
        let other = Principal::account(UserId::new(5), false, "reader");
        assert!(require_author_or_admin(&author, UserId::new(3)).is_ok());
        assert!(require_author_or_admin(&other, UserId::new(3)).is_err());
        assert!(require_author_or_admin(&employee(1, true), UserId::new(3)).is_ok());
    }
}
