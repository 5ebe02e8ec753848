use hrportal_core::{EmployeeId, UserId};

use crate::claims::{JwtClaims, PrincipalKind};

/// A verified caller identity.
///
/// Built either from the record that just logged in (token issuance) or from
/// decoded claims (token verification). Handlers never take the caller's id
/// from a request body; they read it from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    id: i64,
    kind: PrincipalKind,
    is_admin: bool,
    email: Option<String>,
    name: Option<String>,
}

impl Principal {
    pub fn employee(id: EmployeeId, is_admin: bool, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.get(),
            kind: PrincipalKind::Employee,
            is_admin,
            email: Some(email.into()),
            name: Some(name.into()),
        }
    }

    pub fn account(id: UserId, is_admin: bool, name: impl Into<String>) -> Self {
        Self {
            id: id.get(),
            kind: PrincipalKind::Account,
            is_admin,
            email: None,
            name: Some(name.into()),
        }
    }

    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self {
            id: claims.id,
            kind: claims.kind,
            is_admin: claims.is_admin,
            email: claims.email.clone(),
            name: claims.name.clone(),
        }
    }

    pub(crate) fn to_claims(&self, iat: i64, exp: i64) -> JwtClaims {
        JwtClaims {
            id: self.id,
            kind: self.kind,
            email: self.email.clone(),
            name: self.name.clone(),
            is_admin: self.is_admin,
            iat,
            exp,
        }
    }

    pub fn raw_id(&self) -> i64 {
        self.id
    }

    pub fn kind(&self) -> PrincipalKind {
        self.kind
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The employee record behind this principal, if it is an employee.
    pub fn employee_id(&self) -> Option<EmployeeId> {
        match self.kind {
            PrincipalKind::Employee => Some(EmployeeId::new(self.id)),
            PrincipalKind::Account => None,
        }
    }

    /// The account record behind this principal, if it is an account.
    pub fn user_id(&self) -> Option<UserId> {
        match self.kind {
            PrincipalKind::Account => Some(UserId::new(self.id)),
            PrincipalKind::Employee => None,
        }
    }
}
