use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hrportal_core::{
    DomainError, DomainResult, Entity, UserId, optional_text, require_email, require_text,
    validate_email,
};

use crate::supplied_text;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl Entity for Account {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// Body of `register` and of profile updates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Command: self-registration. New accounts are never admins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl TryFrom<AccountInput> for RegisterAccount {
    type Error = DomainError;

    fn try_from(input: AccountInput) -> DomainResult<Self> {
        Ok(Self {
            name: require_text(input.name, "name")?,
            email: require_email(input.email)?,
            password: require_text(input.password, "password")?,
        })
    }
}

impl RegisterAccount {
    pub fn with_password_hash(self, password_hash: String) -> NewAccount {
        NewAccount { name: self.name, email: self.email, password_hash }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewAccount {
    pub fn into_account(self, id: UserId, created_at: DateTime<Utc>) -> Account {
        Account {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            is_admin: false,
            created_at,
        }
    }
}

/// Command: owner edits their profile; absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateAccount {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<AccountInput> for UpdateAccount {
    type Error = DomainError;

    fn try_from(input: AccountInput) -> DomainResult<Self> {
        Ok(Self {
            name: supplied_text(input.name, "name")?,
            email: input.email.as_deref().map(validate_email).transpose()?,
            password: optional_text(input.password),
        })
    }
}

impl UpdateAccount {
    pub fn with_password_hash(self, password_hash: Option<String>) -> AccountChanges {
        AccountChanges { name: self.name, email: self.email, password_hash }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl AccountChanges {
    pub fn apply(self, account: &mut Account) {
        if let Some(v) = self.name {
            account.name = v;
        }
        if let Some(v) = self.email {
            account.email = v;
        }
        if let Some(v) = self.password_hash {
            account.password_hash = v;
        }
    }
}
