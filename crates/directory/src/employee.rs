use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use hrportal_core::{
    DomainError, DomainResult, EmployeeId, Entity, LooseId, PostId, optional_text, parse_date,
    require_date, require_email, require_text, validate_email,
};

/// A person employed by the organization and able to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub post_id: PostId,
    pub hire_date: NaiveDate,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

impl Entity for Employee {
    type Id = EmployeeId;

    fn id(&self) -> EmployeeId {
        self.id
    }
}

/// Raw employee payload as posted by the admin console.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub post_id: Option<LooseId>,
    #[serde(alias = "datedebut")]
    pub hire_date: Option<String>,
    pub is_admin: Option<bool>,
}

/// Raw payload of an employee editing their own profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

fn supplied_text(value: Option<String>, field: &str) -> DomainResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) => require_text(Some(v), field).map(Some),
    }
}

/// Command: create an employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEmployee {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub post_id: PostId,
    pub hire_date: NaiveDate,
    pub is_admin: bool,
}

impl TryFrom<EmployeeInput> for CreateEmployee {
    type Error = DomainError;

    fn try_from(input: EmployeeInput) -> DomainResult<Self> {
        Ok(Self {
            firstname: require_text(input.firstname, "firstname")?,
            lastname: require_text(input.lastname, "lastname")?,
            email: require_email(input.email)?,
            password: require_text(input.password, "password")?,
            phone: optional_text(input.phone),
            address: optional_text(input.address),
            post_id: LooseId::require(input.post_id.as_ref(), "postId")?,
            hire_date: require_date(input.hire_date.as_deref(), "hireDate")?,
            is_admin: input.is_admin.unwrap_or(false),
        })
    }
}

impl CreateEmployee {
    /// Swap the plaintext password for its stored hash.
    pub fn with_password_hash(self, password_hash: String) -> NewEmployee {
        NewEmployee {
            firstname: self.firstname,
            lastname: self.lastname,
            email: self.email,
            phone: self.phone,
            address: self.address,
            password_hash,
            post_id: self.post_id,
            hire_date: self.hire_date,
            is_admin: self.is_admin,
        }
    }
}

/// An employee ready to be stored (password already hashed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub password_hash: String,
    pub post_id: PostId,
    pub hire_date: NaiveDate,
    pub is_admin: bool,
}

impl NewEmployee {
    pub fn into_employee(self, id: EmployeeId, created_at: DateTime<Utc>) -> Employee {
        Employee {
            id,
            firstname: self.firstname,
            lastname: self.lastname,
            email: self.email,
            phone: self.phone,
            address: self.address,
            password_hash: self.password_hash,
            post_id: self.post_id,
            hire_date: self.hire_date,
            is_admin: self.is_admin,
            created_at,
        }
    }
}

/// Command: partially update an employee.
///
/// Absent fields keep their stored value. Supplied fields are validated the
/// same way as on creation. A blank `phone` or `address` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateEmployee {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub post_id: Option<PostId>,
    pub hire_date: Option<NaiveDate>,
    pub is_admin: Option<bool>,
}

impl TryFrom<EmployeeInput> for UpdateEmployee {
    type Error = DomainError;

    fn try_from(input: EmployeeInput) -> DomainResult<Self> {
        Ok(Self {
            firstname: supplied_text(input.firstname, "firstname")?,
            lastname: supplied_text(input.lastname, "lastname")?,
            email: input.email.as_deref().map(validate_email).transpose()?,
            password: optional_text(input.password),
            phone: input.phone.map(|v| optional_text(Some(v))),
            address: input.address.map(|v| optional_text(Some(v))),
            post_id: input.post_id.map(|id| id.parse("postId")).transpose()?,
            hire_date: input
                .hire_date
                .map(|d| parse_date(&d, "hireDate"))
                .transpose()?,
            is_admin: input.is_admin,
        })
    }
}

impl TryFrom<ProfileInput> for UpdateEmployee {
    type Error = DomainError;

    /// Owners may edit contact details and password, never post, hire date
    /// or admin flag.
    fn try_from(input: ProfileInput) -> DomainResult<Self> {
        Ok(Self {
            firstname: supplied_text(input.firstname, "firstname")?,
            lastname: supplied_text(input.lastname, "lastname")?,
            email: input.email.as_deref().map(validate_email).transpose()?,
            password: optional_text(input.password),
            phone: input.phone.map(|v| optional_text(Some(v))),
            address: input.address.map(|v| optional_text(Some(v))),
            ..Self::default()
        })
    }
}

impl UpdateEmployee {
    /// Replace the plaintext password (if any) with its hash.
    pub fn with_password_hash(self, password_hash: Option<String>) -> EmployeeChanges {
        EmployeeChanges {
            firstname: self.firstname,
            lastname: self.lastname,
            email: self.email,
            password_hash,
            phone: self.phone,
            address: self.address,
            post_id: self.post_id,
            hire_date: self.hire_date,
            is_admin: self.is_admin,
        }
    }
}

/// A validated partial update ready for the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeChanges {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub post_id: Option<PostId>,
    pub hire_date: Option<NaiveDate>,
    pub is_admin: Option<bool>,
}

impl EmployeeChanges {
    pub fn apply(self, employee: &mut Employee) {
        if let Some(v) = self.firstname {
            employee.firstname = v;
        }
        if let Some(v) = self.lastname {
            employee.lastname = v;
        }
        if let Some(v) = self.email {
            employee.email = v;
        }
        if let Some(v) = self.password_hash {
            employee.password_hash = v;
        }
        if let Some(v) = self.phone {
            employee.phone = v;
        }
        if let Some(v) = self.address {
            employee.address = v;
        }
        if let Some(v) = self.post_id {
            employee.post_id = v;
        }
        if let Some(v) = self.hire_date {
            employee.hire_date = v;
        }
        if let Some(v) = self.is_admin {
            employee.is_admin = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_input() -> EmployeeInput {
        serde_json::from_value(serde_json::json!({
            "firstname": "Ada",
            "lastname": "Lovelace",
            "email": "ada@hr.test",
            "password": "s3cret",
            "postId": "3",
            "datedebut": "2024-01-10",
        }))
        .unwrap()
    }

    fn stored() -> Employee {
        CreateEmployee::try_from(full_input())
            .unwrap()
            .with_password_hash("hash".into())
            .into_employee(EmployeeId::new(1), Utc::now())
    }

    #[test]
    fn create_accepts_legacy_hire_date_key_and_string_ids() {
        let cmd = CreateEmployee::try_from(full_input()).unwrap();
        assert_eq!(cmd.post_id, PostId::new(3));
        assert_eq!(cmd.hire_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert!(!cmd.is_admin);
    }

    #[test]
    fn create_requires_hire_date_and_password() {
        let mut input = full_input();
        input.hire_date = None;
        assert!(matches!(CreateEmployee::try_from(input), Err(DomainError::Validation(_))));

        let mut input = full_input();
        input.password = Some("  ".into());
        assert!(CreateEmployee::try_from(input).is_err());
    }

    #[test]
    fn create_rejects_malformed_email() {
        let mut input = full_input();
        input.email = Some("not-an-email".into());
        assert!(CreateEmployee::try_from(input).is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let json = serde_json::to_value(stored()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["hireDate"], "2024-01-10");
        assert_eq!(json["postId"], 3);
    }

    #[test]
    fn partial_update_keeps_absent_fields() {
        let mut employee = stored();
        let update = UpdateEmployee::try_from(EmployeeInput {
            lastname: Some("Byron".into()),
            phone: Some("".into()),
            ..EmployeeInput::default()
        })
        .unwrap();

        update.with_password_hash(None).apply(&mut employee);

        assert_eq!(employee.firstname, "Ada");
        assert_eq!(employee.lastname, "Byron");
        assert_eq!(employee.password_hash, "hash");
        assert_eq!(employee.phone, None);
    }

    #[test]
    fn profile_update_cannot_touch_post_or_admin_flag() {
        let update = UpdateEmployee::try_from(ProfileInput {
            email: Some("new@hr.test".into()),
            ..ProfileInput::default()
        })
        .unwrap();
        assert_eq!(update.post_id, None);
        assert_eq!(update.is_admin, None);
        assert_eq!(update.hire_date, None);
    }

    #[test]
    fn supplied_blank_required_field_is_rejected() {
        let result = UpdateEmployee::try_from(EmployeeInput {
            firstname: Some(" ".into()),
            ..EmployeeInput::default()
        });
        assert!(result.is_err());
    }
}
