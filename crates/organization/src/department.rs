use serde::{Deserialize, Serialize};

use hrportal_core::{DepartmentId, DomainError, DomainResult, Entity, require_text};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

impl Entity for Department {
    type Id = DepartmentId;

    fn id(&self) -> DepartmentId {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepartmentInput {
    pub name: Option<String>,
}

/// Validated department attributes, used for both create and full update.
///
/// Names are not required to be unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentSpec {
    pub name: String,
}

impl TryFrom<DepartmentInput> for DepartmentSpec {
    type Error = DomainError;

    fn try_from(input: DepartmentInput) -> DomainResult<Self> {
        Ok(Self {
            name: require_text(input.name, "name")?,
        })
    }
}
