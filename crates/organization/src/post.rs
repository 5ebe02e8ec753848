use serde::{Deserialize, Serialize};

use hrportal_core::{DepartmentId, DomainError, DomainResult, Entity, LooseId, PostId, require_text};

/// A job title belonging to exactly one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub department_id: DepartmentId,
}

impl Entity for Post {
    type Id = PostId;

    fn id(&self) -> PostId {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    pub title: Option<String>,
    pub department_id: Option<LooseId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSpec {
    pub title: String,
    pub department_id: DepartmentId,
}

impl TryFrom<PostInput> for PostSpec {
    type Error = DomainError;

    fn try_from(input: PostInput) -> DomainResult<Self> {
        Ok(Self {
            title: require_text(input.title, "title")?,
            department_id: LooseId::require(input.department_id.as_ref(), "departmentId")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_payload() {
        let input: PostInput =
            serde_json::from_str(r#"{"title":"Engineer","departmentId":4}"#).unwrap();
        let spec = PostSpec::try_from(input).unwrap();
        assert_eq!(spec.department_id, DepartmentId::new(4));
    }

    #[test]
    fn department_is_required() {
        let input = PostInput { title: Some("Engineer".into()), department_id: None };
        assert!(matches!(PostSpec::try_from(input), Err(DomainError::Validation(_))));
    }
}
