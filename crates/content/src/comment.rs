use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hrportal_core::{ArticleId, CommentId, DomainError, DomainResult, Entity, LooseId, UserId, require_text};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub user_id: UserId,
    pub article_id: ArticleId,
    pub created_at: DateTime<Utc>,
}

impl Entity for Comment {
    type Id = CommentId;

    fn id(&self) -> CommentId {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInput {
    pub content: Option<String>,
    pub article_id: Option<LooseId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateComment {
    pub content: String,
    pub article_id: ArticleId,
}

impl TryFrom<CommentInput> for CreateComment {
    type Error = DomainError;

    fn try_from(input: CommentInput) -> DomainResult<Self> {
        Ok(Self {
            content: require_text(input.content, "content")?,
            article_id: LooseId::require(input.article_id.as_ref(), "articleId")?,
        })
    }
}

impl CreateComment {
    pub fn into_comment(self, id: CommentId, user_id: UserId, created_at: DateTime<Utc>) -> Comment {
        Comment { id, content: self.content, user_id, article_id: self.article_id, created_at }
    }
}

/// Only the text of a comment can change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateComment {
    pub content: String,
}

impl TryFrom<CommentInput> for UpdateComment {
    type Error = DomainError;

    fn try_from(input: CommentInput) -> DomainResult<Self> {
        Ok(Self { content: require_text(input.content, "content")? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_needs_article_reference() {
        let input: CommentInput = serde_json::from_str(r#"{"content":"Nice"}"#).unwrap();
        assert!(CreateComment::try_from(input).is_err());

        let input: CommentInput = serde_json::from_str(r#"{"content":"Nice","articleId":"3"}"#).unwrap();
        assert_eq!(CreateComment::try_from(input).unwrap().article_id, ArticleId::new(3));
    }

    #[test]
    fn update_ignores_article_reference() {
        let input: CommentInput = serde_json::from_str(r#"{"content":"Edited","articleId":9}"#).unwrap();
        assert_eq!(UpdateComment::try_from(input).unwrap().content, "Edited");
    }
}
