use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hrportal_core::{ArticleId, DomainError, DomainResult, Entity, UserId, require_text};

use crate::supplied_text;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub description: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Entity for Article {
    type Id = ArticleId;

    fn id(&self) -> ArticleId {
        self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleInput {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Validated article body for creation. The author comes from the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSpec {
    pub title: String,
    pub description: String,
}

impl TryFrom<ArticleInput> for ArticleSpec {
    type Error = DomainError;

    fn try_from(input: ArticleInput) -> DomainResult<Self> {
        Ok(Self {
            title: require_text(input.title, "title")?,
            description: require_text(input.description, "description")?,
        })
    }
}

impl ArticleSpec {
    pub fn into_article(self, id: ArticleId, user_id: UserId, created_at: DateTime<Utc>) -> Article {
        Article { id, title: self.title, description: self.description, user_id, created_at }
    }
}

/// Partial article edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl TryFrom<ArticleInput> for ArticleChanges {
    type Error = DomainError;

    fn try_from(input: ArticleInput) -> DomainResult<Self> {
        Ok(Self {
            title: supplied_text(input.title, "title")?,
            description: supplied_text(input.description, "description")?,
        })
    }
}

impl ArticleChanges {
    pub fn apply(self, article: &mut Article) {
        if let Some(v) = self.title {
            article.title = v;
        }
        if let Some(v) = self.description {
            article.description = v;
        }
    }
}
