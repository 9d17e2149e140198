//! Roster source DTOs
//!
//! Typed shapes for what the CRUD layer hands to a presentation session, plus
//! the input schemas it validates before writing.

use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::roster::Item;

/// Projects not opened for this many days are eligible for cleanup
pub const PROJECT_RETENTION_DAYS: i64 = 30;

/// A stored project as returned by the roster source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    pub id: String,
    pub template_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<Item>,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
}

impl ProjectData {
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now - self.last_accessed_at > Duration::days(PROJECT_RETENTION_DAYS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    #[validate(length(min = 1))]
    pub template_id: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: String,
    #[validate(range(min = 0))]
    pub order: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub order: Option<i64>,
    #[validate(url)]
    pub image_url: Option<String>,
}

impl UpdateItemInput {
    /// Apply the present fields to `item`
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(order) = self.order {
            item.order = order;
        }
        if let Some(image_url) = &self.image_url {
            item.image_url = image_url.clone();
        }
    }
}

/// Path parameters of an image upload. Item ids may still be temporary.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadInput {
    #[validate(custom = "validate_uuid")]
    pub project_id: String,
    #[validate(length(min = 1))]
    pub item_id: String,
}

fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    uuid::Uuid::parse_str(value).map(|_| ()).map_err(|_| ValidationError::new("uuid"))
}

/// Response envelope used by the CRUD API
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None, message: None }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()), message: None }
    }
}
