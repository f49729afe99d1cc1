use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::users::dto::UserSummary;

use super::repo::FeedbackDetail;

/// Fixed category vocabulary for post-swap feedback.
pub const CATEGORIES: [&str; 5] = [
    "communication",
    "punctuality",
    "knowledge",
    "patience",
    "flexibility",
];

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackRequest {
    pub swap_request_id: Uuid,
    pub reviewed_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(max = 500, message = "Comment cannot exceed 500 characters"))]
    pub comment: Option<String>,
    #[validate(length(min = 1, message = "Skill taught is required"))]
    pub skill_taught: String,
    #[serde(default)]
    #[validate(custom(function = validate_categories))]
    pub categories: Vec<String>,
}

fn validate_categories(categories: &Vec<String>) -> Result<(), ValidationError> {
    for category in categories {
        if !CATEGORIES.contains(&category.to_lowercase().as_str()) {
            return Err(ValidationError::new("feedback_category")
                .with_message(format!("Unknown category: {category}").into()));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct FeedbackListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub id: Uuid,
    pub reviewer: UserSummary,
    pub reviewed_id: Uuid,
    pub swap_request_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub skill_taught: String,
    pub categories: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<FeedbackDetail> for FeedbackResponse {
    fn from(row: FeedbackDetail) -> Self {
        Self {
            id: row.id,
            reviewer: UserSummary {
                id: row.reviewer_id,
                full_name: row.reviewer_full_name,
                username: row.reviewer_username,
                avatar: row.reviewer_avatar,
            },
            reviewed_id: row.reviewed_id,
            swap_request_id: row.swap_request_id,
            rating: row.rating,
            comment: row.comment,
            skill_taught: row.skill_taught,
            categories: row.categories,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(rating: i32, categories: &[&str]) -> SubmitFeedbackRequest {
        SubmitFeedbackRequest {
            swap_request_id: Uuid::new_v4(),
            reviewed_id: Uuid::new_v4(),
            rating,
            comment: None,
            skill_taught: "guitar".into(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn rating_bounds_enforced() {
        assert!(request(0, &[]).validate().is_err());
        assert!(request(6, &[]).validate().is_err());
        assert!(request(1, &[]).validate().is_ok());
        assert!(request(5, &[]).validate().is_ok());
    }

    #[test]
    fn categories_limited_to_vocabulary() {
        assert!(request(4, &["patience", "knowledge"]).validate().is_ok());
        assert!(request(4, &["Punctuality"]).validate().is_ok());
        assert!(request(4, &["speed"]).validate().is_err());
    }

    #[test]
    fn long_comment_rejected() {
        let mut body = request(3, &[]);
        body.comment = Some("x".repeat(501));
        assert!(body.validate().is_err());
    }
}
