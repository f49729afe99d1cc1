use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Feedback row joined with the reviewer's display fields.
#[derive(Debug, Clone, FromRow)]
pub struct FeedbackDetail {
    pub id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewed_id: Uuid,
    pub swap_request_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub skill_taught: String,
    pub categories: Vec<String>,
    pub created_at: OffsetDateTime,
    pub reviewer_full_name: String,
    pub reviewer_username: String,
    pub reviewer_avatar: String,
}

const DETAIL_SELECT: &str = "SELECT \
     f.id, f.reviewer_id, f.reviewed_id, f.swap_request_id, f.rating, f.comment, \
     f.skill_taught, f.categories, f.created_at, \
     u.full_name AS reviewer_full_name, u.username AS reviewer_username, u.avatar AS reviewer_avatar \
     FROM feedback f \
     JOIN users u ON u.id = f.reviewer_id";

pub async fn exists_for_request(
    db: &PgPool,
    swap_request_id: Uuid,
    reviewer_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS ( \
            SELECT 1 FROM feedback \
            WHERE swap_request_id = $1 AND reviewer_id = $2 \
         )",
    )
    .bind(swap_request_id)
    .bind(reviewer_id)
    .fetch_one(db)
    .await
}

#[allow(clippy::too_many_arguments)]
pub async fn insert(
    db: &PgPool,
    reviewer_id: Uuid,
    reviewed_id: Uuid,
    swap_request_id: Uuid,
    rating: i32,
    comment: Option<&str>,
    skill_taught: &str,
    categories: &[String],
) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO feedback \
            (reviewer_id, reviewed_id, swap_request_id, rating, comment, skill_taught, categories) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id",
    )
    .bind(reviewer_id)
    .bind(reviewed_id)
    .bind(swap_request_id)
    .bind(rating)
    .bind(comment)
    .bind(skill_taught)
    .bind(categories)
    .fetch_one(db)
    .await
}

pub async fn find_detail(db: &PgPool, id: Uuid) -> Result<Option<FeedbackDetail>, sqlx::Error> {
    let query = format!("{DETAIL_SELECT} WHERE f.id = $1");
    sqlx::query_as::<_, FeedbackDetail>(&query)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list_for_user(
    db: &PgPool,
    reviewed_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<FeedbackDetail>, sqlx::Error> {
    let query = format!(
        "{DETAIL_SELECT} WHERE f.reviewed_id = $1 \
         ORDER BY f.created_at DESC LIMIT $2 OFFSET $3"
    );
    sqlx::query_as::<_, FeedbackDetail>(&query)
        .bind(reviewed_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
}

pub async fn count_for_user(db: &PgPool, reviewed_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM feedback WHERE reviewed_id = $1")
        .bind(reviewed_id)
        .fetch_one(db)
        .await
}
