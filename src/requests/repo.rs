use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::Direction;
use super::lifecycle::RequestStatus;

/// Swap request joined with both participants' display fields.
#[derive(Debug, Clone, FromRow)]
pub struct SwapRequestDetail {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub skill_requested: String,
    pub skill_offered: String,
    pub message: Option<String>,
    pub status: RequestStatus,
    pub meeting_date: Option<OffsetDateTime>,
    pub meeting_time: Option<String>,
    pub meeting_location: Option<String>,
    pub meeting_notes: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub sender_full_name: String,
    pub sender_username: String,
    pub sender_avatar: String,
    pub recipient_full_name: String,
    pub recipient_username: String,
    pub recipient_avatar: String,
}

const DETAIL_SELECT: &str = "SELECT \
     r.id, r.sender_id, r.recipient_id, r.skill_requested, r.skill_offered, \
     r.message, r.status, r.meeting_date, r.meeting_time, r.meeting_location, \
     r.meeting_notes, r.created_at, r.updated_at, \
     s.full_name AS sender_full_name, s.username AS sender_username, s.avatar AS sender_avatar, \
     t.full_name AS recipient_full_name, t.username AS recipient_username, t.avatar AS recipient_avatar \
     FROM swap_requests r \
     JOIN users s ON s.id = r.sender_id \
     JOIN users t ON t.id = r.recipient_id";

pub async fn exists_pending(
    db: &PgPool,
    sender_id: Uuid,
    recipient_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS ( \
            SELECT 1 FROM swap_requests \
            WHERE sender_id = $1 AND recipient_id = $2 AND status = 'pending' \
         )",
    )
    .bind(sender_id)
    .bind(recipient_id)
    .fetch_one(db)
    .await
}

pub async fn insert(
    db: &PgPool,
    sender_id: Uuid,
    recipient_id: Uuid,
    skill_requested: &str,
    skill_offered: &str,
    message: Option<&str>,
) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO swap_requests \
            (sender_id, recipient_id, skill_requested, skill_offered, message) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id",
    )
    .bind(sender_id)
    .bind(recipient_id)
    .bind(skill_requested)
    .bind(skill_offered)
    .bind(message)
    .fetch_one(db)
    .await
}

pub async fn find_detail(
    db: &PgPool,
    id: Uuid,
) -> Result<Option<SwapRequestDetail>, sqlx::Error> {
    let query = format!("{DETAIL_SELECT} WHERE r.id = $1");
    sqlx::query_as::<_, SwapRequestDetail>(&query)
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Atomically moves a pending request to `status`. Returns false when the
/// request is no longer pending (a concurrent transition won).
pub async fn transition_pending(
    db: &PgPool,
    id: Uuid,
    status: RequestStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE swap_requests \
         SET status = $2, updated_at = now() \
         WHERE id = $1 AND status = 'pending'",
    )
    .bind(id)
    .bind(status)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

fn push_list_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    user_id: Uuid,
    direction: Direction,
    status: Option<RequestStatus>,
) {
    match direction {
        Direction::Sent => {
            qb.push(" WHERE r.sender_id = ").push_bind(user_id);
        }
        Direction::Received => {
            qb.push(" WHERE r.recipient_id = ").push_bind(user_id);
        }
        Direction::All => {
            qb.push(" WHERE (r.sender_id = ")
                .push_bind(user_id)
                .push(" OR r.recipient_id = ")
                .push_bind(user_id)
                .push(")");
        }
    }
    if let Some(status) = status {
        qb.push(" AND r.status = ").push_bind(status);
    }
}

pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    direction: Direction,
    status: Option<RequestStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<SwapRequestDetail>, sqlx::Error> {
    let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(DETAIL_SELECT);
    push_list_filters(&mut qb, user_id, direction, status);
    qb.push(" ORDER BY r.created_at DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    qb.build_query_as::<SwapRequestDetail>().fetch_all(db).await
}

pub async fn count(
    db: &PgPool,
    user_id: Uuid,
    direction: Direction,
    status: Option<RequestStatus>,
) -> Result<i64, sqlx::Error> {
    let mut qb: QueryBuilder<'_, Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM swap_requests r");
    push_list_filters(&mut qb, user_id, direction, status);
    qb.build_query_scalar::<i64>().fetch_one(db).await
}
