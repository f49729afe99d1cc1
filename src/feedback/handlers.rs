use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::jwt::AuthUser;
use crate::errors::{conflict_on_unique, ApiError};
use crate::extract::ValidJson;
use crate::response::{page_and_limit, ApiResponse, Pagination};
use crate::state::AppState;

use super::dto::{FeedbackListParams, FeedbackResponse, SubmitFeedbackRequest};
use super::repo;

const DUPLICATE_FEEDBACK: &str = "Feedback already submitted for this swap request";

/// POST /api/feedback — one feedback per (swap request, reviewer) pair.
#[instrument(skip(state, body))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    AuthUser(reviewer_id): AuthUser,
    ValidJson(body): ValidJson<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FeedbackResponse>>), ApiError> {
    let skill_taught = body.skill_taught.trim().to_lowercase();
    if skill_taught.is_empty() {
        return Err(ApiError::bad_request("Skill taught is required"));
    }
    let categories: Vec<String> = body.categories.iter().map(|c| c.to_lowercase()).collect();
    let comment = body
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    // Fast path; the unique index resolves submit/submit races.
    if repo::exists_for_request(&state.db, body.swap_request_id, reviewer_id).await? {
        return Err(ApiError::conflict(DUPLICATE_FEEDBACK));
    }

    let id = repo::insert(
        &state.db,
        reviewer_id,
        body.reviewed_id,
        body.swap_request_id,
        body.rating,
        comment,
        &skill_taught,
        &categories,
    )
    .await
    .map_err(|e| {
        let code = e
            .as_database_error()
            .and_then(|db| db.code())
            .map(|c| c.into_owned());
        match code.as_deref() {
            // Dangling references surface as FK violations here.
            Some("23503") => ApiError::not_found("Swap request or user not found"),
            _ => conflict_on_unique(e, DUPLICATE_FEEDBACK),
        }
    })?;

    let detail = repo::find_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("created feedback {id} not found")))?;

    info!(feedback_id = %id, reviewer = %reviewer_id, "feedback submitted");
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            FeedbackResponse::from(detail),
            "Feedback submitted successfully",
        ),
    ))
}

/// GET /api/feedback/user/:userId — feedback received by a user, newest first.
#[instrument(skip(state))]
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<FeedbackListParams>,
) -> Result<Json<ApiResponse<Vec<FeedbackResponse>>>, ApiError> {
    let (page, limit) = page_and_limit(params.page, params.limit);

    let total = repo::count_for_user(&state.db, user_id).await?;
    let pagination = Pagination::new(page, limit, total);
    let rows = repo::list_for_user(&state.db, user_id, limit, pagination.offset()).await?;

    let data = rows.into_iter().map(FeedbackResponse::from).collect();
    Ok(ApiResponse::page(data, pagination))
}
