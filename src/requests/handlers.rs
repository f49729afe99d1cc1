use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::jwt::AuthUser;
use crate::errors::{conflict_on_unique, ApiError};
use crate::extract::ValidJson;
use crate::response::{page_and_limit, ApiResponse, Pagination};
use crate::state::AppState;
use crate::users::repo as users_repo;

use super::dto::{CreateSwapRequest, ListParams, SwapRequestResponse, UpdateStatusRequest};
use super::lifecycle::{check_create, check_transition, role_of};
use super::repo;

const DUPLICATE_PENDING: &str = "You already have a pending request with this user";

/// POST /api/requests — preconditions checked in order, first failure wins:
/// recipient exists and is public, recipient is not the sender, recipient
/// offers the requested skill, sender offers the offered skill, no pending
/// request already exists for this ordered pair.
#[instrument(skip(state, body))]
pub async fn create_request(
    State(state): State<AppState>,
    AuthUser(sender_id): AuthUser,
    ValidJson(body): ValidJson<CreateSwapRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SwapRequestResponse>>), ApiError> {
    let skill_requested = body.skill_requested.trim().to_lowercase();
    let skill_offered = body.skill_offered.trim().to_lowercase();
    if skill_requested.is_empty() {
        return Err(ApiError::bad_request("Skill requested is required"));
    }
    if skill_offered.is_empty() {
        return Err(ApiError::bad_request("Skill offered is required"));
    }

    let recipient = users_repo::find_public_by_id(&state.db, body.recipient_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipient not found or profile is private"))?;

    let sender = users_repo::find_by_id(&state.db, sender_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    check_create(
        sender_id,
        recipient.id,
        &recipient.skills_offered,
        &skill_requested,
        &sender.skills_offered,
        &skill_offered,
    )?;

    if repo::exists_pending(&state.db, sender_id, recipient.id).await? {
        return Err(ApiError::conflict(DUPLICATE_PENDING));
    }

    let message = body
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    // The partial unique index settles any create/create race; a loser of
    // that race gets the same Conflict as the pre-check.
    let id = repo::insert(
        &state.db,
        sender_id,
        recipient.id,
        &skill_requested,
        &skill_offered,
        message,
    )
    .await
    .map_err(|e| conflict_on_unique(e, DUPLICATE_PENDING))?;

    let detail = repo::find_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("created request {id} not found")))?;

    info!(request_id = %id, sender = %sender_id, recipient = %recipient.id, "swap request created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            SwapRequestResponse::from(detail),
            "Swap request sent successfully",
        ),
    ))
}

/// GET /api/requests — the caller's own requests, newest first.
#[instrument(skip(state))]
pub async fn list_requests(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<SwapRequestResponse>>>, ApiError> {
    let (page, limit) = page_and_limit(params.page, params.limit);

    let total = repo::count(&state.db, user_id, params.direction, params.status).await?;
    let pagination = Pagination::new(page, limit, total);
    let rows = repo::list(
        &state.db,
        user_id,
        params.direction,
        params.status,
        limit,
        pagination.offset(),
    )
    .await?;

    let data = rows.into_iter().map(SwapRequestResponse::from).collect();
    Ok(ApiResponse::page(data, pagination))
}

/// GET /api/requests/:id — participants only.
#[instrument(skip(state))]
pub async fn get_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SwapRequestResponse>>, ApiError> {
    let detail = repo::find_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Request not found"))?;

    if role_of(detail.sender_id, detail.recipient_id, user_id).is_none() {
        return Err(ApiError::forbidden("Not authorized to view this request"));
    }

    Ok(ApiResponse::ok(SwapRequestResponse::from(detail)))
}

/// PUT /api/requests/:id/status — accept/reject by the recipient, cancel by
/// the sender; only pending requests may transition.
#[instrument(skip(state, body))]
pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(body): ValidJson<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<SwapRequestResponse>>, ApiError> {
    let detail = repo::find_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Request not found"))?;

    let role = role_of(detail.sender_id, detail.recipient_id, user_id);
    let new_status = check_transition(detail.status, body.status, role)?;

    // Guarded update: a concurrent transition between the read above and
    // this statement leaves zero rows affected.
    if !repo::transition_pending(&state.db, id, new_status).await? {
        warn!(request_id = %id, "lost transition race");
        return Err(ApiError::conflict("Request is no longer pending"));
    }

    let detail = repo::find_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("request {id} vanished after update")))?;

    info!(request_id = %id, status = %new_status, "swap request transitioned");
    Ok(ApiResponse::with_message(
        SwapRequestResponse::from(detail),
        format!("Request {new_status} successfully"),
    ))
}
