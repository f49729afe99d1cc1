use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::{info, instrument};

use crate::auth::jwt::{AuthUser, OptionalAuthUser};
use crate::errors::ApiError;
use crate::extract::ValidJson;
use crate::response::{page_and_limit, ApiResponse, Pagination};
use crate::state::AppState;

use super::dto::{PublicProfile, SearchParams, UpdateProfileRequest, UserProfile};
use super::repo::{self, ProfilePatch};
use super::search::{SearchFilter, SortOrder};
use super::skills::normalize_skills;

/// GET /api/users — public directory search. Anonymous callers get the
/// default ordering; authenticated callers with stored coordinates may ask
/// for `sort=nearest`.
#[instrument(skip(state))]
pub async fn search_users(
    State(state): State<AppState>,
    OptionalAuthUser(requester): OptionalAuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<Vec<PublicProfile>>>, ApiError> {
    let (page, limit) = page_and_limit(params.page, params.limit);
    let filter = SearchFilter::from_params(&params);

    let origin = if filter.sort == SortOrder::Nearest {
        match requester {
            Some(user_id) => repo::find_by_id(&state.db, user_id)
                .await?
                .and_then(|u| match (u.location_lat, u.location_lng) {
                    (Some(lat), Some(lng)) => Some((lat, lng)),
                    _ => None,
                }),
            None => None,
        }
    } else {
        None
    };

    let total = repo::count_search(&state.db, &filter).await?;
    let pagination = Pagination::new(page, limit, total);
    let users = repo::search(&state.db, &filter, origin, limit, pagination.offset()).await?;

    let profiles = users.into_iter().map(PublicProfile::from).collect();
    Ok(ApiResponse::page(profiles, pagination))
}

/// GET /api/users/:username — public profile lookup, case-insensitive.
#[instrument(skip(state))]
pub async fn get_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<PublicProfile>>, ApiError> {
    let user = repo::find_public_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::ok(PublicProfile::from(user)))
}

/// PUT /api/users/profile — allow-listed patch of the caller's own profile.
#[instrument(skip(state, body))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(body): ValidJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let (location_address, location_lat, location_lng) = match body.location {
        Some(location) => {
            let (lat, lng) = match location.coordinates {
                Some(c) => (Some(c.lat), Some(c.lng)),
                None => (None, None),
            };
            (location.address, lat, lng)
        }
        None => (None, None, None),
    };

    let (availability_days, availability_time_slots) = match body.availability {
        Some(availability) => (
            availability
                .days
                .map(|d| d.iter().map(|s| s.to_lowercase()).collect()),
            availability
                .time_slots
                .map(|t| t.iter().map(|s| s.to_lowercase()).collect()),
        ),
        None => (None, None),
    };

    let patch = ProfilePatch {
        full_name: body.full_name.map(|n| n.trim().to_string()),
        location_address,
        location_lat,
        location_lng,
        skills_offered: body.skills_offered.as_deref().map(normalize_skills),
        skills_wanted: body.skills_wanted.as_deref().map(normalize_skills),
        availability_days,
        availability_time_slots,
        is_public: body.is_public,
    };

    let user = repo::update_profile(&state.db, user_id, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!(user_id = %user.id, "profile updated");
    Ok(ApiResponse::with_message(
        UserProfile::from(user),
        "Profile updated successfully",
    ))
}

/// GET /api/users/profile/me — caller's full profile.
#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let user = repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::ok(UserProfile::from(user)))
}
