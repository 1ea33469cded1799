/// Shift and shift-application endpoints
///
/// # Endpoints
///
/// - `GET    /v1/shifts` - Filtered list
/// - `POST   /v1/shifts` - Create (management)
/// - `GET    /v1/shifts/my-shifts` - Shifts assigned to the caller
/// - `GET    /v1/shifts/my-applications` - Caller's applications
/// - `GET    /v1/shifts/available` - Open future shifts not yet applied to
/// - `GET    /v1/shifts/stats` - Global counters (management)
/// - `GET    /v1/shifts/applications/pending` - Pending applications (management)
/// - `GET    /v1/shifts/:id` - Single shift
/// - `GET    /v1/shifts/:id/applications` - Applications for a shift (management)
/// - `POST   /v1/shifts/:id/apply` - Apply to a shift
/// - `POST   /v1/shifts/applications/:id/review` - Approve/reject (management)
/// - `POST   /v1/shifts/:id/assign` - Direct assignment (management)
/// - `POST   /v1/shifts/:id/unassign` - Remove assignment (management)
/// - `DELETE /v1/shifts/applications/:id` - Cancel own pending application
/// - `PATCH  /v1/shifts/:id` - Partial update (management)
/// - `DELETE /v1/shifts/:id` - Delete (admin/management)
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, NaiveTime};
use crewcall_shared::{
    auth::{
        authorization::{require_admin_or_management, require_management},
        middleware::AuthContext,
    },
    models::{
        application::{ApplyToShift, ReviewDecision, ShiftApplication},
        event::Event,
        shift::{CreateShift, Shift, ShiftFilter, ShiftStats, UpdateShift},
        user::User,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create shift request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateShiftRequest {
    pub event_id: Uuid,
    pub shift_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,

    #[validate(length(max = 255, message = "Position name must be at most 255 characters"))]
    pub position_name: Option<String>,

    #[validate(range(min = 1, message = "Required count must be at least 1"))]
    pub required_count: Option<i32>,

    pub description: Option<String>,
    pub requirements: Option<String>,

    #[validate(range(min = 0, message = "Hourly rate cannot be negative"))]
    pub hourly_rate_cents: Option<i32>,
}

/// Apply request
#[derive(Debug, Deserialize, Validate)]
pub struct ApplyRequest {
    #[validate(range(min = 1, max = 5, message = "Priority must be between 1 and 5"))]
    pub priority: Option<i32>,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Review request
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
    pub review_notes: Option<String>,
}

/// Direct assignment request
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub user_id: Uuid,
}

/// Filtered shift listing
pub async fn list_shifts(
    State(state): State<AppState>,
    Query(filter): Query<ShiftFilter>,
) -> ApiResult<Json<Vec<Shift>>> {
    let shifts = Shift::list(&state.db, &filter).await?;
    Ok(Json(shifts))
}

/// Create a shift under an event (management tier)
pub async fn create_shift(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateShiftRequest>,
) -> ApiResult<(StatusCode, Json<Shift>)> {
    require_management(&auth)?;
    req.validate()?;

    // Friendly 404 instead of an FK violation
    if Event::find_by_id(&state.db, req.event_id).await?.is_none() {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }

    let shift = Shift::create(
        &state.db,
        CreateShift {
            event_id: req.event_id,
            shift_date: req.shift_date,
            start_time: req.start_time,
            end_time: req.end_time,
            position_name: req.position_name,
            required_count: req.required_count,
            description: req.description,
            requirements: req.requirements,
            hourly_rate_cents: req.hourly_rate_cents,
        },
    )
    .await?;

    tracing::info!(shift_id = %shift.id, event_id = %shift.event_id, "Shift created");
    Ok((StatusCode::CREATED, Json(shift)))
}

/// Shifts assigned to the caller
pub async fn my_shifts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Shift>>> {
    let shifts = Shift::assigned_to(&state.db, auth.user_id).await?;
    Ok(Json(shifts))
}

/// The caller's applications, newest first
pub async fn my_applications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ShiftApplication>>> {
    let applications = ShiftApplication::list_for_user(&state.db, auth.user_id).await?;
    Ok(Json(applications))
}

/// Open, future-dated shifts the caller has not applied to
pub async fn available_shifts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Shift>>> {
    let shifts = Shift::available_for(&state.db, auth.user_id).await?;
    Ok(Json(shifts))
}

/// Global shift and application counters (management tier)
pub async fn shift_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ShiftStats>> {
    require_management(&auth)?;

    let stats = Shift::stats(&state.db).await?;
    Ok(Json(stats))
}

/// All pending applications, review queue order (management tier)
pub async fn pending_applications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ShiftApplication>>> {
    require_management(&auth)?;

    let applications = ShiftApplication::list_pending(&state.db).await?;
    Ok(Json(applications))
}

/// Single shift
pub async fn get_shift(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Shift>> {
    let shift = Shift::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Shift not found".to_string()))?;

    Ok(Json(shift))
}

/// Applications for one shift (management tier)
pub async fn shift_applications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ShiftApplication>>> {
    require_management(&auth)?;

    if Shift::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("Shift not found".to_string()));
    }

    let applications = ShiftApplication::list_for_shift(&state.db, id).await?;
    Ok(Json(applications))
}

/// Apply to a shift
///
/// # Errors
///
/// - `404`: shift does not exist
/// - `400`: shift closed or in the past
/// - `409`: already applied
pub async fn apply_to_shift(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApplyRequest>,
) -> ApiResult<(StatusCode, Json<ShiftApplication>)> {
    req.validate()?;

    let application = ShiftApplication::apply(
        &state.db,
        id,
        auth.user_id,
        ApplyToShift {
            priority: req.priority,
            notes: req.notes,
        },
    )
    .await?;

    tracing::info!(
        application_id = %application.id,
        shift_id = %id,
        user_id = %auth.user_id,
        "Shift application filed"
    );
    Ok((StatusCode::CREATED, Json(application)))
}

/// Approve or reject a pending application (management tier)
///
/// Approving fills the shift, approves this application, and rejects all
/// competing pending applications atomically.
pub async fn review_application(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> ApiResult<Json<ShiftApplication>> {
    require_management(&auth)?;

    let application =
        ShiftApplication::review(&state.db, id, auth.user_id, req.decision, req.review_notes)
            .await?;

    tracing::info!(
        application_id = %application.id,
        status = application.status.as_str(),
        reviewed_by = %auth.user_id,
        "Application reviewed"
    );
    Ok(Json(application))
}

/// Directly assign a worker to a shift (management tier)
///
/// Works whether or not the worker applied; a pending application from the
/// worker is approved, and competing pending applications are rejected.
pub async fn assign_shift(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Json<Shift>> {
    require_management(&auth)?;

    if User::find_by_id(&state.db, req.user_id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let shift = Shift::assign(&state.db, id, req.user_id, auth.user_id).await?;

    tracing::info!(
        shift_id = %shift.id,
        assigned_user = %req.user_id,
        assigned_by = %auth.user_id,
        "Shift assigned"
    );
    Ok(Json(shift))
}

/// Remove the assigned worker and reopen the shift (management tier)
pub async fn unassign_shift(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Shift>> {
    require_management(&auth)?;

    let shift = Shift::unassign(&state.db, id).await?;

    tracing::info!(shift_id = %shift.id, unassigned_by = %auth.user_id, "Shift unassigned");
    Ok(Json(shift))
}

/// Cancel the caller's own pending application
pub async fn cancel_application(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    ShiftApplication::cancel(&state.db, id, auth.user_id).await?;

    tracing::info!(application_id = %id, user_id = %auth.user_id, "Application cancelled");
    Ok(StatusCode::NO_CONTENT)
}

/// Partial update (management tier)
pub async fn update_shift(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateShift>,
) -> ApiResult<Json<Shift>> {
    require_management(&auth)?;

    let shift = Shift::update(&state.db, id, data)
        .await?
        .ok_or_else(|| ApiError::NotFound("Shift not found".to_string()))?;

    Ok(Json(shift))
}

/// Delete a shift and its applications (admin or management)
pub async fn delete_shift(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_admin_or_management(&auth)?;

    let deleted = Shift::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Shift not found".to_string()));
    }

    tracing::info!(shift_id = %id, deleted_by = %auth.user_id, "Shift deleted");
    Ok(StatusCode::NO_CONTENT)
}
