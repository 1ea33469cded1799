/// Event endpoints
///
/// # Endpoints
///
/// - `GET    /v1/events` - Filtered + paginated list
/// - `POST   /v1/events` - Create (management)
/// - `GET    /v1/events/upcoming` - Published future events (public)
/// - `GET    /v1/events/past` - Past events
/// - `GET    /v1/events/:id` - Single event with its shifts
/// - `GET    /v1/events/:id/stats` - Staffing counters (management)
/// - `PATCH  /v1/events/:id` - Partial update (management)
/// - `PATCH  /v1/events/:id/status` - Status change (admin/management)
/// - `DELETE /v1/events/:id` - Delete (admin/management)
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
        event::{CreateEvent, Event, EventFilter, EventStats, EventStatus, UpdateEvent},
        shift::Shift,
        Page,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create event request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,

    #[validate(length(max = 255, message = "Location name must be at most 255 characters"))]
    pub location_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub what3words: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,

    #[validate(email(message = "Invalid contact email"))]
    pub contact_email: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,

    #[validate(range(min = 0, message = "Expected attendees cannot be negative"))]
    pub expected_attendees: Option<i32>,
}

impl From<CreateEventRequest> for CreateEvent {
    fn from(req: CreateEventRequest) -> Self {
        CreateEvent {
            name: req.name,
            event_date: req.event_date,
            start_time: req.start_time,
            end_time: req.end_time,
            location_name: req.location_name,
            address: req.address,
            city: req.city,
            postal_code: req.postal_code,
            latitude: req.latitude,
            longitude: req.longitude,
            what3words: req.what3words,
            contact_person: req.contact_person,
            contact_phone: req.contact_phone,
            contact_email: req.contact_email,
            description: req.description,
            notes: req.notes,
            expected_attendees: req.expected_attendees,
        }
    }
}

/// Status change request
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: EventStatus,
}

/// Limit parameter for the upcoming/past listings
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }
}

/// Event with its shifts, for the detail view
#[derive(Debug, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub shifts: Vec<Shift>,
}

/// Filtered + paginated event listing
pub async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> ApiResult<Json<Page<Event>>> {
    let page = Event::list(&state.db, &filter).await?;
    Ok(Json(page))
}

/// Create an event (management tier)
pub async fn create_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    require_management(&auth)?;
    req.validate()?;

    let event = Event::create(&state.db, req.into()).await?;

    tracing::info!(event_id = %event.id, created_by = %auth.user_id, "Event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// Published events dated today or later (public)
pub async fn upcoming_events(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<Event>>> {
    let events = Event::upcoming(&state.db, query.limit()).await?;
    Ok(Json(events))
}

/// Events dated before today, newest first
pub async fn past_events(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<Event>>> {
    let events = Event::past(&state.db, query.limit()).await?;
    Ok(Json(events))
}

/// Single event with its shifts
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EventDetail>> {
    let event = Event::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    let shifts = Shift::list_for_event(&state.db, id).await?;

    Ok(Json(EventDetail { event, shifts }))
}

/// Staffing counters for an event (management tier)
pub async fn event_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EventStats>> {
    require_management(&auth)?;

    let stats = Event::stats(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    Ok(Json(stats))
}

/// Partial update (management tier)
pub async fn update_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateEvent>,
) -> ApiResult<Json<Event>> {
    require_management(&auth)?;

    let event = Event::update(&state.db, id, data)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    Ok(Json(event))
}

/// Status change (admin or management)
pub async fn set_event_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<Json<Event>> {
    require_admin_or_management(&auth)?;

    let event = Event::set_status(&state.db, id, req.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    tracing::info!(event_id = %event.id, status = event.status.as_str(), "Event status changed");
    Ok(Json(event))
}

/// Delete an event and its shifts (admin or management)
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_admin_or_management(&auth)?;

    let deleted = Event::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }

    tracing::info!(event_id = %id, deleted_by = %auth.user_id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}
