/// Event model and database operations
///
/// An event is a scheduled happening (concert, conference, festival) that is
/// staffed through one or more shifts. Events move through a simple status
/// lifecycle: `draft → published → active → completed`, with `cancelled`
/// reachable from any non-terminal state.
///
/// Listing supports the dashboard's filter panel: status, date range,
/// location substring, free-text search over name/description, a whitelisted
/// sort column, and page/limit pagination.
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::Page;

/// Event lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Being drafted, not visible to workers
    Draft,

    /// Published and accepting shift applications
    Published,

    /// Currently running
    Active,

    /// Finished
    Completed,

    /// Called off
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Published => "published",
            EventStatus::Active => "active",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

/// Event row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    /// Unique event ID
    pub id: Uuid,

    /// Event name
    pub name: String,

    /// Calendar date of the event
    pub event_date: NaiveDate,

    /// Start of the event day
    pub start_time: NaiveTime,

    /// End of the event day
    pub end_time: NaiveTime,

    /// Venue name
    pub location_name: Option<String>,

    /// Street address
    pub address: Option<String>,

    /// City
    pub city: Option<String>,

    /// Postal code
    pub postal_code: Option<String>,

    /// Venue latitude
    pub latitude: Option<f64>,

    /// Venue longitude
    pub longitude: Option<f64>,

    /// what3words address of the venue entrance
    pub what3words: Option<String>,

    /// On-site contact person
    pub contact_person: Option<String>,

    /// On-site contact phone
    pub contact_phone: Option<String>,

    /// On-site contact email
    pub contact_email: Option<String>,

    /// Public description
    pub description: Option<String>,

    /// Internal notes
    pub notes: Option<String>,

    /// Lifecycle status
    pub status: EventStatus,

    /// Estimated attendance, used for staffing planning
    pub expected_attendees: Option<i32>,

    /// When the row was created
    pub created_at: DateTime<Utc>,

    /// When the row was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an event
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
    pub name: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub what3words: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub expected_attendees: Option<i32>,
}

/// Partial update for an event; None fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEvent {
    pub name: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub what3words: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub expected_attendees: Option<i32>,
}

/// Sort direction for event listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filter, sort, and pagination parameters for the event listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    /// Only events with this status
    pub status: Option<EventStatus>,

    /// Inclusive lower bound on event_date
    pub start_date: Option<NaiveDate>,

    /// Inclusive upper bound on event_date
    pub end_date: Option<NaiveDate>,

    /// Case-insensitive substring match on location_name/address/city
    pub location: Option<String>,

    /// Case-insensitive substring match on name or description
    pub search: Option<String>,

    /// Sort column; whitelisted in [`EventFilter::sort_column`]
    pub sort_by: Option<String>,

    /// Sort direction (default ascending)
    pub sort_order: Option<SortOrder>,

    /// 1-based page number (default 1)
    pub page: Option<u32>,

    /// Page size (default 10, capped at 100)
    pub limit: Option<u32>,
}

impl EventFilter {
    /// Effective page number, clamped to at least 1
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to 1..=100
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    /// Sort column, restricted to a whitelist so callers cannot inject SQL
    pub fn sort_column(&self) -> &'static str {
        match self.sort_by.as_deref() {
            Some("name") => "name",
            Some("status") => "status",
            Some("created_at") => "created_at",
            _ => "event_date",
        }
    }

    /// Appends WHERE clauses for the active filters
    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE 1=1");

        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(start) = self.start_date {
            qb.push(" AND event_date >= ").push_bind(start);
        }
        if let Some(end) = self.end_date {
            qb.push(" AND event_date <= ").push_bind(end);
        }
        if let Some(ref location) = self.location {
            let pattern = format!("%{}%", location);
            qb.push(" AND (location_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR address ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR city ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(ref search) = self.search {
            let pattern = format!("%{}%", search);
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

/// Per-event staffing counters
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventStats {
    /// Shifts attached to the event
    pub total_shifts: i64,

    /// Shifts with an assigned worker
    pub filled_shifts: i64,

    /// Shifts still open
    pub open_shifts: i64,

    /// Applications across all of the event's shifts
    pub total_applications: i64,

    /// Applications awaiting review
    pub pending_applications: i64,
}

impl Event {
    /// Inserts a new event in `draft` status
    pub async fn create(pool: &PgPool, data: CreateEvent) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (
                name, event_date, start_time, end_time, location_name, address,
                city, postal_code, latitude, longitude, what3words,
                contact_person, contact_phone, contact_email, description,
                notes, expected_attendees
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(data.name)
        .bind(data.event_date)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.location_name)
        .bind(data.address)
        .bind(data.city)
        .bind(data.postal_code)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(data.what3words)
        .bind(data.contact_person)
        .bind(data.contact_phone)
        .bind(data.contact_email)
        .bind(data.description)
        .bind(data.notes)
        .bind(data.expected_attendees)
        .fetch_one(pool)
        .await
    }

    /// Finds an event by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists events matching the filter, with a total count for pagination
    pub async fn list(pool: &PgPool, filter: &EventFilter) -> Result<Page<Self>, sqlx::Error> {
        // Total first, so last_page is correct even when the page is empty.
        let mut count_qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM events");
        filter.push_conditions(&mut count_qb);
        let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

        let limit = filter.limit() as i64;
        let page = filter.page() as i64;
        let offset = (page - 1) * limit;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM events");
        filter.push_conditions(&mut qb);
        qb.push(format!(
            " ORDER BY {} {}",
            filter.sort_column(),
            filter.sort_order.unwrap_or(SortOrder::Asc).as_sql()
        ));
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let data = qb.build_query_as::<Event>().fetch_all(pool).await?;

        Ok(Page::new(data, total, filter.page(), filter.limit()))
    }

    /// Applies a partial update; unset fields keep their current value
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateEvent,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET name = COALESCE($2, name),
                event_date = COALESCE($3, event_date),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time),
                location_name = COALESCE($6, location_name),
                address = COALESCE($7, address),
                city = COALESCE($8, city),
                postal_code = COALESCE($9, postal_code),
                latitude = COALESCE($10, latitude),
                longitude = COALESCE($11, longitude),
                what3words = COALESCE($12, what3words),
                contact_person = COALESCE($13, contact_person),
                contact_phone = COALESCE($14, contact_phone),
                contact_email = COALESCE($15, contact_email),
                description = COALESCE($16, description),
                notes = COALESCE($17, notes),
                expected_attendees = COALESCE($18, expected_attendees),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.event_date)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.location_name)
        .bind(data.address)
        .bind(data.city)
        .bind(data.postal_code)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(data.what3words)
        .bind(data.contact_person)
        .bind(data.contact_phone)
        .bind(data.contact_email)
        .bind(data.description)
        .bind(data.notes)
        .bind(data.expected_attendees)
        .fetch_optional(pool)
        .await
    }

    /// Changes the event status
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: EventStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            "UPDATE events SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
    }

    /// Deletes an event (and its shifts, via cascade)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Published events dated today or later, soonest first
    pub async fn upcoming(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT * FROM events
            WHERE status = 'published' AND event_date >= CURRENT_DATE
            ORDER BY event_date ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Events dated before today, newest first
    pub async fn past(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT * FROM events
            WHERE event_date < CURRENT_DATE
            ORDER BY event_date DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Staffing counters for one event
    ///
    /// Returns None if the event does not exist.
    pub async fn stats(pool: &PgPool, id: Uuid) -> Result<Option<EventStats>, sqlx::Error> {
        if Self::find_by_id(pool, id).await?.is_none() {
            return Ok(None);
        }

        let stats = sqlx::query_as::<_, EventStats>(
            r#"
            SELECT
                COUNT(DISTINCT s.id) AS total_shifts,
                COUNT(DISTINCT s.id) FILTER (WHERE s.assigned_user_id IS NOT NULL) AS filled_shifts,
                COUNT(DISTINCT s.id) FILTER (WHERE s.assigned_user_id IS NULL AND s.status = 'open') AS open_shifts,
                COUNT(a.id) AS total_applications,
                COUNT(a.id) FILTER (WHERE a.status = 'pending') AS pending_applications
            FROM shifts s
            LEFT JOIN shift_applications a ON a.shift_id = s.id
            WHERE s.event_id = $1
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(Some(stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults() {
        let filter = EventFilter::default();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.limit(), 10);
        assert_eq!(filter.sort_column(), "event_date");
    }

    #[test]
    fn test_filter_clamps_bounds() {
        let filter = EventFilter {
            page: Some(0),
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.limit(), 100);
    }

    #[test]
    fn test_sort_column_whitelist() {
        let mut filter = EventFilter {
            sort_by: Some("name".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.sort_column(), "name");

        // Anything outside the whitelist falls back to event_date.
        filter.sort_by = Some("id; DROP TABLE events".to_string());
        assert_eq!(filter.sort_column(), "event_date");
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&EventStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");

        let parsed: EventStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, EventStatus::Cancelled);
    }
}
