/// Shift model, database operations, and assignment workflow
///
/// A shift is a single staffed position within an event: one date, one time
/// window, at most one assigned worker. Workers compete for open shifts by
/// filing applications (see [`crate::models::application`]); a manager then
/// assigns one of them, or assigns any user directly.
///
/// Assignment is the contended operation, so [`Shift::assign`] runs inside a
/// single transaction and claims the shift row with a conditional UPDATE.
/// When two approvals race, exactly one wins; the other gets
/// [`ShiftWorkflowError::AlreadyAssigned`].
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Review note written onto pending applications that lose out when a shift
/// is assigned to someone else.
pub const ASSIGNED_ELSEWHERE_NOTE: &str = "Shift was assigned to another user";

/// Shift lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "shift_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    /// Accepting applications
    Open,

    /// A worker has been assigned
    Filled,

    /// Called off
    Cancelled,
}

impl ShiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStatus::Open => "open",
            ShiftStatus::Filled => "filled",
            ShiftStatus::Cancelled => "cancelled",
        }
    }
}

/// Errors from the assign/unassign workflow
#[derive(Debug, thiserror::Error)]
pub enum ShiftWorkflowError {
    /// Shift does not exist
    #[error("Shift not found")]
    NotFound,

    /// Shift already has an assigned worker
    #[error("Shift is already assigned")]
    AlreadyAssigned,

    /// Shift has no assigned worker to remove
    #[error("Shift has no assigned worker")]
    NotAssigned,

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Shift row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Shift {
    /// Unique shift ID
    pub id: Uuid,

    /// Parent event
    pub event_id: Uuid,

    /// Calendar date of the shift
    pub shift_date: NaiveDate,

    /// Shift start
    pub start_time: NaiveTime,

    /// Shift end
    pub end_time: NaiveTime,

    /// Position being staffed (e.g. "Stage hand", "Bar lead")
    pub position_name: Option<String>,

    /// Headcount wanted for this position
    pub required_count: i32,

    /// Public description
    pub description: Option<String>,

    /// Requirements (certifications, experience)
    pub requirements: Option<String>,

    /// Assigned worker, if any
    pub assigned_user_id: Option<Uuid>,

    /// Lifecycle status
    pub status: ShiftStatus,

    /// Pay rate in cents per hour
    pub hourly_rate_cents: Option<i32>,

    /// When the row was created
    pub created_at: DateTime<Utc>,

    /// When the row was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a shift
#[derive(Debug, Clone, Deserialize)]
pub struct CreateShift {
    pub event_id: Uuid,
    pub shift_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub position_name: Option<String>,
    pub required_count: Option<i32>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub hourly_rate_cents: Option<i32>,
}

/// Partial update for a shift; None fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateShift {
    pub shift_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub position_name: Option<String>,
    pub required_count: Option<i32>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub status: Option<ShiftStatus>,
    pub hourly_rate_cents: Option<i32>,
}

/// Filter parameters for shift listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShiftFilter {
    /// Only shifts belonging to this event
    pub event_id: Option<Uuid>,

    /// Only shifts with this status
    pub status: Option<ShiftStatus>,

    /// Inclusive lower bound on shift_date
    pub start_date: Option<NaiveDate>,

    /// Inclusive upper bound on shift_date
    pub end_date: Option<NaiveDate>,
}

/// Global shift and application counters
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShiftStats {
    pub total_shifts: i64,
    pub open_shifts: i64,
    pub filled_shifts: i64,
    pub cancelled_shifts: i64,
    pub total_applications: i64,
    pub pending_applications: i64,
}

impl Shift {
    /// Inserts a new shift in `open` status
    pub async fn create(pool: &PgPool, data: CreateShift) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Shift>(
            r#"
            INSERT INTO shifts (
                event_id, shift_date, start_time, end_time, position_name,
                required_count, description, requirements, hourly_rate_cents
            )
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 1), $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(data.event_id)
        .bind(data.shift_date)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.position_name)
        .bind(data.required_count)
        .bind(data.description)
        .bind(data.requirements)
        .bind(data.hourly_rate_cents)
        .fetch_one(pool)
        .await
    }

    /// Finds a shift by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Shift>("SELECT * FROM shifts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists shifts matching the filter, soonest first
    pub async fn list(pool: &PgPool, filter: &ShiftFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM shifts WHERE 1=1");

        if let Some(event_id) = filter.event_id {
            qb.push(" AND event_id = ").push_bind(event_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(start) = filter.start_date {
            qb.push(" AND shift_date >= ").push_bind(start);
        }
        if let Some(end) = filter.end_date {
            qb.push(" AND shift_date <= ").push_bind(end);
        }
        qb.push(" ORDER BY shift_date ASC, start_time ASC");

        qb.build_query_as::<Shift>().fetch_all(pool).await
    }

    /// Lists shifts belonging to an event, soonest first
    pub async fn list_for_event(pool: &PgPool, event_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Shift>(
            "SELECT * FROM shifts WHERE event_id = $1 ORDER BY shift_date ASC, start_time ASC",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    /// Shifts assigned to a user, soonest first
    pub async fn assigned_to(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Shift>(
            r#"
            SELECT * FROM shifts
            WHERE assigned_user_id = $1
            ORDER BY shift_date ASC, start_time ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Open shifts dated after today that the user has not already applied to
    ///
    /// Same-day shifts are excluded, matching the apply precondition.
    pub async fn available_for(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Shift>(
            r#"
            SELECT s.* FROM shifts s
            WHERE s.status = 'open'
              AND s.assigned_user_id IS NULL
              AND s.shift_date > CURRENT_DATE
              AND NOT EXISTS (
                  SELECT 1 FROM shift_applications a
                  WHERE a.shift_id = s.id AND a.user_id = $1
              )
            ORDER BY s.shift_date ASC, s.start_time ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Applies a partial update; unset fields keep their current value
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateShift,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Shift>(
            r#"
            UPDATE shifts
            SET shift_date = COALESCE($2, shift_date),
                start_time = COALESCE($3, start_time),
                end_time = COALESCE($4, end_time),
                position_name = COALESCE($5, position_name),
                required_count = COALESCE($6, required_count),
                description = COALESCE($7, description),
                requirements = COALESCE($8, requirements),
                status = COALESCE($9, status),
                hourly_rate_cents = COALESCE($10, hourly_rate_cents),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.shift_date)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.position_name)
        .bind(data.required_count)
        .bind(data.description)
        .bind(data.requirements)
        .bind(data.status)
        .bind(data.hourly_rate_cents)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a shift (and its applications, via cascade)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM shifts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Assigns a worker to a shift
    ///
    /// Runs in one transaction:
    ///
    /// 1. Claim the shift with `UPDATE ... WHERE assigned_user_id IS NULL`.
    ///    Losing a race surfaces as [`ShiftWorkflowError::AlreadyAssigned`].
    /// 2. Approve the worker's own pending application, if one exists.
    /// 3. Reject every other pending application for the shift with
    ///    [`ASSIGNED_ELSEWHERE_NOTE`].
    ///
    /// `reviewer_id` is recorded on all touched applications.
    pub async fn assign(
        pool: &PgPool,
        shift_id: Uuid,
        user_id: Uuid,
        reviewer_id: Uuid,
    ) -> Result<Self, ShiftWorkflowError> {
        let mut tx = pool.begin().await?;

        let shift = sqlx::query_as::<_, Shift>(
            r#"
            UPDATE shifts
            SET assigned_user_id = $2, status = 'filled', updated_at = NOW()
            WHERE id = $1 AND assigned_user_id IS NULL
            RETURNING *
            "#,
        )
        .bind(shift_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let shift = match shift {
            Some(shift) => shift,
            None => {
                // Distinguish a missing shift from a lost race.
                let exists: Option<(Uuid,)> =
                    sqlx::query_as("SELECT id FROM shifts WHERE id = $1")
                        .bind(shift_id)
                        .fetch_optional(&mut *tx)
                        .await?;

                return Err(match exists {
                    Some(_) => ShiftWorkflowError::AlreadyAssigned,
                    None => ShiftWorkflowError::NotFound,
                });
            }
        };

        sqlx::query(
            r#"
            UPDATE shift_applications
            SET status = 'approved', reviewed_by = $3, reviewed_at = NOW()
            WHERE shift_id = $1 AND user_id = $2 AND status = 'pending'
            "#,
        )
        .bind(shift_id)
        .bind(user_id)
        .bind(reviewer_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE shift_applications
            SET status = 'rejected', review_notes = $4, reviewed_by = $3, reviewed_at = NOW()
            WHERE shift_id = $1 AND user_id <> $2 AND status = 'pending'
            "#,
        )
        .bind(shift_id)
        .bind(user_id)
        .bind(reviewer_id)
        .bind(ASSIGNED_ELSEWHERE_NOTE)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(shift)
    }

    /// Removes the assigned worker and reopens the shift
    ///
    /// Application rows are left untouched, so the review history stays
    /// visible after an unassignment.
    pub async fn unassign(pool: &PgPool, shift_id: Uuid) -> Result<Self, ShiftWorkflowError> {
        let shift = sqlx::query_as::<_, Shift>(
            r#"
            UPDATE shifts
            SET assigned_user_id = NULL, status = 'open', updated_at = NOW()
            WHERE id = $1 AND assigned_user_id IS NOT NULL
            RETURNING *
            "#,
        )
        .bind(shift_id)
        .fetch_optional(pool)
        .await?;

        match shift {
            Some(shift) => Ok(shift),
            None => {
                let exists: Option<(Uuid,)> =
                    sqlx::query_as("SELECT id FROM shifts WHERE id = $1")
                        .bind(shift_id)
                        .fetch_optional(pool)
                        .await?;

                Err(match exists {
                    Some(_) => ShiftWorkflowError::NotAssigned,
                    None => ShiftWorkflowError::NotFound,
                })
            }
        }
    }

    /// Global staffing counters across all shifts
    pub async fn stats(pool: &PgPool) -> Result<ShiftStats, sqlx::Error> {
        sqlx::query_as::<_, ShiftStats>(
            r#"
            SELECT
                COUNT(DISTINCT s.id) AS total_shifts,
                COUNT(DISTINCT s.id) FILTER (WHERE s.status = 'open') AS open_shifts,
                COUNT(DISTINCT s.id) FILTER (WHERE s.status = 'filled') AS filled_shifts,
                COUNT(DISTINCT s.id) FILTER (WHERE s.status = 'cancelled') AS cancelled_shifts,
                COUNT(a.id) AS total_applications,
                COUNT(a.id) FILTER (WHERE a.status = 'pending') AS pending_applications
            FROM shifts s
            LEFT JOIN shift_applications a ON a.shift_id = s.id
            "#,
        )
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&ShiftStatus::Filled).unwrap();
        assert_eq!(json, "\"filled\"");

        let parsed: ShiftStatus = serde_json::from_str("\"open\"").unwrap();
        assert_eq!(parsed, ShiftStatus::Open);
    }

    #[test]
    fn test_update_shift_default_is_noop() {
        let update = UpdateShift::default();
        assert!(update.shift_date.is_none());
        assert!(update.status.is_none());
        assert!(update.hourly_rate_cents.is_none());
    }

    #[test]
    fn test_workflow_error_messages() {
        assert_eq!(
            ShiftWorkflowError::AlreadyAssigned.to_string(),
            "Shift is already assigned"
        );
        assert_eq!(
            ShiftWorkflowError::NotAssigned.to_string(),
            "Shift has no assigned worker"
        );
    }

    #[test]
    fn test_rejection_note_is_stable() {
        // Clients display this string verbatim; changing it breaks history.
        assert_eq!(ASSIGNED_ELSEWHERE_NOTE, "Shift was assigned to another user");
    }
}
