/// Shift application model and review workflow
///
/// Workers apply for open shifts with a priority (1 = first choice) and
/// optional notes. Managers review applications: rejecting is a single
/// status change, approving hands off to [`Shift::assign`] so the shift is
/// filled and competing applications are rejected atomically.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::shift::{Shift, ShiftStatus, ShiftWorkflowError};

/// Application lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Awaiting review
    Pending,

    /// Accepted; the applicant was assigned to the shift
    Approved,

    /// Declined
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// Errors from the apply/review/cancel workflow
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    /// Application does not exist
    #[error("Application not found")]
    NotFound,

    /// Target shift does not exist
    #[error("Shift not found")]
    ShiftNotFound,

    /// Shift is not accepting applications
    #[error("Shift is not open for applications")]
    ShiftClosed,

    /// Shift date has already passed
    #[error("Cannot apply to a shift in the past")]
    PastShift,

    /// User already has an application for this shift
    #[error("Already applied to this shift")]
    AlreadyApplied,

    /// Application has already been approved or rejected
    #[error("Application has already been reviewed")]
    AlreadyReviewed,

    /// Requester does not own the application
    #[error("Application belongs to another user")]
    NotOwner,

    /// Failure inside the assignment step of an approval
    #[error(transparent)]
    Workflow(#[from] ShiftWorkflowError),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Shift application row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShiftApplication {
    /// Unique application ID
    pub id: Uuid,

    /// Shift applied to
    pub shift_id: Uuid,

    /// Applicant
    pub user_id: Uuid,

    /// Applicant's preference, 1 (first choice) through 5
    pub priority: i32,

    /// Lifecycle status
    pub status: ApplicationStatus,

    /// Applicant's notes
    pub notes: Option<String>,

    /// Reviewer's notes
    pub review_notes: Option<String>,

    /// Who reviewed it
    pub reviewed_by: Option<Uuid>,

    /// When it was reviewed
    pub reviewed_at: Option<DateTime<Utc>>,

    /// When the application was filed
    pub applied_at: DateTime<Utc>,
}

/// Input for applying to a shift
#[derive(Debug, Clone, Deserialize)]
pub struct ApplyToShift {
    /// Preference, 1 through 5; defaults to 1
    pub priority: Option<i32>,

    /// Free-text notes for the reviewer
    pub notes: Option<String>,
}

/// Review decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ShiftApplication {
    /// Files a new application for a shift
    ///
    /// Preconditions, checked in order: the shift exists, is open, is dated
    /// after today, and the user has not already applied. The unique
    /// constraint on (shift_id, user_id) backstops the duplicate check.
    pub async fn apply(
        pool: &PgPool,
        shift_id: Uuid,
        user_id: Uuid,
        data: ApplyToShift,
    ) -> Result<Self, ApplicationError> {
        let shift = Shift::find_by_id(pool, shift_id)
            .await?
            .ok_or(ApplicationError::ShiftNotFound)?;

        if shift.status != ShiftStatus::Open {
            return Err(ApplicationError::ShiftClosed);
        }
        // Same-day shifts are too late to staff; only future dates qualify
        if shift.shift_date <= today() {
            return Err(ApplicationError::PastShift);
        }

        let existing: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM shift_applications WHERE shift_id = $1 AND user_id = $2",
        )
        .bind(shift_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        if existing.is_some() {
            return Err(ApplicationError::AlreadyApplied);
        }

        let application = sqlx::query_as::<_, ShiftApplication>(
            r#"
            INSERT INTO shift_applications (shift_id, user_id, priority, notes)
            VALUES ($1, $2, COALESCE($3, 1), $4)
            RETURNING *
            "#,
        )
        .bind(shift_id)
        .bind(user_id)
        .bind(data.priority)
        .bind(data.notes)
        .fetch_one(pool)
        .await?;

        Ok(application)
    }

    /// Finds an application by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ShiftApplication>("SELECT * FROM shift_applications WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Reviews a pending application
    ///
    /// Rejection is a single status update with the review metadata.
    /// Approval delegates to [`Shift::assign`], which fills the shift,
    /// approves this application, and rejects its competitors in one
    /// transaction; the reviewer's notes are then recorded on top.
    pub async fn review(
        pool: &PgPool,
        id: Uuid,
        reviewer_id: Uuid,
        decision: ReviewDecision,
        review_notes: Option<String>,
    ) -> Result<Self, ApplicationError> {
        let application = Self::find_by_id(pool, id)
            .await?
            .ok_or(ApplicationError::NotFound)?;

        if application.status != ApplicationStatus::Pending {
            return Err(ApplicationError::AlreadyReviewed);
        }

        match decision {
            ReviewDecision::Reject => {
                let updated = sqlx::query_as::<_, ShiftApplication>(
                    r#"
                    UPDATE shift_applications
                    SET status = 'rejected', review_notes = $2,
                        reviewed_by = $3, reviewed_at = NOW()
                    WHERE id = $1 AND status = 'pending'
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(review_notes)
                .bind(reviewer_id)
                .fetch_optional(pool)
                .await?;

                updated.ok_or(ApplicationError::AlreadyReviewed)
            }
            ReviewDecision::Approve => {
                Shift::assign(pool, application.shift_id, application.user_id, reviewer_id)
                    .await?;

                if let Some(notes) = review_notes {
                    sqlx::query(
                        "UPDATE shift_applications SET review_notes = $2 WHERE id = $1",
                    )
                    .bind(id)
                    .bind(notes)
                    .execute(pool)
                    .await?;
                }

                Self::find_by_id(pool, id)
                    .await?
                    .ok_or(ApplicationError::NotFound)
            }
        }
    }

    /// Cancels (deletes) the requester's own pending application
    pub async fn cancel(
        pool: &PgPool,
        id: Uuid,
        requester_id: Uuid,
    ) -> Result<(), ApplicationError> {
        let application = Self::find_by_id(pool, id)
            .await?
            .ok_or(ApplicationError::NotFound)?;

        if application.user_id != requester_id {
            return Err(ApplicationError::NotOwner);
        }
        if application.status != ApplicationStatus::Pending {
            return Err(ApplicationError::AlreadyReviewed);
        }

        sqlx::query("DELETE FROM shift_applications WHERE id = $1 AND status = 'pending'")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Applications for one shift, best priority first then oldest first
    pub async fn list_for_shift(pool: &PgPool, shift_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ShiftApplication>(
            r#"
            SELECT * FROM shift_applications
            WHERE shift_id = $1
            ORDER BY priority ASC, applied_at ASC
            "#,
        )
        .bind(shift_id)
        .fetch_all(pool)
        .await
    }

    /// A user's applications, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ShiftApplication>(
            "SELECT * FROM shift_applications WHERE user_id = $1 ORDER BY applied_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// All pending applications, best priority first then oldest first
    pub async fn list_pending(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ShiftApplication>(
            r#"
            SELECT * FROM shift_applications
            WHERE status = 'pending'
            ORDER BY priority ASC, applied_at ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&ApplicationStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");

        let parsed: ApplicationStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(parsed, ApplicationStatus::Rejected);
    }

    #[test]
    fn test_review_decision_serde() {
        let approve: ReviewDecision = serde_json::from_str("\"approve\"").unwrap();
        assert_eq!(approve, ReviewDecision::Approve);

        let reject: ReviewDecision = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(reject, ReviewDecision::Reject);

        assert!(serde_json::from_str::<ReviewDecision>("\"maybe\"").is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ApplicationError::AlreadyApplied.to_string(),
            "Already applied to this shift"
        );
        assert_eq!(
            ApplicationError::PastShift.to_string(),
            "Cannot apply to a shift in the past"
        );
    }
}
