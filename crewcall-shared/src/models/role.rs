/// Role model and user-role assignment
///
/// CrewCall uses a small, fixed role vocabulary stored as reference data in
/// the `roles` table, joined to users through `user_roles`. The vocabulary is
/// mirrored by the [`RoleName`] enum so the rest of the codebase never deals
/// in raw strings.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE roles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(50) NOT NULL UNIQUE,
///     description TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE user_roles (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role_id UUID NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
///     PRIMARY KEY (user_id, role_id)
/// );
/// ```
///
/// # Role Tiers
///
/// - **admin**: everything, including destructive operations
/// - **management**: create/update events and shifts, review applications
/// - **team_lead**: same staffing powers as management
/// - **employee**: apply for shifts, manage own applications
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The fixed set of role names known to the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleName {
    /// Full administrative access
    Admin,

    /// Event and staffing management
    Management,

    /// Team lead: staffing powers without admin rights
    TeamLead,

    /// Default worker role assigned on registration
    Employee,
}

impl RoleName {
    /// String form as stored in the `roles.name` column
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "admin",
            RoleName::Management => "management",
            RoleName::TeamLead => "team_lead",
            RoleName::Employee => "employee",
        }
    }

    /// Management tier: allowed to create events/shifts and review applications
    pub fn is_management_tier(&self) -> bool {
        matches!(
            self,
            RoleName::Admin | RoleName::Management | RoleName::TeamLead
        )
    }

    /// All known roles, in descending order of privilege
    pub fn all() -> [RoleName; 4] {
        [
            RoleName::Admin,
            RoleName::Management,
            RoleName::TeamLead,
            RoleName::Employee,
        ]
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name
#[derive(Debug, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for RoleName {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(RoleName::Admin),
            "management" => Ok(RoleName::Management),
            "team_lead" => Ok(RoleName::TeamLead),
            "employee" => Ok(RoleName::Employee),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A row from the `roles` reference table
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    /// Unique role ID
    pub id: Uuid,

    /// Role name (one of the [`RoleName`] strings)
    pub name: String,

    /// Human-readable description
    pub description: Option<String>,

    /// When the role row was created
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Ensures a role row exists and returns it
    ///
    /// Roles are seeded by migration, so this only inserts when the seed data
    /// has been tampered with or a fresh role is introduced.
    pub async fn ensure(pool: &PgPool, name: RoleName) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(name.as_str())
        .fetch_one(pool)
        .await
    }

    /// Grants a role to a user (no-op if already granted)
    pub async fn grant_to_user(
        pool: &PgPool,
        user_id: Uuid,
        name: RoleName,
    ) -> Result<(), sqlx::Error> {
        let role = Self::ensure(pool, name).await?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role.id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Lists role names held by a user
    ///
    /// Unknown names in the table (none in normal operation) are skipped
    /// rather than failing the whole lookup.
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<RoleName>, sqlx::Error> {
        let names: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(names
            .into_iter()
            .filter_map(|(name,)| name.parse().ok())
            .collect())
    }

    /// Replaces a user's role set in a single transaction
    pub async fn replace_for_user(
        pool: &PgPool,
        user_id: Uuid,
        roles: &[RoleName],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for role in roles {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                SELECT $1, id FROM roles WHERE name = $2
                ON CONFLICT (user_id, role_id) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_name_roundtrip() {
        for role in RoleName::all() {
            let parsed: RoleName = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!("superuser".parse::<RoleName>().is_err());
        assert!("".parse::<RoleName>().is_err());
        assert!("Admin".parse::<RoleName>().is_err()); // case-sensitive
    }

    #[test]
    fn test_management_tier() {
        assert!(RoleName::Admin.is_management_tier());
        assert!(RoleName::Management.is_management_tier());
        assert!(RoleName::TeamLead.is_management_tier());
        assert!(!RoleName::Employee.is_management_tier());
    }

    #[test]
    fn test_serde_rename() {
        let json = serde_json::to_string(&RoleName::TeamLead).unwrap();
        assert_eq!(json, "\"team_lead\"");
    }
}
