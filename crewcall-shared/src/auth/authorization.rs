/// Authorization helpers and permission checks
///
/// Role-based access control for CrewCall. Roles are carried in the token
/// (see [`crate::auth::middleware::AuthContext`]), so these checks are pure
/// functions over the auth context.
///
/// # Permission Model
///
/// - **admin**: everything, including role management
/// - **management tier** (admin, management, team_lead): create and edit
///   events and shifts, review applications, assign workers
/// - **employee**: apply for shifts, manage own applications
/// - **self**: a user may always read their own account
use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::role::RoleName;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User doesn't have the required role
    #[error("Insufficient permissions: requires {0}")]
    InsufficientRole(&'static str),

    /// User doesn't own the resource
    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

/// Requires the management tier (admin, management, or team_lead)
pub fn require_management(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.is_management() {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole("management"))
    }
}

/// Requires the admin role
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.has_role(RoleName::Admin) {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole("admin"))
    }
}

/// Requires admin or management (team leads excluded)
///
/// Used for destructive operations: deleting events/shifts and changing
/// event status.
pub fn require_admin_or_management(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.has_role(RoleName::Admin) || auth.has_role(RoleName::Management) {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole("admin or management"))
    }
}

/// Requires that the caller is the named user, or in the management tier
pub fn require_self_or_management(auth: &AuthContext, user_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id == user_id || auth.is_management() {
        Ok(())
    } else {
        Err(AuthzError::NotAuthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_with(roles: Vec<RoleName>) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            email: "worker@example.com".to_string(),
            roles,
        }
    }

    #[test]
    fn test_require_management() {
        assert!(require_management(&context_with(vec![RoleName::Admin])).is_ok());
        assert!(require_management(&context_with(vec![RoleName::Management])).is_ok());
        assert!(require_management(&context_with(vec![RoleName::TeamLead])).is_ok());
        assert!(require_management(&context_with(vec![RoleName::Employee])).is_err());
        assert!(require_management(&context_with(vec![])).is_err());
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&context_with(vec![RoleName::Admin])).is_ok());
        assert!(require_admin(&context_with(vec![RoleName::Management])).is_err());
    }

    #[test]
    fn test_require_admin_or_management_excludes_team_lead() {
        assert!(require_admin_or_management(&context_with(vec![RoleName::Admin])).is_ok());
        assert!(require_admin_or_management(&context_with(vec![RoleName::Management])).is_ok());
        assert!(require_admin_or_management(&context_with(vec![RoleName::TeamLead])).is_err());
        assert!(require_admin_or_management(&context_with(vec![RoleName::Employee])).is_err());
    }

    #[test]
    fn test_require_self_or_management() {
        let employee = context_with(vec![RoleName::Employee]);
        assert!(require_self_or_management(&employee, employee.user_id).is_ok());
        assert!(require_self_or_management(&employee, Uuid::new_v4()).is_err());

        let manager = context_with(vec![RoleName::Management]);
        assert!(require_self_or_management(&manager, Uuid::new_v4()).is_ok());
    }
}
