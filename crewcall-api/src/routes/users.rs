/// User administration endpoints
///
/// # Endpoints
///
/// - `GET   /v1/users` - List users with roles (management)
/// - `GET   /v1/users/:id` - Single user with roles (management or self)
/// - `PATCH /v1/users/:id` - Profile update (management or self)
/// - `PUT   /v1/users/:id/roles` - Replace role set (admin)
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use crewcall_shared::{
    auth::{
        authorization::{require_admin, require_management, require_self_or_management},
        middleware::AuthContext,
        password::{hash_password, validate_password_strength},
    },
    models::{
        role::{Role, RoleName},
        user::{UpdateUser, User},
        Page,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Pagination parameters for the user listing
#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl UserListQuery {
    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    fn limit(&self) -> u32 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

/// User with their roles
#[derive(Debug, Serialize)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<RoleName>,
}

/// Profile update request; unset fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,

    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,

    /// New password; checked for strength and re-hashed before storage
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

/// Role replacement request
#[derive(Debug, Deserialize)]
pub struct ReplaceRolesRequest {
    pub roles: Vec<RoleName>,
}

/// Paginated user listing with roles (management tier)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<Page<UserWithRoles>>> {
    require_management(&auth)?;

    let limit = query.limit() as i64;
    let offset = (query.page() as i64 - 1) * limit;

    let total = User::count(&state.db).await?;
    let users = User::list(&state.db, limit, offset).await?;

    let mut data = Vec::with_capacity(users.len());
    for user in users {
        let roles = Role::list_for_user(&state.db, user.id).await?;
        data.push(UserWithRoles { user, roles });
    }

    Ok(Json(Page::new(data, total, query.page(), query.limit())))
}

/// Single user with roles (management tier, or the user themselves)
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserWithRoles>> {
    require_self_or_management(&auth, id)?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let roles = Role::list_for_user(&state.db, user.id).await?;

    Ok(Json(UserWithRoles { user, roles }))
}

/// Profile update (management tier, or the user themselves)
///
/// A password change goes through the same strength check and Argon2id
/// hashing as registration.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserWithRoles>> {
    require_self_or_management(&auth, id)?;
    req.validate()?;

    let password_hash = match req.password {
        Some(ref password) => {
            validate_password_strength(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            password_hash,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let roles = Role::list_for_user(&state.db, user.id).await?;

    tracing::info!(user_id = %id, updated_by = %auth.user_id, "User profile updated");
    Ok(Json(UserWithRoles { user, roles }))
}

/// Replace a user's role set (admin only)
pub async fn replace_roles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReplaceRolesRequest>,
) -> ApiResult<Json<UserWithRoles>> {
    require_admin(&auth)?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Role::replace_for_user(&state.db, id, &req.roles).await?;
    let roles = Role::list_for_user(&state.db, id).await?;

    tracing::info!(user_id = %id, changed_by = %auth.user_id, "User roles replaced");
    Ok(Json(UserWithRoles { user, roles }))
}
