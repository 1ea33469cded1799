/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register a new user (gets the employee role)
/// - `POST /v1/auth/login` - Login and get a token pair
/// - `POST /v1/auth/refresh` - Exchange a refresh token for a new pair
/// - `GET  /v1/auth/me` - Current user with roles
/// - `POST /v1/auth/logout` - Stateless acknowledgement
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use crewcall_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::{
        role::{Role, RoleName},
        user::{CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (also checked for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Given name
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    /// Family name
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    /// Optional phone number
    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Response carrying the user, their roles, and a token pair
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The authenticated user (password hash never serialized)
    pub user: User,

    /// Role names held by the user
    pub roles: Vec<RoleName>,

    /// Access token (15m)
    pub access_token: String,

    /// Refresh token (7d)
    pub refresh_token: String,
}

/// Current-user response
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub roles: Vec<RoleName>,
}

fn role_strings(roles: &[RoleName]) -> Vec<String> {
    roles.iter().map(|r| r.to_string()).collect()
}

/// Register a new user
///
/// Creates the account, grants the `employee` role, and returns the user
/// with a fresh token pair, 201.
///
/// # Errors
///
/// - `422`: request validation failed
/// - `400`: password too weak
/// - `409`: email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;
    password::validate_password_strength(&req.password)?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
        },
    )
    .await?;

    Role::grant_to_user(&state.db, user.id, RoleName::Employee).await?;
    let roles = vec![RoleName::Employee];

    let pair = jwt::issue_token_pair(
        user.id,
        &user.email,
        role_strings(&roles),
        state.jwt_secret(),
    )?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user,
            roles,
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }),
    ))
}

/// Login with email and password
///
/// A wrong email and a wrong password both return the same 401 so account
/// existence is not leaked.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    User::touch_last_login(&state.db, user.id).await?;

    let roles = Role::list_for_user(&state.db, user.id).await?;
    let pair = jwt::issue_token_pair(
        user.id,
        &user.email,
        role_strings(&roles),
        state.jwt_secret(),
    )?;

    Ok(Json(AuthResponse {
        user,
        roles,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// Exchange a refresh token for a new token pair
///
/// Roles are re-read from the database, so role changes take effect on the
/// next refresh rather than waiting for the token to expire.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    let roles = Role::list_for_user(&state.db, user.id).await?;
    let pair = jwt::issue_token_pair(
        user.id,
        &user.email,
        role_strings(&roles),
        state.jwt_secret(),
    )?;

    Ok(Json(AuthResponse {
        user,
        roles,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// Current user with roles
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MeResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let roles = Role::list_for_user(&state.db, user.id).await?;

    Ok(Json(MeResponse { user, roles }))
}

/// Logout acknowledgement
///
/// Tokens are stateless, so there is nothing to revoke server-side; clients
/// discard their tokens.
pub async fn logout(
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<serde_json::Value>> {
    tracing::info!(user_id = %auth.user_id, "User logged out");

    Ok(Json(json!({ "message": "Logged out" })))
}
