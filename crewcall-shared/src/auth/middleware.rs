/// Bearer-token authentication for Axum
///
/// [`authenticate`] validates the Bearer token from the Authorization header
/// and builds an [`AuthContext`]; the server's middleware layer inserts it
/// into request extensions, where handlers pick it up with Axum's
/// `Extension` extractor.
///
/// Role names are carried in the token, so the middleware performs no
/// database work; role membership is as of token issue time.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use crewcall_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.email)
/// }
/// ```
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::jwt::{validate_access_token, Claims, JwtError};
use crate::models::role::RoleName;

/// Authentication context added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// User's email address
    pub email: String,

    /// Role names held at token issue time
    pub roles: Vec<RoleName>,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    ///
    /// Unknown role strings are dropped rather than failing the request.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email.clone(),
            roles: claims
                .roles
                .iter()
                .filter_map(|name| name.parse().ok())
                .collect(),
        }
    }

    /// Checks whether the user holds a specific role
    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(&role)
    }

    /// Checks whether the user is in the management tier
    /// (admin, management, or team_lead)
    pub fn is_management(&self) -> bool {
        self.roles.iter().any(|r| r.is_management_tier())
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => (StatusCode::UNAUTHORIZED, msg),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (
            status,
            Json(json!({
                "error": "unauthorized",
                "message": message,
            })),
        )
            .into_response()
    }
}

/// Extracts and validates the Bearer token from request headers
///
/// Shared by the middleware below and by handlers that authenticate
/// out-of-band (e.g. the refresh endpoint validates a refresh token itself).
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Validates the Bearer access token and builds an [`AuthContext`]
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    Ok(AuthContext::from_claims(&claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims, TokenType};

    fn claims_for(roles: Vec<&str>) -> Claims {
        Claims::new(
            Uuid::new_v4(),
            "worker@example.com",
            roles.into_iter().map(String::from).collect(),
            TokenType::Access,
        )
    }

    #[test]
    fn test_context_from_claims() {
        let claims = claims_for(vec!["employee", "team_lead"]);
        let context = AuthContext::from_claims(&claims);

        assert_eq!(context.user_id, claims.sub);
        assert_eq!(context.email, "worker@example.com");
        assert!(context.has_role(RoleName::Employee));
        assert!(context.has_role(RoleName::TeamLead));
        assert!(context.is_management());
    }

    #[test]
    fn test_unknown_roles_dropped() {
        let claims = claims_for(vec!["employee", "superhero"]);
        let context = AuthContext::from_claims(&claims);

        assert_eq!(context.roles, vec![RoleName::Employee]);
        assert!(!context.is_management());
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingCredentials)
        ));

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::InvalidFormat(_))
        ));

        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_authenticate_rejects_refresh_token() {
        let secret = "test-secret-key-at-least-32-bytes-long";
        let claims = Claims::new(
            Uuid::new_v4(),
            "worker@example.com",
            vec!["employee".to_string()],
            TokenType::Refresh,
        );
        let token = create_token(&claims, secret).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );

        assert!(matches!(
            authenticate(&headers, secret),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_authenticate_accepts_access_token() {
        let secret = "test-secret-key-at-least-32-bytes-long";
        let claims = claims_for(vec!["management"]);
        let token = create_token(&claims, secret).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );

        let context = authenticate(&headers, secret).unwrap();
        assert_eq!(context.user_id, claims.sub);
        assert!(context.is_management());
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidToken("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
