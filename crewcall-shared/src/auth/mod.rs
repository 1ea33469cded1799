/// Authentication and authorization
///
/// - `password`: Argon2id hashing and strength checks
/// - `jwt`: HS256 access/refresh token pair
/// - `middleware`: Axum Bearer-token middleware producing an `AuthContext`
/// - `authorization`: role checks over the auth context
pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use authorization::{
    require_admin, require_admin_or_management, require_management, require_self_or_management,
    AuthzError,
};
pub use jwt::{
    create_token, issue_token_pair, validate_access_token, validate_refresh_token,
    validate_token, Claims, JwtError, TokenPair, TokenType,
};
pub use middleware::{authenticate, bearer_token, AuthContext, AuthError};
pub use password::{hash_password, validate_password_strength, verify_password, PasswordError};
