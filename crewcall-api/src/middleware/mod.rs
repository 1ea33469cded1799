/// HTTP middleware
pub mod security;
