/// Route handlers, one module per resource
pub mod auth;
pub mod events;
pub mod health;
pub mod shifts;
pub mod users;
