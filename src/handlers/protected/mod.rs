// handlers/protected/mod.rs - Handlers behind jwt_auth_middleware
//
// Every handler here takes a `CurrentUser`, which re-reads the caller's
// account and role from the store, then checks the permission it needs.
pub mod content;
pub mod session;
pub mod user_types;
pub mod users;
