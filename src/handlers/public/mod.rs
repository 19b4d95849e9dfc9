// handlers/public/mod.rs - Handlers reachable without a token
pub mod auth;
pub mod content;
