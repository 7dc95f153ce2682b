pub mod auth;

pub use auth::{AuthEvent, AuthPhase, AuthState};
