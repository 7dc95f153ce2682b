pub mod auth_service;
pub use auth_service::{AuthError, AuthService, Reconciliation};

pub mod auth_service_impl;
pub use auth_service_impl::{DefaultAuthService, is_username_conflict};

pub mod credentials;
pub use credentials::{CredentialGenerator, GenerationError, OsRandom, RandomSource};
