pub mod api;

pub use api::{ApiClient, AuthApi, RemoteError};
