pub mod credentials;
pub mod room;
pub mod user;

pub use credentials::StoredCredentials;
pub use room::Room;
pub use user::{AuthToken, Session, User};
