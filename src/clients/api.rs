//! Client for the PlayParty REST API.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::constants::DEFAULT_API_URL;
use crate::models::room::{CreateRoomRequest, HandleUsersRequest, UpdateRoomRequest};
use crate::models::{AuthToken, Room, User};

const FALLBACK_ERROR_MESSAGE: &str = "Request failed";

/// Failure talking to the remote API.
///
/// `Display` is the message the server gave (or a transport description), so
/// callers that classify failures by text look at `to_string()`.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Token envelope returned by `/auth/register` and `/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(rename = "type", default)]
    pub token_type: String,
    pub token: AuthToken,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct RoomsResponse {
    rooms: Vec<Room>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    message: Option<String>,
}

/// Remote auth service as seen by the identity flows.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> Result<TokenResponse, RemoteError>;

    async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, RemoteError>;

    async fn get_user(&self, token: &AuthToken) -> Result<User, RemoteError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(Client::new(), DEFAULT_API_URL)
    }
}

impl ApiClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, endpoint: &str, token: Option<&AuthToken>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        let builder = self.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, RemoteError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = extract_error_message(&body);
            debug!("API request failed: {} - {}", status, message);
            return Err(RemoteError::rejected(status.as_u16(), message));
        }

        Ok(response.json().await?)
    }

    pub async fn update_user(
        &self,
        token: &AuthToken,
        request: &UpdateUserRequest,
    ) -> Result<User, RemoteError> {
        self.send(self.request(Method::PUT, "/auth/user", Some(token)).json(request))
            .await
    }

    pub async fn delete_user(&self, token: &AuthToken) -> Result<MessageResponse, RemoteError> {
        self.send(self.request(Method::DELETE, "/auth/user", Some(token)))
            .await
    }

    pub async fn list_rooms(&self, token: &AuthToken) -> Result<Vec<Room>, RemoteError> {
        let response: RoomsResponse = self
            .send(self.request(Method::GET, "/rooms", Some(token)))
            .await?;
        Ok(response.rooms)
    }

    pub async fn create_room(
        &self,
        token: &AuthToken,
        request: &CreateRoomRequest,
    ) -> Result<Room, RemoteError> {
        self.send(self.request(Method::POST, "/room", Some(token)).json(request))
            .await
    }

    pub async fn get_room(&self, token: &AuthToken, id: &str) -> Result<Room, RemoteError> {
        let endpoint = format!("/room/{}", urlencoding::encode(id));
        self.send(self.request(Method::GET, &endpoint, Some(token)))
            .await
    }

    pub async fn update_room(
        &self,
        token: &AuthToken,
        id: &str,
        request: &UpdateRoomRequest,
    ) -> Result<Room, RemoteError> {
        let endpoint = format!("/room/{}", urlencoding::encode(id));
        self.send(self.request(Method::PUT, &endpoint, Some(token)).json(request))
            .await
    }

    pub async fn delete_room(
        &self,
        token: &AuthToken,
        id: &str,
    ) -> Result<MessageResponse, RemoteError> {
        let endpoint = format!("/room/{}", urlencoding::encode(id));
        self.send(self.request(Method::DELETE, &endpoint, Some(token)))
            .await
    }

    pub async fn join_room(
        &self,
        token: &AuthToken,
        id: &str,
    ) -> Result<MessageResponse, RemoteError> {
        let endpoint = format!("/room/join/{}", urlencoding::encode(id));
        self.send(self.request(Method::POST, &endpoint, Some(token)))
            .await
    }

    pub async fn leave_room(
        &self,
        token: &AuthToken,
        id: &str,
    ) -> Result<MessageResponse, RemoteError> {
        let endpoint = format!("/room/leave/{}", urlencoding::encode(id));
        self.send(self.request(Method::POST, &endpoint, Some(token)))
            .await
    }

    pub async fn handle_room_users(
        &self,
        token: &AuthToken,
        id: &str,
        request: &HandleUsersRequest,
    ) -> Result<Room, RemoteError> {
        let endpoint = format!("/room/handle-user/{}", urlencoding::encode(id));
        self.send(self.request(Method::POST, &endpoint, Some(token)).json(request))
            .await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn register(&self, request: &RegisterRequest) -> Result<TokenResponse, RemoteError> {
        self.send(self.request(Method::POST, "/auth/register", None).json(request))
            .await
    }

    async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, RemoteError> {
        self.send(self.request(Method::POST, "/auth/login", None).json(request))
            .await
    }

    async fn get_user(&self, token: &AuthToken) -> Result<User, RemoteError> {
        self.send(self.request(Method::GET, "/auth/user", Some(token)))
            .await
    }
}

/// First `errors[].message` of an error body, or a generic message.
fn extract_error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.errors.into_iter().next())
        .and_then(|e| e.message)
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}
