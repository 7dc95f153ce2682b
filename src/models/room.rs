use serde::{Deserialize, Serialize};

use super::user::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(default)]
    pub users: Vec<User>,

    /// Users waiting for an admin to accept their join request.
    #[serde(default)]
    pub requests: Vec<User>,
}

impl Room {
    #[must_use]
    pub fn has_member(&self, user_id: i64) -> bool {
        self.users.iter().any(|u| u.id == user_id)
    }

    #[must_use]
    pub fn has_pending_request(&self, user_id: i64) -> bool {
        self.requests.iter().any(|u| u.id == user_id)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateRoomRequest {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<Vec<i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_ids: Option<Vec<i64>>,
}

/// Accept or reject pending join requests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HandleUsersRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<Vec<i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject: Option<Vec<i64>>,
}
