use crate::entities::user;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: Option<String>,
    pub username: String,
    pub name: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            username: user.username,
            name: user.name,
        }
    }
}

/// Author identity attached to posts and comments.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl From<user::Model> for UserSummary {
    fn from(user: user::Model) -> Self {
        UserSummary {
            id: user.id,
            username: user.username,
            name: user.name,
            avatar_url: user.avatar_url,
        }
    }
}

/// One side of a follow edge, as returned by the followers/following lists.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FollowUser {
    pub id: i64,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl From<user::Model> for FollowUser {
    fn from(user: user::Model) -> Self {
        FollowUser {
            id: user.id,
            username: user.username,
            avatar_url: user.avatar_url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub name: String,
    /// Present only on the authenticated own-profile view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub followers: Vec<i64>,
    pub following: Vec<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    /// A direct `http(s)` URL, or an empty string to remove the avatar.
    pub avatar_url: Option<String>,
    /// A base64 `data:` URI; takes priority over `avatar_url` when present.
    pub avatar_data: Option<String>,
}
