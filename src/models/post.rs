use crate::models::UserSummary;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub content: Option<String>,
    /// A direct `http(s)` URL to an externally hosted image.
    pub image_url: Option<String>,
    /// A base64 `data:` URI uploaded to the media host; takes priority over
    /// `image_url` when both are present.
    pub image_data: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub id: i64,
    pub author: UserSummary,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub liked_by_current_user: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Single-post view with its comment thread attached.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostDetail {
    pub id: i64,
    pub author: UserSummary,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: i64,
    pub post_id: i64,
    pub author: UserSummary,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LikeToggleResponse {
    pub liked: bool,
    pub message: String,
}
