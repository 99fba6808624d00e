pub mod auth;
pub mod follow;
pub mod posts;
pub mod users;

use crate::models::{
    AuthResponse, CommentRequest, CommentResponse, CreatePostRequest, FollowUser,
    LikeToggleResponse, LoginRequest, PostDetail, PostResponse, ProfileResponse, RegisterRequest,
    UpdateProfileRequest, UserResponse, UserSummary,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth endpoints
        auth::register,
        auth::login,
        // Profile endpoints
        users::me,
        users::update_me,
        users::profile_by_username,
        // Social graph endpoints
        follow::follow_user,
        follow::unfollow_user,
        follow::followers,
        follow::following,
        // Post endpoints
        posts::create_post,
        posts::public_feed,
        posts::my_posts,
        posts::user_posts,
        posts::get_post,
        posts::delete_post,
        posts::toggle_like,
        posts::add_comment,
        posts::get_comments,
        posts::delete_comment,
    ),
    components(schemas(
        // Auth schemas
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        UserResponse,
        // Profile schemas
        ProfileResponse,
        UpdateProfileRequest,
        UserSummary,
        FollowUser,
        // Post schemas
        CreatePostRequest,
        PostResponse,
        PostDetail,
        CommentRequest,
        CommentResponse,
        LikeToggleResponse,
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Profile endpoints"),
        (name = "follow", description = "Social graph endpoints"),
        (name = "posts", description = "Posts, likes and comments"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

use utoipa::Modify;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
