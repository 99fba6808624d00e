use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::error::ServiceError;
use crate::models::{
    CommentRequest, CommentResponse, CreatePostRequest, LikeToggleResponse, PostDetail,
    PostResponse,
};
use crate::services::media::{self, MediaClient};
use crate::services::posts::{self, LikeOutcome};
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created"),
        (status = 400, description = "Post is empty or image reference invalid"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "posts"
)]
pub async fn create_post(
    req: web::Json<CreatePostRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    media: web::Data<MediaClient>,
) -> ActixResult<HttpResponse> {
    let req = req.into_inner();

    // Resolve the image reference: uploaded data wins over a direct URL.
    let image_url = if let Some(data) = req.image_data.as_deref().filter(|d| !d.is_empty()) {
        media::validate_data_uri(data)?;
        Some(media.upload_image(data, "hangouts").await?)
    } else if let Some(url) = req.image_url.as_deref().filter(|u| !u.is_empty()) {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ServiceError::Validation(
                "Invalid image URL provided. Must start with http:// or https://.".to_string(),
            )
            .into());
        }
        Some(url.to_string())
    } else {
        None
    };

    let post = posts::create_post(pool.get_ref(), user.user_id, req.content, image_url).await?;
    Ok(HttpResponse::Created().json(post))
}

#[utoipa::path(
    get,
    path = "/api/posts/public",
    responses(
        (status = 200, description = "All posts, newest first, annotated for the viewer", body = Vec<PostResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "posts"
)]
pub async fn public_feed(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let feed = posts::public_feed(pool.get_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok().json(feed))
}

#[utoipa::path(
    get,
    path = "/api/posts/mine",
    responses(
        (status = 200, description = "Own posts, newest first", body = Vec<PostResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "posts"
)]
pub async fn my_posts(user: AuthenticatedUser, pool: web::Data<DbPool>) -> ActixResult<HttpResponse> {
    let posts = posts::own_posts(pool.get_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok().json(posts))
}

#[utoipa::path(
    get,
    path = "/api/posts/user/{user_id}",
    params(("user_id" = i64, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Posts by the given user, newest first", body = Vec<PostResponse>)
    ),
    tag = "posts"
)]
pub async fn user_posts(path: web::Path<i64>, pool: web::Data<DbPool>) -> ActixResult<HttpResponse> {
    let user_id = path.into_inner();
    let posts = posts::posts_by_user(pool.get_ref(), user_id).await?;
    Ok(HttpResponse::Ok().json(posts))
}

#[utoipa::path(
    get,
    path = "/api/posts/{post_id}",
    params(("post_id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post with its comments", body = PostDetail),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn get_post(path: web::Path<i64>, pool: web::Data<DbPool>) -> ActixResult<HttpResponse> {
    let post_id = path.into_inner();
    let post = posts::get_post(pool.get_ref(), post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{post_id}",
    params(("post_id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer_auth" = [])),
    tag = "posts"
)]
pub async fn delete_post(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    media: web::Data<MediaClient>,
) -> ActixResult<HttpResponse> {
    let post_id = path.into_inner();
    posts::delete_post(pool.get_ref(), media.get_ref(), user.user_id, post_id).await?;
    Ok(HttpResponse::Ok().json(json!({"message": "Post deleted successfully"})))
}

#[utoipa::path(
    post,
    path = "/api/posts/{post_id}/like",
    params(("post_id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Like toggled", body = LikeToggleResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer_auth" = [])),
    tag = "posts"
)]
pub async fn toggle_like(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let post_id = path.into_inner();
    let outcome = posts::toggle_like(pool.get_ref(), user.user_id, post_id).await?;
    let (liked, message) = match outcome {
        LikeOutcome::Liked => (true, "Liked"),
        LikeOutcome::Unliked => (false, "Unliked"),
    };
    Ok(HttpResponse::Ok().json(LikeToggleResponse {
        liked,
        message: message.to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/posts/{post_id}/comments",
    request_body = CommentRequest,
    params(("post_id" = i64, Path, description = "Post ID")),
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Empty comment"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer_auth" = [])),
    tag = "posts"
)]
pub async fn add_comment(
    path: web::Path<i64>,
    req: web::Json<CommentRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let post_id = path.into_inner();
    let comment =
        posts::add_comment(pool.get_ref(), user.user_id, post_id, req.content.clone()).await?;
    Ok(HttpResponse::Created().json(comment))
}

#[utoipa::path(
    get,
    path = "/api/posts/{post_id}/comments",
    params(("post_id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = Vec<CommentResponse>)
    ),
    tag = "posts"
)]
pub async fn get_comments(
    path: web::Path<i64>,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let post_id = path.into_inner();
    let comments = posts::comments(pool.get_ref(), post_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{post_id}/comments/{comment_id}",
    params(
        ("post_id" = i64, Path, description = "Post ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Comment not found for this post and author")
    ),
    security(("bearer_auth" = [])),
    tag = "posts"
)]
pub async fn delete_comment(
    path: web::Path<(i64, i64)>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    posts::delete_comment(pool.get_ref(), user.user_id, post_id, comment_id).await?;
    Ok(HttpResponse::Ok().json(json!({"message": "Comment deleted successfully"})))
}
