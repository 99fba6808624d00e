use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::models::FollowUser;
use crate::services::graph;
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/users/{id}/follow",
    params(("id" = i64, Path, description = "User to follow")),
    responses(
        (status = 200, description = "Followed successfully"),
        (status = 400, description = "Cannot follow yourself"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "follow"
)]
pub async fn follow_user(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let followed_id = path.into_inner();
    graph::follow(pool.get_ref(), user.user_id, followed_id).await?;
    Ok(HttpResponse::Ok().json(json!({"message": "Followed successfully"})))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/unfollow",
    params(("id" = i64, Path, description = "User to unfollow")),
    responses(
        (status = 200, description = "Unfollowed successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "follow"
)]
pub async fn unfollow_user(
    path: web::Path<i64>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let followed_id = path.into_inner();
    graph::unfollow(pool.get_ref(), user.user_id, followed_id).await?;
    Ok(HttpResponse::Ok().json(json!({"message": "Unfollowed successfully"})))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/followers",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Users following this user", body = Vec<FollowUser>),
        (status = 404, description = "User not found")
    ),
    tag = "follow"
)]
pub async fn followers(path: web::Path<i64>, pool: web::Data<DbPool>) -> ActixResult<HttpResponse> {
    let user_id = path.into_inner();
    let users = graph::followers(pool.get_ref(), user_id).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/following",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Users this user follows", body = Vec<FollowUser>),
        (status = 404, description = "User not found")
    ),
    tag = "follow"
)]
pub async fn following(path: web::Path<i64>, pool: web::Data<DbPool>) -> ActixResult<HttpResponse> {
    let user_id = path.into_inner();
    let users = graph::following(pool.get_ref(), user_id).await?;
    Ok(HttpResponse::Ok().json(users))
}
