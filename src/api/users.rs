use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::models::{ProfileResponse, UpdateProfileRequest};
use crate::services::media::MediaClient;
use crate::services::users;
use actix_web::{web, HttpResponse, Result as ActixResult};

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Own profile with follower/following ids", body = ProfileResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn me(user: AuthenticatedUser, pool: web::Data<DbPool>) -> ActixResult<HttpResponse> {
    let profile = users::profile(pool.get_ref(), user.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Invalid avatar reference or bio too long"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_me(
    req: web::Json<UpdateProfileRequest>,
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    media: web::Data<MediaClient>,
) -> ActixResult<HttpResponse> {
    let profile = users::update_profile(
        pool.get_ref(),
        media.get_ref(),
        user.user_id,
        req.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[utoipa::path(
    get,
    path = "/api/users/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "Public profile", body = ProfileResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn profile_by_username(
    path: web::Path<String>,
    pool: web::Data<DbPool>,
) -> ActixResult<HttpResponse> {
    let username = path.into_inner();
    let profile = users::profile_by_username(pool.get_ref(), &username).await?;
    Ok(HttpResponse::Ok().json(profile))
}
