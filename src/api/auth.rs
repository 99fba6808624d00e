use crate::auth::{create_token, hash_password, verify_password, Claims};
use crate::config::Config;
use crate::db::DbPool;
use crate::entities::user;
use crate::error::ServiceError;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use actix_web::{web, HttpResponse, Result as ActixResult};
use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, Set};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Missing required fields"),
        (status = 409, description = "Email or username already in use")
    ),
    tag = "auth"
)]
pub async fn register(
    req: web::Json<RegisterRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ActixResult<HttpResponse> {
    if req.email.trim().is_empty()
        || req.password.is_empty()
        || req.username.trim().is_empty()
        || req.name.trim().is_empty()
    {
        return Err(ServiceError::Validation("All fields are required.".to_string()).into());
    }

    let existing_user = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(&req.email))
                .add(user::Column::Username.eq(&req.username)),
        )
        .one(pool.get_ref())
        .await
        .map_err(ServiceError::from)?;

    if existing_user.is_some() {
        return Err(ServiceError::Conflict(
            "User with this email or username already exists".to_string(),
        )
        .into());
    }

    let password_hash =
        hash_password(&req.password).map_err(actix_web::error::ErrorInternalServerError)?;

    let now = Utc::now();
    let new_user = user::ActiveModel {
        email: Set(Some(req.email.clone())),
        username: Set(req.username.clone()),
        name: Set(req.name.clone()),
        password_hash: Set(Some(password_hash)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    // The existence check above is check-then-insert; a concurrent duplicate
    // lands on the unique index instead and is reported as a conflict.
    let user = user::Entity::insert(new_user)
        .exec_with_returning(pool.get_ref())
        .await
        .map_err(|err| {
            ServiceError::conflict_on_unique(
                err,
                "User with this email or username already exists",
            )
        })?;

    let claims = Claims::new(
        user.id,
        user.username.clone(),
        user.email.clone(),
        config.jwt.expiration_hours,
    );
    let token = create_token(&claims, &config.jwt.secret)
        .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    req: web::Json<LoginRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ActixResult<HttpResponse> {
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(pool.get_ref())
        .await
        .map_err(ServiceError::from)?;

    // OAuth-only accounts have no password hash; their credential is the
    // provider's, so a password login is rejected the same way.
    let user = match user {
        Some(u) if u.password_hash.is_some() => u,
        _ => return Err(ServiceError::Unauthenticated("Invalid credentials.").into()),
    };

    let password_hash = user.password_hash.as_deref().unwrap_or_default();
    let is_valid = verify_password(&req.password, password_hash)
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if !is_valid {
        return Err(ServiceError::Unauthenticated("Invalid credentials.").into());
    }

    let claims = Claims::new(
        user.id,
        user.username.clone(),
        user.email.clone(),
        config.jwt.expiration_hours,
    );
    let token = create_token(&claims, &config.jwt.secret)
        .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}
