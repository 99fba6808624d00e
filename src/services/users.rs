use crate::entities::user;
use crate::error::ServiceError;
use crate::models::{ProfileResponse, UpdateProfileRequest};
use crate::services::media::{self, MediaClient};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
};

const MAX_BIO_LENGTH: usize = 160;

pub async fn profile(db: &DatabaseConnection, user_id: i64) -> Result<ProfileResponse, ServiceError> {
    let user = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("User not found"))?;

    build_profile(db, user).await
}

/// Public profile lookup. The email address stays private to the owner, so
/// it is stripped before the profile leaves the service.
pub async fn profile_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<ProfileResponse, ServiceError> {
    let user = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("User not found"))?;

    let mut profile = build_profile(db, user).await?;
    profile.email = None;
    Ok(profile)
}

/// Updates name/bio and resolves the avatar the way the post image is
/// resolved: uploaded data wins over a direct URL, and an empty URL removes
/// the avatar. Replaced or removed hosted assets are deleted best-effort.
pub async fn update_profile(
    db: &DatabaseConnection,
    media: &MediaClient,
    user_id: i64,
    req: UpdateProfileRequest,
) -> Result<ProfileResponse, ServiceError> {
    let user = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("User not found"))?;

    if let Some(bio) = &req.bio {
        if bio.chars().count() > MAX_BIO_LENGTH {
            return Err(ServiceError::Validation(format!(
                "Bio must be at most {} characters",
                MAX_BIO_LENGTH
            )));
        }
    }

    let mut avatar_url = user.avatar_url.clone();

    if let Some(data) = req.avatar_data.as_deref().filter(|d| !d.is_empty()) {
        media::validate_data_uri(data)?;
        if let Some(old) = &user.avatar_url {
            if media::is_hosted_url(old) {
                media.delete_image(old).await;
            }
        }
        avatar_url = Some(media.upload_image(data, "avatars_hangouts").await?);
    } else if let Some(url) = &req.avatar_url {
        if url.is_empty() {
            // Explicit removal request.
            if let Some(old) = &user.avatar_url {
                if media::is_hosted_url(old) {
                    media.delete_image(old).await;
                }
            }
            avatar_url = None;
        } else if url.starts_with("http://") || url.starts_with("https://") {
            avatar_url = Some(url.clone());
        } else {
            return Err(ServiceError::Validation(
                "Invalid avatar URL provided. Must start with http:// or https://, or be empty to remove."
                    .to_string(),
            ));
        }
    }

    let mut active: user::ActiveModel = user.clone().into();
    if let Some(name) = req.name {
        active.name = Set(name);
    }
    if let Some(bio) = req.bio {
        active.bio = Set(Some(bio));
    }
    active.avatar_url = Set(avatar_url);
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    build_profile(db, updated).await
}

async fn build_profile(
    db: &DatabaseConnection,
    user: user::Model,
) -> Result<ProfileResponse, ServiceError> {
    let followers = user
        .find_linked(user::FollowersLink)
        .all(db)
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect();
    let following = user
        .find_linked(user::FollowingLink)
        .all(db)
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect();

    Ok(ProfileResponse {
        id: user.id,
        username: user.username,
        name: user.name,
        email: user.email,
        avatar_url: user.avatar_url,
        bio: user.bio,
        followers,
        following,
    })
}
