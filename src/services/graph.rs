use crate::entities::{follow, user};
use crate::error::ServiceError;
use crate::models::FollowUser;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
};

/// Inserts a follower -> followed edge. A self-loop is rejected, the followed
/// user must exist, and re-following an already followed user is a no-op (the
/// unique index on the pair backs this up under concurrent requests).
pub async fn follow(
    db: &DatabaseConnection,
    follower_id: i64,
    followed_id: i64,
) -> Result<(), ServiceError> {
    if follower_id == followed_id {
        return Err(ServiceError::SelfFollow);
    }

    user::Entity::find_by_id(followed_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("User not found"))?;

    let existing = follow::Entity::find()
        .filter(
            Condition::all()
                .add(follow::Column::FollowerId.eq(follower_id))
                .add(follow::Column::FollowedId.eq(followed_id)),
        )
        .one(db)
        .await?;

    if existing.is_some() {
        return Ok(());
    }

    let edge = follow::ActiveModel {
        follower_id: Set(follower_id),
        followed_id: Set(followed_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    if let Err(err) = follow::Entity::insert(edge).exec(db).await {
        // A concurrent follow that beat this one to the unique index keeps
        // the operation idempotent.
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {}
            _ => return Err(err.into()),
        }
    }

    Ok(())
}

/// Removes the edge if present; removing an absent edge succeeds.
pub async fn unfollow(
    db: &DatabaseConnection,
    follower_id: i64,
    followed_id: i64,
) -> Result<(), ServiceError> {
    user::Entity::find_by_id(followed_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("User not found"))?;

    follow::Entity::delete_many()
        .filter(
            Condition::all()
                .add(follow::Column::FollowerId.eq(follower_id))
                .add(follow::Column::FollowedId.eq(followed_id)),
        )
        .exec(db)
        .await?;

    Ok(())
}

pub async fn followers(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<FollowUser>, ServiceError> {
    let user = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("User not found"))?;

    let users = user.find_linked(user::FollowersLink).all(db).await?;
    Ok(users.into_iter().map(FollowUser::from).collect())
}

pub async fn following(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<FollowUser>, ServiceError> {
    let user = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("User not found"))?;

    let users = user.find_linked(user::FollowingLink).all(db).await?;
    Ok(users.into_iter().map(FollowUser::from).collect())
}
