use crate::entities::{comment, like, post, user};
use crate::error::ServiceError;
use crate::models::{CommentResponse, PostDetail, PostResponse, UserSummary};
use crate::services::media::{self, MediaClient};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashSet;

/// Outcome of a like toggle; the pair behaves as a presence/absence set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Liked,
    Unliked,
}

/// Persists a new post. The image reference arrives already resolved (either
/// a media-host URL or a caller-supplied external URL); this service only
/// validates that the post is not empty.
pub async fn create_post(
    db: &DatabaseConnection,
    author_id: i64,
    content: Option<String>,
    image_url: Option<String>,
) -> Result<post::Model, ServiceError> {
    let content = content.filter(|c| !c.trim().is_empty());
    let image_url = image_url.filter(|u| !u.is_empty());

    if content.is_none() && image_url.is_none() {
        return Err(ServiceError::Validation(
            "Post cannot be empty. Provide content, an image file, or an image URL.".to_string(),
        ));
    }

    let now = Utc::now();
    let new_post = post::ActiveModel {
        user_id: Set(author_id),
        content: Set(content),
        image_url: Set(image_url),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let post = post::Entity::insert(new_post).exec_with_returning(db).await?;
    Ok(post)
}

/// All posts, newest first, each annotated with like/comment counts and
/// whether the viewer has liked it.
pub async fn public_feed(
    db: &DatabaseConnection,
    viewer_id: i64,
) -> Result<Vec<PostResponse>, ServiceError> {
    let posts = post::Entity::find()
        .find_also_related(user::Entity)
        .order_by_desc(post::Column::CreatedAt)
        .all(db)
        .await?;

    build_post_responses(db, posts, Some(viewer_id)).await
}

pub async fn own_posts(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<PostResponse>, ServiceError> {
    let posts = post::Entity::find()
        .filter(post::Column::UserId.eq(user_id))
        .find_also_related(user::Entity)
        .order_by_desc(post::Column::CreatedAt)
        .all(db)
        .await?;

    build_post_responses(db, posts, Some(user_id)).await
}

pub async fn posts_by_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<PostResponse>, ServiceError> {
    let posts = post::Entity::find()
        .filter(post::Column::UserId.eq(user_id))
        .find_also_related(user::Entity)
        .order_by_desc(post::Column::CreatedAt)
        .all(db)
        .await?;

    build_post_responses(db, posts, None).await
}

pub async fn get_post(db: &DatabaseConnection, post_id: i64) -> Result<PostDetail, ServiceError> {
    let (post, author) = post::Entity::find_by_id(post_id)
        .find_also_related(user::Entity)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("Post not found"))?;
    let author = author.ok_or(ServiceError::NotFound("Post not found"))?;

    let comments = comments(db, post_id).await?;

    Ok(PostDetail {
        id: post.id,
        author: UserSummary::from(author),
        content: post.content,
        image_url: post.image_url,
        created_at: post.created_at,
        comments,
    })
}

/// Deletes a post after an ownership check. A hosted image is removed from
/// the media host first, best-effort; the row delete cascades to comments and
/// likes through the foreign keys.
pub async fn delete_post(
    db: &DatabaseConnection,
    media: &MediaClient,
    requester_id: i64,
    post_id: i64,
) -> Result<(), ServiceError> {
    let post = post::Entity::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("Post not found"))?;

    if post.user_id != requester_id {
        return Err(ServiceError::Forbidden(
            "Not authorized to delete this post",
        ));
    }

    if let Some(image_url) = &post.image_url {
        if media::is_hosted_url(image_url) {
            media.delete_image(image_url).await;
        }
    }

    post.delete(db).await?;
    Ok(())
}

/// Toggles the (user, post) like row inside one transaction, so a concurrent
/// identical request cannot slip between the existence check and the write.
pub async fn toggle_like(
    db: &DatabaseConnection,
    user_id: i64,
    post_id: i64,
) -> Result<LikeOutcome, ServiceError> {
    let txn = db.begin().await?;

    post::Entity::find_by_id(post_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound("Post not found"))?;

    let existing = like::Entity::find()
        .filter(
            Condition::all()
                .add(like::Column::PostId.eq(post_id))
                .add(like::Column::UserId.eq(user_id)),
        )
        .one(&txn)
        .await?;

    let outcome = match existing {
        Some(row) => {
            row.delete(&txn).await?;
            LikeOutcome::Unliked
        }
        None => {
            let new_like = like::ActiveModel {
                post_id: Set(post_id),
                user_id: Set(user_id),
                created_at: Set(Utc::now()),
                ..Default::default()
            };
            like::Entity::insert(new_like).exec(&txn).await?;
            LikeOutcome::Liked
        }
    };

    txn.commit().await?;
    Ok(outcome)
}

pub async fn add_comment(
    db: &DatabaseConnection,
    author_id: i64,
    post_id: i64,
    content: String,
) -> Result<CommentResponse, ServiceError> {
    if content.trim().is_empty() {
        return Err(ServiceError::Validation(
            "Comment content cannot be empty".to_string(),
        ));
    }

    post::Entity::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("Post not found"))?;

    let new_comment = comment::ActiveModel {
        post_id: Set(post_id),
        user_id: Set(author_id),
        content: Set(content),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let comment = comment::Entity::insert(new_comment)
        .exec_with_returning(db)
        .await?;

    let author = user::Entity::find_by_id(author_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("User not found"))?;

    Ok(CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author: UserSummary::from(author),
        content: comment.content,
        created_at: comment.created_at,
    })
}

/// Comments on a post, oldest first, with author identity attached.
pub async fn comments(
    db: &DatabaseConnection,
    post_id: i64,
) -> Result<Vec<CommentResponse>, ServiceError> {
    let rows = comment::Entity::find()
        .filter(comment::Column::PostId.eq(post_id))
        .find_also_related(user::Entity)
        .order_by_asc(comment::Column::CreatedAt)
        .all(db)
        .await?;

    let mut responses = Vec::with_capacity(rows.len());
    for (comment, author) in rows {
        let Some(author) = author else { continue };
        responses.push(CommentResponse {
            id: comment.id,
            post_id: comment.post_id,
            author: UserSummary::from(author),
            content: comment.content,
            created_at: comment.created_at,
        });
    }
    Ok(responses)
}

/// Deletes a comment scoped to its post and author: a comment belonging to a
/// different post or written by someone else is reported as absent.
pub async fn delete_comment(
    db: &DatabaseConnection,
    requester_id: i64,
    post_id: i64,
    comment_id: i64,
) -> Result<(), ServiceError> {
    let comment = comment::Entity::find()
        .filter(
            Condition::all()
                .add(comment::Column::Id.eq(comment_id))
                .add(comment::Column::PostId.eq(post_id))
                .add(comment::Column::UserId.eq(requester_id)),
        )
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("Comment not found"))?;

    comment.delete(db).await?;
    Ok(())
}

async fn build_post_responses(
    db: &DatabaseConnection,
    posts: Vec<(post::Model, Option<user::Model>)>,
    viewer_id: Option<i64>,
) -> Result<Vec<PostResponse>, ServiceError> {
    // One query for everything the viewer has liked, instead of one per post.
    let liked: HashSet<i64> = match viewer_id {
        Some(viewer_id) => like::Entity::find()
            .filter(like::Column::UserId.eq(viewer_id))
            .all(db)
            .await?
            .into_iter()
            .map(|row| row.post_id)
            .collect(),
        None => HashSet::new(),
    };

    let mut responses = Vec::with_capacity(posts.len());
    for (post, author) in posts {
        let Some(author) = author else { continue };

        let like_count = like::Entity::find()
            .filter(like::Column::PostId.eq(post.id))
            .count(db)
            .await? as i64;
        let comment_count = comment::Entity::find()
            .filter(comment::Column::PostId.eq(post.id))
            .count(db)
            .await? as i64;

        responses.push(PostResponse {
            id: post.id,
            author: UserSummary::from(author),
            content: post.content,
            image_url: post.image_url,
            like_count,
            comment_count,
            liked_by_current_user: liked.contains(&post.id),
            created_at: post.created_at,
        });
    }
    Ok(responses)
}
