use crate::entities::{comment, follow, like, post, user};
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};

/// Creates the five tables from the entity definitions, plus the composite
/// unique indexes that fence duplicate likes and follow edges. Statements are
/// generated per backend, so the same code serves MySQL and the SQLite
/// databases used by the test suite.
pub async fn setup(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut tables = [
        schema.create_table_from_entity(user::Entity),
        schema.create_table_from_entity(post::Entity),
        schema.create_table_from_entity(comment::Entity),
        schema.create_table_from_entity(like::Entity),
        schema.create_table_from_entity(follow::Entity),
    ];

    for stmt in &mut tables {
        stmt.if_not_exists();
        db.execute(backend.build(&*stmt)).await?;
    }

    let indexes = [
        Index::create()
            .name("uniq_likes_user_post")
            .table(like::Entity)
            .col(like::Column::UserId)
            .col(like::Column::PostId)
            .unique()
            .to_owned(),
        Index::create()
            .name("uniq_follows_follower_followed")
            .table(follow::Entity)
            .col(follow::Column::FollowerId)
            .col(follow::Column::FollowedId)
            .unique()
            .to_owned(),
    ];

    for stmt in &indexes {
        // MySQL has no CREATE INDEX IF NOT EXISTS; on a restarted server the
        // duplicate-index error is expected and skipped. Anything else is a
        // real failure and propagates.
        if let Err(err) = db.execute(backend.build(stmt)).await {
            let msg = err.to_string();
            if msg.contains("Duplicate key name") || msg.contains("already exists") {
                log::debug!("Index already present: {}", msg);
            } else {
                return Err(err);
            }
        }
    }

    Ok(())
}
