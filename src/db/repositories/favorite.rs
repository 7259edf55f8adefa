use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::db::{StoreResult, conflict_on_unique};
use crate::entities::favorites;
use crate::models::NewFavorite;

pub struct FavoriteRepository {
    conn: DatabaseConnection,
}

impl FavoriteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> StoreResult<Vec<favorites::Model>> {
        Ok(favorites::Entity::find()
            .order_by_asc(favorites::Column::Id)
            .all(&self.conn)
            .await?)
    }

    /// The `(user_id, course_id)` unique index rejects duplicates.
    pub async fn create(&self, favorite: NewFavorite) -> StoreResult<favorites::Model> {
        let active = favorites::ActiveModel {
            user_id: Set(favorite.user_id),
            course_id: Set(favorite.course_id),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .map_err(|e| conflict_on_unique(e, "course is already favorite"))
    }

    pub async fn delete(&self, id: i32) -> StoreResult<bool> {
        let result = favorites::Entity::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
