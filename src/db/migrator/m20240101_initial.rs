use crate::entities::favorites;
use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

const FAVORITES_UNIQUE_INDEX: &str = "idx_favorites_user_course";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(People)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Courses)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Favorites)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(FAVORITES_UNIQUE_INDEX)
                    .table(Favorites)
                    .col(favorites::Column::UserId)
                    .col(favorites::Column::CourseId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Surveys)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Surveys).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Favorites).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(People).if_exists().to_owned())
            .await?;

        Ok(())
    }
}
