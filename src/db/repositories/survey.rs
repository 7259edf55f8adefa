use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::db::StoreResult;
use crate::entities::surveys;
use crate::models::NewSurvey;

pub struct SurveyRepository {
    conn: DatabaseConnection,
}

impl SurveyRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> StoreResult<Vec<surveys::Model>> {
        Ok(surveys::Entity::find()
            .order_by_asc(surveys::Column::Id)
            .all(&self.conn)
            .await?)
    }

    pub async fn create(&self, survey: NewSurvey) -> StoreResult<surveys::Model> {
        let active = surveys::ActiveModel {
            course_id: Set(survey.course_id),
            first: Set(survey.first),
            second: Set(survey.second),
            third: Set(survey.third),
            fourth: Set(survey.fourth),
            fifth: Set(survey.fifth),
            ..Default::default()
        };

        Ok(active.insert(&self.conn).await?)
    }
}
