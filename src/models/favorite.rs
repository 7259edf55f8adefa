use serde::{Deserialize, Serialize};

use crate::entities::favorites;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Favorite {
    pub id: i32,
    pub user_id: i32,
    pub course_id: i32,
}

impl From<favorites::Model> for Favorite {
    fn from(model: favorites::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            course_id: model.course_id,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NewFavorite {
    pub user_id: i32,
    pub course_id: i32,
}
