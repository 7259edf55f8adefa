use serde::{Deserialize, Serialize};

use crate::entities::surveys;

/// Five integer ratings submitted for a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Survey {
    pub id: i32,
    pub course_id: i32,
    pub first: i32,
    pub second: i32,
    pub third: i32,
    pub fourth: i32,
    pub fifth: i32,
}

impl From<surveys::Model> for Survey {
    fn from(model: surveys::Model) -> Self {
        Self {
            id: model.id,
            course_id: model.course_id,
            first: model.first,
            second: model.second,
            third: model.third,
            fourth: model.fourth,
            fifth: model.fifth,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct NewSurvey {
    pub course_id: i32,
    pub first: i32,
    pub second: i32,
    pub third: i32,
    pub fourth: i32,
    pub fifth: i32,
}
