pub mod course;
pub mod favorite;
pub mod person;
pub mod survey;

pub use course::{Course, CourseChanges, CourseStatus, NewCourse};
pub use favorite::{Favorite, NewFavorite};
pub use person::{NewPerson, Person, PersonChanges, Role, normalize_email};
pub use survey::{NewSurvey, Survey};

/// Error returned when a stored or submitted enum label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
