pub use super::courses::Entity as Courses;
pub use super::favorites::Entity as Favorites;
pub use super::people::Entity as People;
pub use super::surveys::Entity as Surveys;
