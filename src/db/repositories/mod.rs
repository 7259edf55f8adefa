pub mod course;
pub mod favorite;
pub mod person;
pub mod survey;
