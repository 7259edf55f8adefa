pub mod prelude;

pub mod courses;
pub mod favorites;
pub mod people;
pub mod surveys;
