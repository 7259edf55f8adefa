use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::UnknownVariant;
use crate::entities::courses;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CourseStatus {
    #[default]
    Undefined,
    Active,
    Blocked,
}

impl CourseStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "UNDEFINED",
            Self::Active => "ACTIVE",
            Self::Blocked => "BLOCKED",
        }
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "UNDEFINED" => Ok(Self::Undefined),
            "ACTIVE" => Ok(Self::Active),
            "BLOCKED" => Ok(Self::Blocked),
            other => Err(UnknownVariant {
                kind: "course status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub teacher: String,
    pub teacher_id: Option<i32>,
    pub status: CourseStatus,
    pub created_at: String,
    pub file_name: String,
}

impl From<courses::Model> for Course {
    fn from(model: courses::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            teacher: model.teacher,
            teacher_id: model.teacher_id,
            status: model.status.parse().unwrap_or_default(),
            created_at: model.created_at,
            file_name: model.file_name,
        }
    }
}

/// Course creation payload. `file_body` is a data URL carrying the PDF.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewCourse {
    pub name: String,
    pub description: String,
    pub teacher: String,
    #[serde(deserialize_with = "lenient_id")]
    pub teacher_id: Option<i32>,
    pub status: CourseStatus,
    pub created_at: Option<String>,
    pub file_name: String,
    pub file_body: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CourseChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub file_name: Option<String>,
    pub file_body: Option<String>,
}

/// Accepts an id as a JSON number, a numeric string, an empty string or null.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i32),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid id '{s}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teacher_id_accepts_numbers_and_numeric_strings() {
        let course: NewCourse = serde_json::from_str(r#"{"teacher_id": 7}"#).unwrap();
        assert_eq!(course.teacher_id, Some(7));

        let course: NewCourse = serde_json::from_str(r#"{"teacher_id": "12"}"#).unwrap();
        assert_eq!(course.teacher_id, Some(12));

        let course: NewCourse = serde_json::from_str(r#"{"teacher_id": ""}"#).unwrap();
        assert_eq!(course.teacher_id, None);

        assert!(serde_json::from_str::<NewCourse>(r#"{"teacher_id": "abc"}"#).is_err());
    }

    #[test]
    fn status_defaults_to_undefined() {
        let course: NewCourse = serde_json::from_str(r#"{"name": "Rust"}"#).unwrap();
        assert_eq!(course.status, CourseStatus::Undefined);
        assert!(course.created_at.is_none());
    }

    #[test]
    fn status_rejects_unknown_labels() {
        assert!(serde_json::from_str::<CourseStatus>("\"ARCHIVED\"").is_err());
        assert_eq!("BLOCKED".parse::<CourseStatus>().unwrap(), CourseStatus::Blocked);
    }
}
