use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::CourseSection;

/// A course as returned by `GET /courses/{id}`, with its sections and their activities nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// The backend names this relation after its table, older deployments use `courseSections`.
    #[serde(default, alias = "CourseSection", alias = "courseSections")]
    pub sections: Vec<CourseSection>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}
