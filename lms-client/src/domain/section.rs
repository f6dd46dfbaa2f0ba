use serde::{Deserialize, Serialize};

use super::Activity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSection {
    pub id: String,
    #[serde(default)]
    pub course_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub order: u32,
    #[serde(default)]
    pub activities: Vec<Activity>,
}
