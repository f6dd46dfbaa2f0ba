use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(rename = "type", default)]
    pub activity_type: ActivityType,
    pub order: u32,
    pub section_id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Content kind of an activity. Values the client does not know about decode as `Other`.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    #[default]
    Page,
    File,
    Url,
    Video,
    Quiz,
    Assignment,
    Forum,
    #[serde(other)]
    Other,
}
