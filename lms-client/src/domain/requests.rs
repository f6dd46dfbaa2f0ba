use serde::Serialize;

use super::ActivityType;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectionRequest<'a> {
    pub course_id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub order: u32,
}

/// Body of `PATCH /course-sections/{id}`. Unset fields are left out of the JSON.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSectionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityRequest<'a> {
    pub title: &'a str,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub content: Option<&'a str>,
    pub order: u32,
    pub section_id: &'a str,
    pub description: Option<&'a str>,
}

/// Body of `PATCH /activities/{id}`. Unset fields are left out of the JSON.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<&'a str>,
}

impl<'a> UpdateActivityRequest<'a> {
    pub fn position(order: u32, section_id: &'a str) -> Self {
        Self {
            order: Some(order),
            section_id: Some(section_id),
            ..Default::default()
        }
    }
}
